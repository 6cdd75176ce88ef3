use crate::annotations::{NativeDeclarationRequest, PrimitiveType};
use crate::conventions::Conventions;
use crate::document::Document;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecializeReport {
    pub applied: Vec<String>,
    /// Requests whose generated local was not in the body.
    pub not_applied: Vec<String>,
    pub temporaries: usize,
}

/// Rewrites generic-value locals of one file into native ones.
///
/// The temporary counter lives as long as the specializer, so create one
/// per file.
pub struct Specializer<'c> {
    conv: &'c Conventions,
    next_ref: usize,
}

impl<'c> Specializer<'c> {
    pub fn new(conv: &'c Conventions) -> Self {
        Self { conv, next_ref: 0 }
    }

    /// Temporaries handed out so far.
    pub fn temporaries(&self) -> usize {
        self.next_ref
    }

    /// Apply one request. Returns false when the generated local is absent.
    pub fn apply(&mut self, body: &mut String, req: &NativeDeclarationRequest) -> bool {
        let local = self.conv.local_name(&req.name);
        let local_re = regex::escape(&local);

        let decl = compile(&format!(
            r"\b{}\s+{}\b",
            regex::escape(&self.conv.value_type),
            local_re
        ));
        let Some(found) = decl.find(body) else {
            debug!("`{}` not in body, skipping native declaration", local);
            return false;
        };

        self.rewrite_declaration(body, req, &local, found.range());
        self.redirect_references(body, &local);

        let accessor = compile(&format!(
            r"\b{}\.{}\w+\(\s*\)",
            local_re,
            regex::escape(&self.conv.accessor_prefix)
        ));
        *body = accessor.replace_all(body, local.as_str()).into_owned();

        if req.ty == PrimitiveType::Bool {
            let wrapper = compile(&format!(
                r"\b{}\(\s*{}\s*\)",
                regex::escape(&self.conv.bool_wrapper),
                local_re
            ));
            *body = wrapper.replace_all(body, local.as_str()).into_owned();
        }

        debug!("`{}` is now `{} {}`", req.name, req.native_type(), local);
        true
    }

    /// Swap the generic type for the native one, folding the single
    /// assignment into the declaration for static and const locals.
    /// The declaration keeps the generated `local_` name so other uses still resolve.
    fn rewrite_declaration(
        &self,
        body: &mut String,
        req: &NativeDeclarationRequest,
        local: &str,
        decl: Range<usize>,
    ) {
        let native = format!("{} {}", req.native_type(), local);

        let folded = if req.needs_initializer() {
            find_assignment(body, local, &decl)
        } else {
            None
        };

        let Some((assignment, expr)) = folded else {
            body.replace_range(decl, &native);
            return;
        };

        // Replace through the end of the declaration statement.
        let stmt_end = body[decl.end..]
            .find(';')
            .map_or(decl.end, |i| decl.end + i + 1);
        let replacement = format!("{} = {};", native, expr);
        let removal = removal_range(body, assignment);

        if removal.start >= stmt_end {
            body.replace_range(removal, "");
            body.replace_range(decl.start..stmt_end, &replacement);
        } else {
            body.replace_range(decl.start..stmt_end, &replacement);
            body.replace_range(removal, "");
        }
    }

    /// Point reference-taking uses at fresh generic temporaries.
    fn redirect_references(&mut self, body: &mut String, local: &str) {
        let tagged = compile(&format!(
            r"&\s*/\*\s*{}\s*\*/\s*{}\b",
            regex::escape(&self.conv.reference_tag),
            regex::escape(local)
        ));

        while let Some(found) = tagged.find(body) {
            let range = found.range();
            let temp = self.conv.ref_temp_name(self.next_ref);
            self.next_ref += 1;

            let line_start = body[..range.start].rfind('\n').map_or(0, |i| i + 1);
            let indent: String = body[line_start..]
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();

            body.replace_range(range, &format!("&{}", temp));
            body.insert_str(
                line_start,
                &format!("{}{} {}({});\n", indent, self.conv.value_type, temp, local),
            );
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("escaped pattern is valid")
}

/// First `local = expr;` statement outside the declaration itself.
fn find_assignment(body: &str, local: &str, decl: &Range<usize>) -> Option<(Range<usize>, String)> {
    let assign = compile(&format!(r"\b{}\s*=([^=;][^;]*);", regex::escape(local)));

    let found = assign.captures_iter(body).find_map(|caps| {
        let whole = caps.get(0)?;
        if whole.start() < decl.end && whole.end() > decl.start {
            return None;
        }
        let before = body[..whole.start()].trim_end_matches([' ', '\t']);
        let at_statement_start = match before.chars().last() {
            None => true,
            Some(c) => matches!(c, '\n' | '\r' | ';' | '{' | '}'),
        };
        at_statement_start.then(|| (whole.range(), caps[1].trim().to_string()))
    });
    found
}

/// Widen a statement's range to its whole line when it stands alone there,
/// otherwise to the blanks just in front of it.
fn removal_range(body: &str, stmt: Range<usize>) -> Range<usize> {
    let line_start = body[..stmt.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = body[stmt.end..]
        .find('\n')
        .map_or(body.len(), |i| stmt.end + i + 1);

    if body[line_start..stmt.start].trim().is_empty() && body[stmt.end..line_end].trim().is_empty() {
        return line_start..line_end;
    }
    let lead = body[..stmt.start].trim_end_matches([' ', '\t']).len();
    lead..stmt.end
}

/// Specialize every request against the document body, in scan order.
pub fn specialize(
    doc: &mut Document,
    requests: &[NativeDeclarationRequest],
    conv: &Conventions,
) -> SpecializeReport {
    let mut report = SpecializeReport::default();
    if requests.is_empty() {
        return report;
    }

    let mut body = doc.body().to_string();
    let mut specializer = Specializer::new(conv);
    for req in requests {
        if specializer.apply(&mut body, req) {
            report.applied.push(req.name.clone());
        } else {
            report.not_applied.push(req.name.clone());
        }
    }
    report.temporaries = specializer.temporaries();
    doc.set_body(body);
    report
}
