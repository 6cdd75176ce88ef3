use crate::annotations::AnnotatedFragment;
use crate::conventions::Conventions;
use crate::document::{Document, FunctionKind, GeneratedFunction, PositionIndex};
use crate::error::WeaveError;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaveMode {
    Additive,
    Overwrite,
}

/// Code after the overwrite prefix, if the fragment starts with one.
fn strip_overwrite<'a>(code: &'a str, conv: &Conventions) -> Option<&'a str> {
    let rest = code.strip_prefix(conv.overwrite_prefix.as_str())?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        Some(_) => None,
    }
}

/// The first fragment decides the mode for the whole file.
pub fn weave_mode(fragments: &[AnnotatedFragment], conv: &Conventions) -> WeaveMode {
    match fragments.first() {
        Some(first) if strip_overwrite(&first.code, conv).is_some() => WeaveMode::Overwrite,
        _ => WeaveMode::Additive,
    }
}

/// Merge fragments into the document's function body.
///
/// Returns the mode used, or `None` when there was nothing to weave.
pub fn weave(
    doc: &mut Document,
    fragments: &[AnnotatedFragment],
    conv: &Conventions,
) -> Result<Option<WeaveMode>, WeaveError> {
    if fragments.is_empty() {
        return Ok(None);
    }
    let mode = weave_mode(fragments, conv);
    let body = match mode {
        WeaveMode::Additive => weave_additive(doc.body(), fragments, conv)?,
        WeaveMode::Overwrite => weave_overwrite(doc.function(), fragments, conv),
    };
    doc.set_body(body);
    Ok(Some(mode))
}

/// Append each fragment to the segment of the nearest marker at or before
/// its source line.
pub fn weave_additive(
    body: &str,
    fragments: &[AnnotatedFragment],
    conv: &Conventions,
) -> Result<String, WeaveError> {
    let mut index = PositionIndex::build(body, conv);
    if index.is_empty() {
        return Err(WeaveError::NoMarkersFound);
    }
    let result_return = conv.result_return();

    for frag in fragments {
        let line = i64::try_from(frag.source_line).unwrap_or(i64::MAX);
        if let Some(seg) = index.floor_mut(line) {
            debug!("fragment at line {} -> segment {}", frag.source_line, seg.line);
            if !seg.text.is_empty() && !seg.text.ends_with('\n') {
                seg.text.push('\n');
            }
            seg.text.push_str(&frag.code);
            seg.text.push('\n');
            continue;
        }

        // Before every marker: goes ahead of the final result return.
        let Some(seg) = index.highest_mut() else {
            return Err(WeaveError::NoMarkersFound);
        };
        debug!(
            "fragment at line {} precedes all markers, placing before return",
            frag.source_line
        );
        match seg.text.rfind(&result_return) {
            Some(at) => seg.text.insert_str(at, &format!("{}\n", frag.code)),
            None => {
                if !seg.text.is_empty() && !seg.text.ends_with('\n') {
                    seg.text.push('\n');
                }
                seg.text.push_str(&frag.code);
                seg.text.push('\n');
            }
        }
    }

    Ok(index.render())
}

/// Replace the whole body with the fragments' code.
pub fn weave_overwrite(
    function: &GeneratedFunction,
    fragments: &[AnnotatedFragment],
    conv: &Conventions,
) -> String {
    let code: Vec<&str> = fragments
        .iter()
        .enumerate()
        .map(|(i, f)| match (i, strip_overwrite(&f.code, conv)) {
            (0, Some(rest)) => rest,
            _ => f.code.as_str(),
        })
        .collect();
    let joined = code.join("\n");

    match function.kind {
        FunctionKind::ScriptCall => format!(
            "\n{}( \"{}\", 0 );\n{} = 0;\n{}\n{}\n",
            conv.entry_macro,
            function.name,
            conv.result_var,
            joined,
            conv.result_return()
        ),
        FunctionKind::EventHandler => format!("\n{}\n", joined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frag(source_line: usize, code: &str) -> AnnotatedFragment {
        AnnotatedFragment {
            source_line,
            code: code.to_string(),
        }
    }

    #[test]
    fn test_fragment_goes_to_nearest_preceding_marker() {
        let body = "\nMARK(10);\na();\nMARK(20);\nb();\nreturn _result;\n";
        let out = weave_additive(body, &[frag(15, "between();")], &Conventions::default()).unwrap();
        assert_eq!(
            out,
            "\nMARK(10);\na();\nbetween();\nMARK(20);\nb();\nreturn _result;\n"
        );
    }

    #[test]
    fn test_same_segment_keeps_source_order() {
        let body = "\nMARK(3);\na();\n";
        let out = weave_additive(
            body,
            &[frag(4, "first();"), frag(7, "second();")],
            &Conventions::default(),
        )
        .unwrap();
        assert_eq!(out, "\nMARK(3);\na();\nfirst();\nsecond();\n");
    }

    #[test]
    fn test_pre_anchor_fragment_lands_before_final_return() {
        let body = "\nMARK(5);\na();\nMARK(9);\nif (x) return _result;\nb();\nreturn _result;\n";
        let out = weave_additive(body, &[frag(1, "early();")], &Conventions::default()).unwrap();
        assert_eq!(
            out,
            "\nMARK(5);\na();\nMARK(9);\nif (x) return _result;\nb();\nearly();\nreturn _result;\n"
        );
    }

    #[test]
    fn test_pre_anchor_without_return_appends() {
        let body = "\nMARK(5);\na();";
        let out = weave_additive(body, &[frag(2, "early();")], &Conventions::default()).unwrap();
        assert_eq!(out, "\nMARK(5);\na();\nearly();\n");
    }

    #[test]
    fn test_additive_without_markers_fails() {
        let err = weave_additive("\nfoo();\n", &[frag(1, "x();")], &Conventions::default());
        assert!(matches!(err, Err(WeaveError::NoMarkersFound)));
    }

    #[test]
    fn test_overwrite_event_handler_body_is_exact() {
        let f = GeneratedFunction::new("gml_Object_o_Create_0", FunctionKind::EventHandler);
        let frags = [frag(1, "-overwrite\nfoo();"), frag(5, "bar();")];
        let conv = Conventions::default();
        assert_eq!(weave_mode(&frags, &conv), WeaveMode::Overwrite);
        assert_eq!(weave_overwrite(&f, &frags, &conv), "\nfoo();\nbar();\n");
    }

    #[test]
    fn test_overwrite_script_call_is_wrapped() {
        let f = GeneratedFunction::new("gml_Script_s", FunctionKind::ScriptCall);
        let frags = [frag(1, "-overwrite foo();")];
        let out = weave_overwrite(&f, &frags, &Conventions::default());
        assert_eq!(
            out,
            "\nFUNC_ENTRY( \"gml_Script_s\", 0 );\n_result = 0;\nfoo();\nreturn _result;\n"
        );
    }

    #[test]
    fn test_overwrite_prefix_needs_a_boundary() {
        let conv = Conventions::default();
        assert_eq!(weave_mode(&[frag(1, "-overwritten();")], &conv), WeaveMode::Additive);
        assert_eq!(weave_mode(&[frag(1, "a();"), frag(2, "-overwrite")], &conv), WeaveMode::Additive);
    }
}
