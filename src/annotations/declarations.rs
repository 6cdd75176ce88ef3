use super::types::{NativeDeclarationRequest, PrimitiveType};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// `[static] [const] [u]<primitive>_t <identifier> = <expr>;`
fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"((?:\b(?:static|const)\s+)*)\b(u?)(bool|char|int|longlong|float|double)_t\s+([A-Za-z_][A-Za-z0-9_]*)\s*=[^;]*;",
        )
        .expect("declaration pattern is valid")
    })
}

/// Declaration requests in scan order. A repeated name keeps its first
/// position but takes the later request's qualifiers and type.
pub fn scan_declarations(source: &str) -> Vec<NativeDeclarationRequest> {
    let mut out: Vec<NativeDeclarationRequest> = Vec::new();

    for caps in declaration_regex().captures_iter(source) {
        let qualifiers = caps.get(1).map_or("", |m| m.as_str());
        let is_unsigned = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
        let Some(ty) = caps.get(3).and_then(|m| PrimitiveType::from_annotation(m.as_str()))
        else {
            continue;
        };
        let name = caps[4].to_string();

        if is_unsigned && !ty.allows_unsigned() {
            debug!("ignoring unsigned {} for `{}`", ty.native_name(), name);
            continue;
        }

        let words: Vec<&str> = qualifiers.split_whitespace().collect();
        let req = NativeDeclarationRequest {
            name,
            ty,
            is_static: words.contains(&"static"),
            is_const: words.contains(&"const"),
            is_unsigned,
        };

        match out.iter_mut().find(|r| r.name == req.name) {
            Some(existing) => {
                debug!("`{}` declared again, last declaration wins", req.name);
                *existing = req;
            }
            None => out.push(req),
        }
    }

    out
}
