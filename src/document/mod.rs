mod function;
mod position;

pub use function::{FunctionKind, GeneratedFunction};
pub use position::{PositionIndex, Segment};

use crate::conventions::Conventions;
use crate::error::WeaveError;

/// What a span of a generated file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Lines added in front of the original file.
    Header,
    /// Original text up to and including the body's opening brace.
    Prelude,
    Body,
    /// The body's closing brace.
    Close,
    /// Functions added after the original function.
    Worker,
    /// Original text after the closing brace.
    Trailer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub role: Role,
    pub text: String,
}

/// A generated file split into role-tagged spans around its one function.
///
/// Passes edit spans; the file text is only reassembled by [`Document::render`].
#[derive(Debug, Clone)]
pub struct Document {
    function: GeneratedFunction,
    spans: Vec<Span>,
}

impl Document {
    pub fn parse(
        text: &str,
        function: GeneratedFunction,
        conv: &Conventions,
    ) -> Result<Self, WeaveError> {
        let (start, end) = function.locate_body(text, conv)?;
        let spans = vec![
            Span {
                role: Role::Prelude,
                text: text[..start].to_string(),
            },
            Span {
                role: Role::Body,
                text: text[start..end].to_string(),
            },
            Span {
                role: Role::Close,
                text: text[end..end + 1].to_string(),
            },
            Span {
                role: Role::Trailer,
                text: text[end + 1..].to_string(),
            },
        ];
        Ok(Self { function, spans })
    }

    pub fn function(&self) -> &GeneratedFunction {
        &self.function
    }

    pub fn body(&self) -> &str {
        self.spans
            .iter()
            .find(|s| s.role == Role::Body)
            .map_or("", |s| s.text.as_str())
    }

    pub fn set_body(&mut self, body: String) {
        if let Some(span) = self.spans.iter_mut().find(|s| s.role == Role::Body) {
            span.text = body;
        }
    }

    /// Add a header line after any headers already added.
    pub fn push_header(&mut self, line: impl Into<String>) {
        let at = self
            .spans
            .iter()
            .position(|s| s.role != Role::Header)
            .unwrap_or(self.spans.len());
        self.spans.insert(
            at,
            Span {
                role: Role::Header,
                text: format!("{}\n", line.into()),
            },
        );
    }

    /// Add a function right after the original function's closing brace.
    pub fn push_worker(&mut self, code: impl Into<String>) {
        let at = self
            .spans
            .iter()
            .position(|s| s.role == Role::Trailer)
            .unwrap_or(self.spans.len());
        self.spans.insert(
            at,
            Span {
                role: Role::Worker,
                text: code.into(),
            },
        );
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.spans.iter().any(|s| s.text.contains(needle))
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn render(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = "#include <YYGML.h>\nvoid gml_Object_obj_Step_0( CInstance* pSelf, CInstance* pOther )\n{\nMARK(1);\nstep();\n}\n\n";

    #[test]
    fn test_parse_then_render_is_identity() {
        let conv = Conventions::default();
        let f = GeneratedFunction::new("gml_Object_obj_Step_0", FunctionKind::EventHandler);
        let doc = Document::parse(EVENT, f, &conv).unwrap();
        assert_eq!(doc.body(), "\nMARK(1);\nstep();\n");
        assert_eq!(doc.render(), EVENT);
    }

    #[test]
    fn test_headers_and_workers_land_in_place() {
        let conv = Conventions::default();
        let f = GeneratedFunction::new("gml_Object_obj_Step_0", FunctionKind::EventHandler);
        let mut doc = Document::parse(EVENT, f, &conv).unwrap();
        doc.push_header("#include \"a.h\"");
        doc.push_header("int b();");
        doc.push_worker("\nint b() { return 0; }\n");

        let out = doc.render();
        assert!(out.starts_with("#include \"a.h\"\nint b();\n#include <YYGML.h>"));
        assert!(out.ends_with("step();\n}\nint b() { return 0; }\n\n\n"));
    }
}
