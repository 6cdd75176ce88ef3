use crate::conventions::Conventions;
use crate::error::WeaveError;
use regex::Regex;

/// Script calls return the generic value; object events return nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    ScriptCall,
    EventHandler,
}

/// The one native function a generated file exists for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFunction {
    pub name: String,
    pub kind: FunctionKind,
}

impl GeneratedFunction {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// `gml_Script_foo.gml.cpp` -> script call `gml_Script_foo`.
    pub fn from_file_name(file_name: &str, conv: &Conventions) -> Option<Self> {
        let name = conv.function_name(file_name)?;
        let kind = if name.starts_with(conv.script_prefix.as_str()) {
            FunctionKind::ScriptCall
        } else {
            FunctionKind::EventHandler
        };
        Some(Self::new(name, kind))
    }

    /// Human-readable form of the signature being searched for.
    pub fn signature_token(&self, conv: &Conventions) -> String {
        match self.kind {
            FunctionKind::ScriptCall => format!("{}& {}(", conv.value_type, self.name),
            FunctionKind::EventHandler => format!("void {}(", self.name),
        }
    }

    fn signature_regex(&self, conv: &Conventions) -> Regex {
        let name = regex::escape(&self.name);
        let pattern = match self.kind {
            FunctionKind::ScriptCall => {
                format!(r"{}\s*&\s*{}\s*\(", regex::escape(&conv.value_type), name)
            }
            FunctionKind::EventHandler => format!(r"\bvoid\s+{}\s*\(", name),
        };
        Regex::new(&pattern).expect("escaped signature pattern is valid")
    }

    /// Byte range of the function body: just after `{` up to the matching `}`.
    ///
    /// Forward declarations matching the signature are passed over. A body
    /// whose braces never balance is a file still being written.
    pub fn locate_body(&self, text: &str, conv: &Conventions) -> Result<(usize, usize), WeaveError> {
        for m in self.signature_regex(conv).find_iter(text) {
            let params_open = m.end() - 1;
            let Some(params_close) = matching_close(text, params_open, b'(', b')') else {
                continue;
            };
            let after = &text[params_close + 1..];
            let gap = after.len() - after.trim_start().len();
            let brace = params_close + 1 + gap;
            if text.as_bytes().get(brace) != Some(&b'{') {
                continue;
            }
            return match matching_close(text, brace, b'{', b'}') {
                Some(close) => Ok((brace + 1, close)),
                None => Err(WeaveError::TruncatedFunction(self.name.clone())),
            };
        }
        Err(WeaveError::FunctionSignatureNotFound(
            self.signature_token(conv),
        ))
    }
}

/// Index of the delimiter closing the one at `open`, honoring string and
/// character literals and comments.
pub(crate) fn matching_close(text: &str, open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ if b == open_ch => depth += 1,
            _ if b == close_ch => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
