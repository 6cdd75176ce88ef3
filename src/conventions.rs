use serde::{Deserialize, Serialize};

/// Fixed tokens shared by the script-source annotations and the generated code.
///
/// Every field has a default, so a configuration file only has to name the
/// tokens it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    pub fragment_open: String,
    pub fragment_close: String,
    pub overwrite_prefix: String,
    pub async_directive: String,
    pub line_marker: String,
    pub value_type: String,
    pub local_prefix: String,
    /// Word inside the comment that tags `&/* local */local_x` reference-taking.
    pub reference_tag: String,
    pub bool_wrapper: String,
    /// Method-name prefix of the coercion accessors (`local_x.asReal()`).
    pub accessor_prefix: String,
    pub ref_temp_prefix: String,
    pub ref_temp_suffix: String,
    pub result_var: String,
    pub entry_macro: String,
    pub threading_header: String,
    pub generated_suffix: String,
    pub script_prefix: String,
    pub object_prefix: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            fragment_open: "/*cpp".to_string(),
            fragment_close: "*/".to_string(),
            overwrite_prefix: "-overwrite".to_string(),
            async_directive: "YYC_THREAD".to_string(),
            line_marker: "MARK".to_string(),
            value_type: "GenericValue".to_string(),
            local_prefix: "local_".to_string(),
            reference_tag: "local".to_string(),
            bool_wrapper: "BOOL_WRAP".to_string(),
            accessor_prefix: "as".to_string(),
            ref_temp_prefix: "__ref".to_string(),
            ref_temp_suffix: "__".to_string(),
            result_var: "_result".to_string(),
            entry_macro: "FUNC_ENTRY".to_string(),
            threading_header: "threading.h".to_string(),
            generated_suffix: ".gml.cpp".to_string(),
            script_prefix: "gml_Script_".to_string(),
            object_prefix: "gml_Object_".to_string(),
        }
    }
}

impl Conventions {
    /// Generated local-variable name for a script identifier.
    pub fn local_name(&self, name: &str) -> String {
        format!("{}{}", self.local_prefix, name)
    }

    /// `return _result;`
    pub fn result_return(&self) -> String {
        format!("return {};", self.result_var)
    }

    /// `#include "threading.h"`, also the marker of a prior async transformation.
    pub fn threading_include(&self) -> String {
        format!("#include \"{}\"", self.threading_header)
    }

    pub fn ref_temp_name(&self, n: usize) -> String {
        format!("{}{}{}", self.ref_temp_prefix, n, self.ref_temp_suffix)
    }

    /// Strip the generated suffix from a file name, yielding the function name.
    pub fn function_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        file_name
            .strip_suffix(self.generated_suffix.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn is_generated_file(&self, file_name: &str) -> bool {
        self.function_name(file_name).is_some()
    }

    /// First token that the scanners cannot work with when empty.
    pub fn empty_token(&self) -> Option<&'static str> {
        [
            ("fragment_open", &self.fragment_open),
            ("fragment_close", &self.fragment_close),
            ("line_marker", &self.line_marker),
            ("local_prefix", &self.local_prefix),
            ("value_type", &self.value_type),
            ("generated_suffix", &self.generated_suffix),
        ]
        .into_iter()
        .find(|(_, token)| token.is_empty())
        .map(|(field, _)| field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name_from_file() {
        let conv = Conventions::default();
        assert_eq!(
            conv.function_name("gml_Script_foo.gml.cpp"),
            Some("gml_Script_foo")
        );
        assert_eq!(conv.function_name("threading.h"), None);
        assert_eq!(conv.function_name(".gml.cpp"), None);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let conv: Conventions =
            serde_json::from_str(r#"{ "value_type": "YYRValue" }"#).unwrap();
        assert_eq!(conv.value_type, "YYRValue");
        assert_eq!(conv.line_marker, "MARK");
    }

    #[test]
    fn test_empty_token_names_the_field() {
        let mut conv = Conventions::default();
        assert_eq!(conv.empty_token(), None);
        conv.line_marker.clear();
        assert_eq!(conv.empty_token(), Some("line_marker"));
    }
}
