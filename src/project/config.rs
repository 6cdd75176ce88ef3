use crate::conventions::Conventions;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CPP_DIR: &str = "Cpp";

/// Persisted tool settings (`config.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Project subdirectory holding hand-written `.cpp`/`.h` files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpp_dir: Option<String>,
    /// Path to the build descriptor written by the IDE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_bff: Option<PathBuf>,
    #[serde(default)]
    pub conventions: Conventions,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(field) = config.conventions.empty_token() {
            return Err(ConfigError::EmptyToken {
                path: path.to_path_buf(),
                field,
            });
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(path, text + "\n").map_err(write_err)
    }

    /// Load the config, asking for any missing path and saving the result
    /// when something had to be asked.
    pub fn load_or_prompt<R: BufRead, W: Write>(
        path: &Path,
        input: &mut R,
        output: &mut W,
    ) -> Result<Self, ConfigError> {
        let mut config = match Config::load(path) {
            Ok(config) => {
                info!("Loaded {}", path.display());
                config
            }
            Err(ConfigError::Read { .. }) => Config::default(),
            Err(e) => return Err(e),
        };

        let mut changed = false;
        let prompt_err = |source: io::Error| ConfigError::Read {
            path: PathBuf::from("<stdin>"),
            source,
        };

        if config.cpp_dir.as_deref().map_or(true, str::is_empty) {
            let answer = ask(
                input,
                output,
                "Enter name of project subdirectory containing C++ files",
                DEFAULT_CPP_DIR,
            )
            .map_err(prompt_err)?;
            config.cpp_dir = Some(answer);
            changed = true;
        }

        if config.build_bff.as_ref().map_or(true, |p| p.as_os_str().is_empty()) {
            let default = default_build_bff();
            let answer = ask(
                input,
                output,
                "Enter path to the build.bff file",
                &default.to_string_lossy(),
            )
            .map_err(prompt_err)?;
            config.build_bff = Some(PathBuf::from(answer));
            changed = true;
        }

        if changed {
            config.save(path)?;
            info!("Saved {}", path.display());
        }
        Ok(config)
    }

    pub fn cpp_dir(&self) -> &str {
        self.cpp_dir.as_deref().unwrap_or(DEFAULT_CPP_DIR)
    }
}

/// Where the IDE writes its build descriptor for the current user.
pub fn default_build_bff() -> PathBuf {
    let user = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_default();
    PathBuf::from(format!(
        "C:\\Users\\{}\\AppData\\Local\\GameMakerStudio2\\GMS2TEMP\\build.bff",
        user
    ))
}

/// Print `question [default]: ` and read one line; empty means the default.
fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
) -> io::Result<String> {
    write!(output, "{} [{}]: ", question, default)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prompts_for_missing_values_and_saves() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        let mut input = io::Cursor::new("\n/tmp/build.bff\n");
        let mut output = Vec::new();
        let config = Config::load_or_prompt(&path, &mut input, &mut output).unwrap();

        assert_eq!(config.cpp_dir(), "Cpp");
        assert_eq!(config.build_bff, Some(PathBuf::from("/tmp/build.bff")));
        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("containing C++ files [Cpp]: "));

        let saved = Config::load(&path).unwrap();
        assert_eq!(saved, config);
    }

    #[test]
    fn test_complete_config_asks_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "cpp_dir": "Native", "build_bff": "b.bff", "conventions": { "line_marker": "LINE" } }"#,
        )
        .unwrap();

        let mut input = io::Cursor::new("");
        let mut output = Vec::new();
        let config = Config::load_or_prompt(&path, &mut input, &mut output).unwrap();
        assert!(output.is_empty());
        assert_eq!(config.cpp_dir(), "Native");
        assert_eq!(config.conventions.line_marker, "LINE");
        assert_eq!(config.conventions.value_type, "GenericValue");
    }

    #[test]
    fn test_empty_fragment_token_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "cpp_dir": "Cpp", "conventions": { "fragment_open": "", "fragment_close": "" } }"#,
        )
        .unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::EmptyToken { field: "fragment_open", .. })
        ));
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let mut input = io::Cursor::new("");
        let mut output = Vec::new();
        assert!(matches!(
            Config::load_or_prompt(&path, &mut input, &mut output),
            Err(ConfigError::Parse { .. })
        ));
    }
}
