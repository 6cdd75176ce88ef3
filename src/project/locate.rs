use crate::conventions::Conventions;
use crate::document::GeneratedFunction;
use std::path::{Path, PathBuf};

/// Finds the script source a generated function was produced from.
pub trait SourceLocator {
    /// Best candidate path; it may not exist.
    fn locate(&self, function: &GeneratedFunction) -> PathBuf;
}

/// Always answers with the same file.
pub struct FixedSource(pub PathBuf);

impl SourceLocator for FixedSource {
    fn locate(&self, _function: &GeneratedFunction) -> PathBuf {
        self.0.clone()
    }
}

/// The IDE's on-disk project layout:
/// `scripts/<name>/<name>.gml` and `objects/<object>/<Event>_<n>.gml`.
pub struct ProjectLayout {
    project_dir: PathBuf,
    script_prefix: String,
    object_prefix: String,
}

impl ProjectLayout {
    pub fn new(project_dir: impl Into<PathBuf>, conv: &Conventions) -> Self {
        Self {
            project_dir: project_dir.into(),
            script_prefix: conv.script_prefix.clone(),
            object_prefix: conv.object_prefix.clone(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn object_candidates(&self, rest: &str) -> Vec<PathBuf> {
        let objects = self.project_dir.join("objects");
        rest.match_indices('_')
            .map(|(i, _)| {
                objects
                    .join(&rest[..i])
                    .join(format!("{}.gml", &rest[i + 1..]))
            })
            .collect()
    }
}

impl SourceLocator for ProjectLayout {
    fn locate(&self, function: &GeneratedFunction) -> PathBuf {
        let name = function.name.as_str();

        if let Some(script) = name.strip_prefix(self.script_prefix.as_str()) {
            return self
                .project_dir
                .join("scripts")
                .join(script)
                .join(format!("{}.gml", script));
        }

        if let Some(rest) = name.strip_prefix(self.object_prefix.as_str()) {
            // Object names may contain underscores; the first split that
            // exists on disk wins.
            let candidates = self.object_candidates(rest);
            if let Some(found) = candidates.iter().find(|p| p.is_file()) {
                return found.clone();
            }
            if let Some(first) = candidates.into_iter().next() {
                return first;
            }
        }

        self.project_dir.join(format!("{}.gml", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FunctionKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_script_path() {
        let layout = ProjectLayout::new("/proj", &Conventions::default());
        let f = GeneratedFunction::new("gml_Script_do_work", FunctionKind::ScriptCall);
        assert_eq!(
            layout.locate(&f),
            PathBuf::from("/proj/scripts/do_work/do_work.gml")
        );
    }

    #[test]
    fn test_object_with_underscores_resolves_on_disk() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("objects").join("obj_enemy_boss");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Step_0.gml"), "x = 1;").unwrap();

        let layout = ProjectLayout::new(temp.path(), &Conventions::default());
        let f = GeneratedFunction::new(
            "gml_Object_obj_enemy_boss_Step_0",
            FunctionKind::EventHandler,
        );
        assert_eq!(layout.locate(&f), dir.join("Step_0.gml"));
    }

    #[test]
    fn test_missing_object_source_gives_a_candidate() {
        let layout = ProjectLayout::new("/proj", &Conventions::default());
        let f = GeneratedFunction::new("gml_Object_o_Create_0", FunctionKind::EventHandler);
        assert_eq!(
            layout.locate(&f),
            PathBuf::from("/proj/objects/o/Create_0.gml")
        );
    }
}
