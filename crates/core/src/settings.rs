use crate::{
    error::{Error, Result},
    evaluator::Evaluator,
    persistence::JsonFileBackend,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the settings file searched for in ancestor directories
pub const SETTINGS_FILE: &str = "lifemap.json";

/// Environment variable that bounds the settings search
pub const ROOT_ENV: &str = "LIFEMAP_ROOT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Replaces the built-in list of phases where unmapped executions are errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interesting_phases: Option<Vec<String>>,
    #[serde(default = "default_workspace_metadata")]
    pub workspace_metadata: PathBuf,
    #[serde(default = "default_extensions_dir")]
    pub extensions_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin_packagings: Option<Vec<String>>,

    // Directory relative paths resolve against (not stored in JSON)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_workspace_metadata() -> PathBuf {
    PathBuf::from("lifecycle-mapping-metadata.json")
}

fn default_extensions_dir() -> PathBuf {
    PathBuf::from("extensions")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interesting_phases: None,
            workspace_metadata: default_workspace_metadata(),
            extensions_dir: default_extensions_dir(),
            builtin_packagings: None,
            base_dir: PathBuf::new(),
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {e}", path.display())))?;
        settings.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize settings: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Walk up from `start` looking for `lifemap.json`, never past `root`
    pub fn find_settings_file(start: &Path, root: Option<&Path>) -> Option<PathBuf> {
        let mut current = start;

        loop {
            let candidate = current.join(SETTINGS_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if root == Some(current) {
                return None;
            }
            current = current.parent()?;
        }
    }

    /// Load settings for `start`, honoring `LIFEMAP_ROOT`
    pub fn load(start: &Path) -> Result<Self> {
        let root = std::env::var_os(ROOT_ENV).map(PathBuf::from);
        Self::load_with_root(start, root.as_deref())
    }

    /// Load settings for `start` with an explicit search boundary
    ///
    /// Without a settings file the defaults apply, rooted at `root` or `start`.
    pub fn load_with_root(start: &Path, root: Option<&Path>) -> Result<Self> {
        match Self::find_settings_file(start, root) {
            Some(path) => {
                tracing::debug!("Using settings from {:?}", path);
                Self::load_from_file(&path)
            }
            None => {
                tracing::debug!("No {} found from {:?}, using defaults", SETTINGS_FILE, start);
                Ok(Self {
                    base_dir: root.unwrap_or(start).to_path_buf(),
                    ..Self::default()
                })
            }
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn workspace_metadata_path(&self) -> PathBuf {
        self.resolve(&self.workspace_metadata)
    }

    pub fn extensions_path(&self) -> PathBuf {
        self.resolve(&self.extensions_dir)
    }

    /// JSON file backend over the configured locations
    pub fn backend(&self) -> JsonFileBackend {
        JsonFileBackend::new(self.workspace_metadata_path(), self.extensions_path())
    }

    /// Evaluator with any phase or packaging overrides applied
    pub fn evaluator(&self) -> Evaluator {
        let mut evaluator = Evaluator::new();
        if let Some(phases) = &self.interesting_phases {
            evaluator = evaluator.with_interesting_phases(phases.iter().cloned());
        }
        if let Some(packagings) = &self.builtin_packagings {
            evaluator = evaluator.with_builtin_packagings(packagings.iter().cloned());
        }
        evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_with_root(temp_dir.path(), Some(temp_dir.path())).unwrap();

        assert_eq!(
            settings.workspace_metadata_path(),
            temp_dir.path().join("lifecycle-mapping-metadata.json")
        );
        assert_eq!(settings.extensions_path(), temp_dir.path().join("extensions"));
        assert!(settings.evaluator().is_interesting_phase("compile"));
    }

    #[test]
    fn test_found_in_ancestor_and_resolved_there() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILE),
            r#"{ "interestingPhases": ["package"], "extensionsDir": "ext" }"#,
        )
        .unwrap();

        let settings = Settings::load_with_root(&nested, Some(temp_dir.path())).unwrap();

        assert_eq!(settings.extensions_path(), temp_dir.path().join("ext"));
        let evaluator = settings.evaluator();
        assert!(evaluator.is_interesting_phase("package"));
        assert!(!evaluator.is_interesting_phase("compile"));
    }

    #[test]
    fn test_search_stops_at_root() {
        let temp_dir = TempDir::new().unwrap();
        let bounded = temp_dir.path().join("project");
        std::fs::create_dir_all(&bounded).unwrap();
        std::fs::write(temp_dir.path().join(SETTINGS_FILE), "{}").unwrap();

        assert!(Settings::find_settings_file(&bounded, Some(&bounded)).is_none());
        assert!(Settings::find_settings_file(&bounded, Some(temp_dir.path())).is_some());
    }

    #[test]
    fn test_parse_failure_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(SETTINGS_FILE), "{ not json").unwrap();

        let err = Settings::load_with_root(temp_dir.path(), Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_save_round_trip_skips_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        let settings = Settings {
            builtin_packagings: Some(vec!["jar".into(), "bundle".into()]),
            ..Settings::default()
        };
        settings.save_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(json.get("baseDir").is_none());
        assert!(json.get("interestingPhases").is_none());

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.builtin_packagings, settings.builtin_packagings);
        assert!(loaded.evaluator().is_builtin_packaging("bundle"));
    }
}
