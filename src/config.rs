//! Report flags and the optional YAML config file.
//!
//! A config file looks like:
//!
//! ```yaml
//! report:
//!   file: false
//!   class_var: true
//! excluded_paths:
//!   - "**/vendor/**"
//! min_coverage: 80
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::EntityKind;
use crate::error::{CheckError, Result};

/// File names looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["doccheck.yaml", ".doccheck.yaml"];

/// Which kinds of missing doc-comment are reported.
///
/// Disabled kinds are still counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub file: bool,
    pub class: bool,
    pub interface: bool,
    pub class_var: bool,
    pub class_const: bool,
    pub constant: bool,
    pub function: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::all()
    }
}

impl ReportConfig {
    pub fn all() -> Self {
        Self::uniform(true)
    }

    pub fn none() -> Self {
        Self::uniform(false)
    }

    fn uniform(value: bool) -> Self {
        Self {
            file: value,
            class: value,
            interface: value,
            class_var: value,
            class_const: value,
            constant: value,
            function: value,
        }
    }

    pub fn is_enabled(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::File => self.file,
            EntityKind::Class => self.class,
            EntityKind::Interface => self.interface,
            EntityKind::Function => self.function,
            EntityKind::ClassVariable => self.class_var,
            EntityKind::ClassConstant => self.class_const,
            EntityKind::Constant => self.constant,
        }
    }

    pub fn set(&mut self, kind: EntityKind, enabled: bool) {
        let flag = match kind {
            EntityKind::File => &mut self.file,
            EntityKind::Class => &mut self.class,
            EntityKind::Interface => &mut self.interface,
            EntityKind::Function => &mut self.function,
            EntityKind::ClassVariable => &mut self.class_var,
            EntityKind::ClassConstant => &mut self.class_const,
            EntityKind::Constant => &mut self.constant,
        };
        *flag = enabled;
    }

    /// Human-readable listing used by `--print-config`.
    pub fn format_config(&self) -> String {
        let items = [
            (self.file, "File Comments"),
            (self.class, "Class Comments"),
            (self.interface, "Interface Comments"),
            (self.class_var, "Class Variable Comments"),
            (self.class_const, "Class Constant Comments"),
            (self.constant, "Constant Comments"),
            (self.function, "Function Comments"),
        ];
        let mut out = String::from("Config\n");
        for (value, name) in items {
            let value = if value { "TRUE" } else { "FALSE" };
            out.push_str(&format!("\t{}: {}\n", name, value));
        }
        out
    }
}

/// Contents of a `doccheck.yaml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub report: ReportConfig,
    /// Glob patterns for paths to skip when walking directories.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Fail the run when overall coverage drops below this percentage.
    #[serde(default)]
    pub min_coverage: Option<f64>,
    /// Recognise bare `<?` open tags.
    #[serde(default)]
    pub short_tags: bool,
}

impl ConfigFile {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CheckError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content).map_err(|source| CheckError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// First config file present in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load `explicit` if given, else a discovered file in `dir`, else defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(|| Self::discover(dir)) {
            Some(path) => {
                tracing::debug!(config = %path.display(), "loading config");
                Self::parse_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_report_everything() {
        let config = ReportConfig::default();
        for kind in EntityKind::ALL {
            assert!(config.is_enabled(kind), "{}", kind);
        }
    }

    #[test]
    fn test_set_single_kind() {
        let mut config = ReportConfig::none();
        config.set(EntityKind::ClassConstant, true);
        assert!(config.class_const);
        assert!(!config.class_var);
        assert!(config.is_enabled(EntityKind::ClassConstant));
    }

    #[test]
    fn test_format_config() {
        let mut config = ReportConfig::all();
        config.class_var = false;
        assert_eq!(
            config.format_config(),
            "Config\n\
             \tFile Comments: TRUE\n\
             \tClass Comments: TRUE\n\
             \tInterface Comments: TRUE\n\
             \tClass Variable Comments: FALSE\n\
             \tClass Constant Comments: TRUE\n\
             \tConstant Comments: TRUE\n\
             \tFunction Comments: TRUE\n"
        );
    }

    #[test]
    fn test_partial_report_section_keeps_defaults() {
        let config = ConfigFile::parse_str("report:\n  file: false\nmin_coverage: 75\n").unwrap();
        assert!(!config.report.file);
        assert!(config.report.class);
        assert_eq!(config.min_coverage, Some(75.0));
        assert!(config.excluded_paths.is_empty());
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(ConfigFile::parse_str("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_invalid_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doccheck.yaml");
        fs::write(&path, "report: [1, 2\n").unwrap();
        assert!(matches!(
            ConfigFile::parse_file(&path),
            Err(CheckError::Config { .. })
        ));
    }

    #[test]
    fn test_unreadable_config_file() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            ConfigFile::parse_file(temp.path().join("missing.yaml")),
            Err(CheckError::ConfigRead { .. })
        ));
    }

    #[test]
    fn test_discover_and_load() {
        let temp = TempDir::new().unwrap();
        assert_eq!(ConfigFile::discover(temp.path()), None);
        assert_eq!(
            ConfigFile::load(None, temp.path()).unwrap(),
            ConfigFile::default()
        );

        fs::write(
            temp.path().join(".doccheck.yaml"),
            "excluded_paths:\n  - \"**/vendor/**\"\n",
        )
        .unwrap();
        let loaded = ConfigFile::load(None, temp.path()).unwrap();
        assert_eq!(loaded.excluded_paths, vec!["**/vendor/**".to_string()]);
    }
}
