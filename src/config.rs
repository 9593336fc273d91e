//! Configuration for the lint engine
//!
//! Reads configuration from:
//! - `.merlintrc.yaml` / `.merlintrc.json` or `merlint.yaml` (project-level)
//! - the same names in the home directory (user-level)

use crate::diagnostic::Severity;
use crate::fix::FixLevel;
use crate::pipeline::LintOptions;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names searched by [`Config::load_default`], in order
pub const CONFIG_NAMES: &[&str] = &[
    ".merlintrc.yaml",
    ".merlintrc.yml",
    ".merlintrc.json",
    "merlint.yaml",
    "merlint.yml",
    "merlint.json",
];

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lint files in parallel
    pub parallel: bool,

    /// Number of worker threads (0 = number of CPUs)
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
        }
    }
}

/// Settings forwarded to every dialect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Report lenient-mode warnings as errors
    pub strict: bool,

    /// Free-form dialect settings (e.g. `require_direction: false`)
    pub settings: HashMap<String, serde_yaml::Value>,
}

/// Auto-fix settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    pub level: FixLevel,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: ColorMode,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Compact,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Include patterns
    pub include: Vec<String>,

    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.mmd".to_string(), "**/*.mermaid".to_string()],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
            ],
        }
    }
}

/// Diagnostic code configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Codes that are never reported
    pub disabled: Vec<String>,

    /// Ignore codes by prefix (e.g., "PIE_" ignores every pie check)
    pub ignore: Vec<String>,

    /// Severity overrides (code -> severity)
    pub severity: HashMap<String, Severity>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Presets or other configuration files this one builds on
    pub extends: Vec<String>,

    pub engine: EngineConfig,

    pub lint: LintConfig,

    pub fix: FixConfig,

    pub output: OutputConfig,

    pub files: FilesConfig,

    pub rules: RulesConfig,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a preset configuration by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::default()),
            "strict" => Some(Self::preset_strict()),
            _ => None,
        }
    }

    /// Strict preset - lenient warnings become errors
    fn preset_strict() -> Self {
        Self {
            lint: LintConfig {
                strict: true,
                ..LintConfig::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_depth(path, 0)
    }

    /// Load with recursion depth limit (to prevent infinite loops)
    fn load_with_depth(path: &Path, depth: usize) -> Result<Self, ConfigError> {
        const MAX_DEPTH: usize = 10;
        if depth >= MAX_DEPTH {
            return Err(ConfigError::Invalid(
                "Maximum config inheritance depth exceeded".to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        if !config.extends.is_empty() {
            let base_dir = path.parent().unwrap_or(Path::new("."));
            let mut base = Self::default();

            for extend in std::mem::take(&mut config.extends) {
                let extended = match Self::preset(&extend) {
                    Some(preset) => preset,
                    None => {
                        let extend_path = if Path::new(&extend).is_absolute() {
                            PathBuf::from(&extend)
                        } else {
                            base_dir.join(&extend)
                        };
                        Self::load_with_depth(&extend_path, depth + 1)?
                    }
                };
                base.merge(extended);
            }

            base.merge(config);
            config = base;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values serde accepts but the engine cannot use
    fn validate(&self) -> Result<(), ConfigError> {
        for pattern in self.files.include.iter().chain(&self.files.exclude) {
            Glob::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("Bad file pattern '{}': {}", pattern, e))
            })?;
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.engine.jobs != 0 {
            self.engine.jobs = other.engine.jobs;
        }
        self.engine.parallel = other.engine.parallel;

        if other.lint.strict {
            self.lint.strict = true;
        }
        self.lint.settings.extend(other.lint.settings);

        if other.fix.level != FixLevel::Safe {
            self.fix.level = other.fix.level;
        }

        if other.output.format != OutputFormat::Text {
            self.output.format = other.output.format;
        }
        if other.output.color != ColorMode::Auto {
            self.output.color = other.output.color;
        }

        for pattern in other.files.include {
            if !self.files.include.contains(&pattern) {
                self.files.include.push(pattern);
            }
        }
        for pattern in other.files.exclude {
            if !self.files.exclude.contains(&pattern) {
                self.files.exclude.push(pattern);
            }
        }

        self.rules.disabled.extend(other.rules.disabled);
        self.rules.ignore.extend(other.rules.ignore);
        self.rules.severity.extend(other.rules.severity);
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        for name in CONFIG_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                log::debug!("Using config {}", path.display());
                return Self::load(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            for name in CONFIG_NAMES {
                let path = home.join(name);
                if path.exists() {
                    log::debug!("Using config {}", path.display());
                    return Self::load(&path);
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        strict: bool,
        level: Option<FixLevel>,
        jobs: Option<usize>,
        disabled: Vec<String>,
        ignored: Vec<String>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if strict {
            self.lint.strict = true;
        }
        if let Some(level) = level {
            self.fix.level = level;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        self.rules.disabled.extend(disabled);
        self.rules.ignore.extend(ignored);
    }

    /// Options bag handed to every dialect
    pub fn lint_options(&self) -> LintOptions {
        LintOptions {
            strict: self.lint.strict,
            settings: self.lint.settings.clone(),
        }
    }

    /// Check if a diagnostic code is reported at all
    pub fn is_code_enabled(&self, code: &str) -> bool {
        !self.rules.disabled.iter().any(|d| d == code) && !self.matches_ignore_prefix(code)
    }

    /// Check if a code matches any prefix in the ignore list (case-insensitive)
    pub fn matches_ignore_prefix(&self, code: &str) -> bool {
        let upper = code.to_uppercase();
        self.rules
            .ignore
            .iter()
            .any(|prefix| upper.starts_with(&prefix.to_uppercase()))
    }

    /// Get severity override for a code
    pub fn get_severity_override(&self, code: &str) -> Option<Severity> {
        self.rules.severity.get(code).copied()
    }

    /// Compile the include and exclude patterns
    pub fn file_matcher(&self) -> Result<FileMatcher, ConfigError> {
        Ok(FileMatcher {
            include: build_globset(&self.files.include)?,
            exclude: build_globset(&self.files.exclude)?,
        })
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ConfigError::Invalid(format!("Bad file pattern '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Compiled `files.include` / `files.exclude`
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileMatcher {
    /// Whether a file found by directory discovery should be linted
    pub fn is_match(&self, path: &Path) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.is_match(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.fix.level, FixLevel::Safe);
        assert!(!config.lint.strict);
        assert!(!config.files.include.is_empty());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("compact".parse::<OutputFormat>().unwrap(), OutputFormat::Compact);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            true,
            Some(FixLevel::All),
            Some(4),
            vec!["PIE_VALUE_ZERO".to_string()],
            vec!["SEQ_".to_string()],
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.lint.strict);
        assert_eq!(config.fix.level, FixLevel::All);
        assert_eq!(config.engine.jobs, 4);
        assert!(!config.is_code_enabled("PIE_VALUE_ZERO"));
        assert!(!config.is_code_enabled("SEQ_ARROW_INVALID"));
        assert!(config.is_code_enabled("ARROW_INVALID"));
    }

    #[test]
    fn test_ignore_prefix_is_case_insensitive() {
        let mut config = Config::new();
        config.rules.ignore.push("pie_".to_string());
        assert!(config.matches_ignore_prefix("PIE_VALUE_ZERO"));
        assert!(!config.matches_ignore_prefix("ARROW_INVALID"));
    }

    #[test]
    fn test_severity_override() {
        let mut config = Config::new();
        config
            .rules
            .severity
            .insert("PIE_VALUE_ZERO".to_string(), Severity::Error);

        assert_eq!(
            config.get_severity_override("PIE_VALUE_ZERO"),
            Some(Severity::Error)
        );
        assert_eq!(config.get_severity_override("ARROW_INVALID"), None);
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
lint:
  strict: true
  settings:
    require_direction: false
fix:
  level: all
output:
  format: compact
  color: never
rules:
  disabled:
    - PIE_VALUE_ZERO
  severity:
    DIRECTION_MISSING: error
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.jobs, 4);
        assert!(config.lint.strict);
        assert_eq!(config.fix.level, FixLevel::All);
        assert_eq!(config.output.format, OutputFormat::Compact);
        assert_eq!(config.output.color, ColorMode::Never);
        assert_eq!(
            config.get_severity_override("DIRECTION_MISSING"),
            Some(Severity::Error)
        );

        let options = config.lint_options();
        assert!(options.strict);
        assert_eq!(
            options.settings.get("require_direction"),
            Some(&serde_yaml::Value::Bool(false))
        );
    }

    #[test]
    fn test_load_json_with_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".merlintrc.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"extends": ["strict"], "engine": {{"jobs": 2}}}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.lint.strict);
        assert_eq!(config.engine.jobs, 2);
    }

    #[test]
    fn test_extends_relative_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("base.yaml"),
            "rules:\n  disabled: [PIE_VALUE_ZERO]\n",
        )
        .unwrap();
        let path = dir.path().join("merlint.yaml");
        std::fs::write(&path, "extends: [base.yaml]\nrules:\n  ignore: [SEQ_]\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.is_code_enabled("PIE_VALUE_ZERO"));
        assert!(!config.is_code_enabled("SEQ_ARROW_INVALID"));
    }

    #[test]
    fn test_extends_cycle_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("merlint.yaml");
        std::fs::write(&path, "extends: [merlint.yaml]\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("merlint.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_file_matcher() {
        let matcher = Config::new().file_matcher().unwrap();
        assert!(matcher.is_match(Path::new("docs/flow.mmd")));
        assert!(!matcher.is_match(Path::new("docs/readme.md")));
        assert!(!matcher.is_match(Path::new("web/node_modules/pkg/a.mmd")));
    }
}
