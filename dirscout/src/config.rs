use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};

/// How traversal failures (unreadable directories or files) are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log the failure, record it in the summary and keep going
    #[default]
    Skip,
    /// Stop the whole run at the first failure
    FailFast,
}

/// Configuration for a search run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.dirscout.yaml` in the current directory
/// 3. Global `$HOME/.config/dirscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Literal term to search for
/// term: "TODO"
///
/// # Directory to start from
/// root_path: "."
///
/// # Directory names whose whole subtree is skipped
/// ignored_dirs:
///   - "target"
///   - ".git"
///
/// # File extensions to skip (with or without the leading dot)
/// ignored_extensions:
///   - "lock"
///   - ".png"
///
/// # Worker threads (default: CPU cores)
/// thread_count: 4
///
/// # skip | fail_fast
/// error_policy: skip
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence over config file values, see
/// [`SearchConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The literal term to search for
    #[serde(default)]
    pub term: String,

    /// Root directory to start search from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Directory names to skip, matched exactly against the entry name
    #[serde(default)]
    pub ignored_dirs: Vec<String>,

    /// File extensions to skip
    #[serde(default)]
    pub ignored_extensions: Vec<String>,

    /// Whether to only show statistics instead of individual matches
    #[serde(default)]
    pub stats_only: bool,

    /// Number of worker threads
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// What to do when a directory or file cannot be read
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Number of file results buffered before workers wait on the consumer
    #[serde(default = "default_result_buffer")]
    pub result_buffer: usize,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_result_buffer() -> usize {
    256
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            term: String::new(),
            root_path: default_root_path(),
            ignored_dirs: Vec::new(),
            ignored_extensions: Vec::new(),
            stats_only: false,
            thread_count: default_thread_count(),
            log_level: default_log_level(),
            error_policy: ErrorPolicy::default(),
            result_buffer: default_result_buffer(),
        }
    }
}

impl SearchConfig {
    /// Creates a config searching `root_path` for `term` with default settings
    pub fn new(term: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            term: term.into(),
            root_path: root_path.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from the default locations plus an optional explicit file
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("dirscout/config.yaml")),
            Some(PathBuf::from(".dirscout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        if !cli_config.term.is_empty() {
            self.term = cli_config.term;
        }
        if cli_config.root_path != default_root_path() {
            self.root_path = cli_config.root_path;
        }
        if !cli_config.ignored_dirs.is_empty() {
            self.ignored_dirs = cli_config.ignored_dirs;
        }
        if !cli_config.ignored_extensions.is_empty() {
            self.ignored_extensions = cli_config.ignored_extensions;
        }
        if cli_config.stats_only {
            self.stats_only = true;
        }
        if cli_config.thread_count != default_thread_count() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        if cli_config.error_policy != ErrorPolicy::default() {
            self.error_policy = cli_config.error_policy;
        }
        if cli_config.result_buffer != default_result_buffer() {
            self.result_buffer = cli_config.result_buffer;
        }
        self
    }

    /// Checks the settings that must hold before any filesystem access
    pub fn validate(&self) -> SearchResult<()> {
        if self.term.is_empty() {
            return Err(SearchError::usage(
                "Please specify a search term (--term <some_term>)",
            ));
        }
        Ok(())
    }

    /// Renders the effective configuration as YAML
    pub fn to_yaml(&self) -> SearchResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            term: "TODO"
            root_path: "src"
            ignored_dirs: ["target", ".git"]
            ignored_extensions: ["lock"]
            stats_only: true
            thread_count: 4
            log_level: "debug"
            error_policy: fail_fast
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.term, "TODO");
        assert_eq!(config.root_path, PathBuf::from("src"));
        assert_eq!(config.ignored_dirs, vec!["target", ".git"]);
        assert_eq!(config.ignored_extensions, vec!["lock"]);
        assert!(config.stats_only);
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert_eq!(config.result_buffer, 256);
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "term: \"needle\"\n").unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.term, "needle");
        assert_eq!(config.root_path, PathBuf::from("."));
        assert!(config.ignored_dirs.is_empty());
        assert!(config.ignored_extensions.is_empty());
        assert!(!config.stats_only);
        assert_eq!(config.thread_count, default_thread_count());
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.error_policy, ErrorPolicy::Skip);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "thread_count: \"invalid\"\nerror_policy: sometimes\n",
        )
        .unwrap();

        let result = SearchConfig::load_from(Some(&config_path));
        assert!(matches!(result, Err(SearchError::Config(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SearchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let config_file = SearchConfig {
            term: "TODO".to_string(),
            root_path: PathBuf::from("src"),
            ignored_dirs: vec!["target".to_string()],
            ignored_extensions: vec!["lock".to_string()],
            thread_count: NonZeroUsize::new(4).unwrap(),
            ..Default::default()
        };

        let cli_config = SearchConfig {
            term: "FIXME".to_string(),
            root_path: PathBuf::from("tests"),
            ignored_dirs: vec![],
            ignored_extensions: vec!["tmp".to_string()],
            stats_only: true,
            log_level: "debug".to_string(),
            error_policy: ErrorPolicy::FailFast,
            ..Default::default()
        };

        let merged = config_file.merge_with_cli(cli_config);
        assert_eq!(merged.term, "FIXME");
        assert_eq!(merged.root_path, PathBuf::from("tests"));
        assert_eq!(merged.ignored_dirs, vec!["target"]); // file value, CLI empty
        assert_eq!(merged.ignored_extensions, vec!["tmp"]);
        assert!(merged.stats_only);
        assert_eq!(merged.log_level, "debug");
        assert_eq!(merged.error_policy, ErrorPolicy::FailFast);
    }

    #[test]
    fn test_validate_rejects_empty_term() {
        let config = SearchConfig::new("", "/definitely/not/a/real/path");
        assert!(matches!(config.validate(), Err(SearchError::Usage(_))));

        let config = SearchConfig::new("x", "/definitely/not/a/real/path");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" node_modules, .git ,,target "),
            vec!["node_modules", ".git", "target"]
        );
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_to_yaml_round_trips_policy() {
        let config = SearchConfig {
            error_policy: ErrorPolicy::FailFast,
            ..SearchConfig::new("needle", "src")
        };
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("term: needle"));
        assert!(yaml.contains("error_policy: fail_fast"));
    }
}
