use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// How chunk buffers are materialized for workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMode {
    /// Workers search zero-copy views into the text
    #[default]
    Borrowed,
    /// Each worker copies its chunk into a buffer it owns for the task
    Owned,
}

/// Configuration for a counting run.
///
/// # Configuration Locations
///
/// Loaded from the following locations, later ones taking precedence:
/// 1. Global `$CONFIG_DIR/parcount/config.yaml`
/// 2. Local `.parcount.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// # Configuration Format
///
/// ```yaml
/// # File holding the text to search
/// text_path: "corpus.txt"
///
/// # File holding the pattern
/// pattern_path: "pattern.txt"
///
/// # Worker count (default: CPU cores)
/// thread_count: 8
///
/// # borrowed | owned
/// chunk_mode: "owned"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence over file values, see
/// [`CountConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountConfig {
    /// File containing the text to search
    #[serde(default)]
    pub text_path: PathBuf,

    /// File containing the pattern; its bytes are used verbatim
    #[serde(default)]
    pub pattern_path: PathBuf,

    /// Number of worker threads
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    #[serde(default)]
    pub chunk_mode: ChunkMode,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

pub fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

pub fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            text_path: PathBuf::new(),
            pattern_path: PathBuf::new(),
            thread_count: default_thread_count(),
            chunk_mode: ChunkMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl CountConfig {
    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("parcount/config.yaml")),
            Some(PathBuf::from(".parcount.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Only values the user actually passed override the file.
    pub fn merge_with_cli(mut self, cli_config: CliOverrides) -> Self {
        if let Some(path) = cli_config.text_path {
            self.text_path = path;
        }
        if let Some(path) = cli_config.pattern_path {
            self.pattern_path = path;
        }
        if let Some(threads) = cli_config.thread_count {
            self.thread_count = threads;
        }
        if let Some(mode) = cli_config.chunk_mode {
            self.chunk_mode = mode;
        }
        if let Some(level) = cli_config.log_level {
            self.log_level = level;
        }
        self
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub text_path: Option<PathBuf>,
    pub pattern_path: Option<PathBuf>,
    pub thread_count: Option<NonZeroUsize>,
    pub chunk_mode: Option<ChunkMode>,
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        config_path
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            &dir,
            r#"
            text_path: "corpus.txt"
            pattern_path: "needle.txt"
            thread_count: 4
            chunk_mode: "owned"
            log_level: "debug"
        "#,
        );

        let config = CountConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.text_path, PathBuf::from("corpus.txt"));
        assert_eq!(config.pattern_path, PathBuf::from("needle.txt"));
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.chunk_mode, ChunkMode::Owned);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config(&dir, "text_path: \"a.txt\"\n");

        let config = CountConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.text_path, PathBuf::from("a.txt"));
        assert_eq!(config.pattern_path, PathBuf::new());
        assert_eq!(config.thread_count, default_thread_count());
        assert_eq!(config.chunk_mode, ChunkMode::Borrowed);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_zero_thread_count_is_rejected() {
        let dir = tempdir().unwrap();
        let config_path = write_config(&dir, "thread_count: 0\n");
        assert!(CountConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            &dir,
            r#"
            thread_count: "invalid"  # Should be number
            chunk_mode: "sideways"
        "#,
        );
        assert!(CountConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = CountConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = CountConfig {
            text_path: PathBuf::from("file_text.txt"),
            pattern_path: PathBuf::from("file_pattern.txt"),
            thread_count: NonZeroUsize::new(4).unwrap(),
            chunk_mode: ChunkMode::Owned,
            log_level: "info".to_string(),
        };

        let merged = file_config.merge_with_cli(CliOverrides {
            text_path: Some(PathBuf::from("cli_text.txt")),
            thread_count: NonZeroUsize::new(8),
            ..Default::default()
        });

        assert_eq!(merged.text_path, PathBuf::from("cli_text.txt")); // CLI value
        assert_eq!(merged.pattern_path, PathBuf::from("file_pattern.txt")); // File value
        assert_eq!(merged.thread_count, NonZeroUsize::new(8).unwrap()); // CLI value
        assert_eq!(merged.chunk_mode, ChunkMode::Owned); // File value
        assert_eq!(merged.log_level, "info"); // File value
    }
}
