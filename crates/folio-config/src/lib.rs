//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ## Environments
//!
//! A build runs in a named environment (`local` by default). When a file
//! named `folio.<env>.toml` sits next to the base config, its tables are
//! merged over the base before deserialization, so an environment file only
//! needs the keys it changes.
//!
//! CLI settings are applied last via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `site.url` and `site.title` support `${VAR}` and `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Environment name that enables production behavior.
pub const PRODUCTION: &str = "production";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Build environment (selects the `folio.<env>.toml` overlay).
    pub environment: Option<String>,
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override site root URL.
    pub url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity and URL rules.
    pub site: SiteConfig,
    /// Build paths as written in TOML.
    build: BuildConfigRaw,
    /// Pagination settings.
    pub pagination: PaginationConfig,
    /// Asset manifest settings as written in TOML.
    assets: AssetsConfigRaw,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Resolved asset configuration (set after loading).
    #[serde(skip)]
    pub assets_resolved: AssetsConfig,
    /// Active environment name.
    #[serde(skip)]
    pub environment: String,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site identity and URL rules.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, exposed to templates as `site.title`.
    pub title: String,
    /// Site root URL (e.g. `https://example.com`). Empty for root-relative URLs.
    pub url: String,
    /// Append `/` to generated URLs whose last segment has no extension.
    pub url_trailing_slash: bool,
}

/// Raw build configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    copy: Vec<String>,
    exclude: Vec<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Content source directory.
    pub source_dir: PathBuf,
    /// Output directory for rendered files.
    pub output_dir: PathBuf,
    /// Source-relative paths copied verbatim to the output (always includes `assets`).
    pub copy: Vec<String>,
    /// Extra extensions excluded from copying.
    pub exclude: Vec<String>,
}

/// Pagination settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Number of entries per page group.
    pub max_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { max_per_page: 15 }
    }
}

/// Raw asset configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AssetsConfigRaw {
    manifest: Option<String>,
}

/// Resolved asset configuration.
#[derive(Debug, Default)]
pub struct AssetsConfig {
    /// Path to the revision manifest JSON file.
    pub manifest_path: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let environment = cli_settings
            .and_then(|s| s.environment.clone())
            .unwrap_or_else(|| "local".to_owned());

        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path, &environment)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered, &environment)?
        } else {
            let mut config = Self::default_with_cwd();
            config.environment = environment;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether the active environment is production.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(environment) = &settings.environment {
            self.environment.clone_from(environment);
        }
        if let Some(source_dir) = &settings.source_dir {
            self.build_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(url) = &settings.url {
            self.site.url = url.trim_end_matches('/').to_owned();
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pagination.max_per_page == 0 {
            return Err(ConfigError::Validation(
                "pagination.max_per_page must be greater than 0".to_owned(),
            ));
        }
        let url = &self.site.url;
        if !url.is_empty()
            && !url.starts_with("http://")
            && !url.starts_with("https://")
            && !url.starts_with('/')
        {
            return Err(ConfigError::Validation(
                "site.url must start with http://, https:// or /".to_owned(),
            ));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            build: BuildConfigRaw::default(),
            pagination: PaginationConfig::default(),
            assets: AssetsConfigRaw::default(),
            build_resolved: BuildConfig {
                source_dir: base.join("source"),
                output_dir: base.join("public"),
                copy: vec!["assets".to_owned()],
                exclude: Vec::new(),
            },
            assets_resolved: AssetsConfig {
                manifest_path: base.join("rev-manifest.json"),
            },
            environment: "local".to_owned(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file, merging the environment overlay.
    fn load_from_file(path: &Path, environment: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut table: toml::Table = toml::from_str(&content)?;

        let overlay_path = environment_file(path, environment);
        if overlay_path.exists() {
            let overlay: toml::Table = toml::from_str(&std::fs::read_to_string(&overlay_path)?)?;
            merge_tables(&mut table, overlay);
        }

        let mut config: Self = toml::Value::Table(table).try_into()?;
        config.environment = environment.to_owned();

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.url = expand::expand_env(&self.site.url, "site.url")?
            .trim_end_matches('/')
            .to_owned();
        self.site.title = expand::expand_env(&self.site.title, "site.title")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| {
            config_dir.join(expand::expand_home(path.unwrap_or(default)))
        };

        let mut copy = vec!["assets".to_owned()];
        for entry in &self.build.copy {
            if !copy.contains(entry) {
                copy.push(entry.clone());
            }
        }

        self.build_resolved = BuildConfig {
            source_dir: resolve(self.build.source_dir.as_deref(), "source"),
            output_dir: resolve(self.build.output_dir.as_deref(), "public"),
            copy,
            exclude: self.build.exclude.clone(),
        };
        self.assets_resolved = AssetsConfig {
            manifest_path: resolve(self.assets.manifest.as_deref(), "rev-manifest.json"),
        };
    }
}

/// Path of the overlay file for `environment` next to `base`.
fn environment_file(base: &Path, environment: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map_or_else(|| "folio".into(), |s| s.to_string_lossy());
    base.with_file_name(format!("{stem}.{environment}.toml"))
}

/// Merge `overlay` into `base`; nested tables merge, other values replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.build_resolved.source_dir,
            PathBuf::from("/test/source")
        );
        assert_eq!(
            config.build_resolved.output_dir,
            PathBuf::from("/test/public")
        );
        assert_eq!(config.build_resolved.copy, vec!["assets".to_owned()]);
        assert_eq!(config.pagination.max_per_page, 15);
        assert_eq!(config.environment, "local");
        assert!(!config.is_production());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.pagination.max_per_page, 15);
        assert!(config.site.url.is_empty());
        assert!(!config.site.url_trailing_slash);
    }

    #[test]
    fn test_parse_site_config() {
        let toml = r#"
[site]
title = "Field Notes"
url = "https://notes.example.com"
url_trailing_slash = true

[pagination]
max_per_page = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.title, "Field Notes");
        assert_eq!(config.site.url, "https://notes.example.com");
        assert!(config.site.url_trailing_slash);
        assert_eq!(config.pagination.max_per_page, 10);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[build]
source_dir = "content"
output_dir = "dist"
copy = ["favicon.ico", "assets"]
exclude = ["psd"]

[assets]
manifest = "build/rev-manifest.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.build_resolved.source_dir,
            PathBuf::from("/project/content")
        );
        assert_eq!(
            config.build_resolved.output_dir,
            PathBuf::from("/project/dist")
        );
        assert_eq!(
            config.build_resolved.copy,
            vec!["assets".to_owned(), "favicon.ico".to_owned()]
        );
        assert_eq!(config.build_resolved.exclude, vec!["psd".to_owned()]);
        assert_eq!(
            config.assets_resolved.manifest_path,
            PathBuf::from("/project/build/rev-manifest.json")
        );
    }

    #[test]
    fn test_environment_overlay_merges_tables() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("folio.toml"),
            "[site]\ntitle = \"Blog\"\nurl = \"http://localhost:8000\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("folio.production.toml"),
            "[site]\nurl = \"https://blog.example.com/\"\n",
        )
        .unwrap();

        let settings = CliSettings {
            environment: Some(PRODUCTION.to_owned()),
            ..Default::default()
        };
        let config = Config::load(Some(dir.path().join("folio.toml").as_path()), Some(&settings)).unwrap();

        assert!(config.is_production());
        assert_eq!(config.site.title, "Blog");
        assert_eq!(config.site.url, "https://blog.example.com");
    }

    #[test]
    fn test_overlay_ignored_for_other_environment() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("folio.toml"), "[site]\nurl = \"/\"\n").unwrap();
        std::fs::write(
            dir.path().join("folio.production.toml"),
            "[site]\nurl = \"https://blog.example.com\"\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path().join("folio.toml").as_path()), None).unwrap();
        assert_eq!(config.environment, "local");
        assert_eq!(config.site.url, "");
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/folio.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            environment: Some("staging".to_owned()),
            source_dir: Some(PathBuf::from("/custom/source")),
            output_dir: None,
            url: Some("https://staging.example.com/".to_owned()),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.environment, "staging");
        assert_eq!(
            config.build_resolved.source_dir,
            PathBuf::from("/custom/source")
        );
        assert_eq!(
            config.build_resolved.output_dir,
            PathBuf::from("/test/public")
        );
        assert_eq!(config.site.url, "https://staging.example.com");
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.pagination.max_per_page = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("max_per_page"));
    }

    #[test]
    fn test_validate_rejects_bare_host_url() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site.url = "example.com".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_tables_nested() {
        let mut base: toml::Table = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Table = toml::from_str("[a]\ny = 3\n[b]\nz = 4\n").unwrap();
        merge_tables(&mut base, overlay);

        let a = base["a"].as_table().unwrap();
        assert_eq!(a["x"].as_integer(), Some(1));
        assert_eq!(a["y"].as_integer(), Some(3));
        assert_eq!(base["b"]["z"].as_integer(), Some(4));
    }

    #[test]
    fn test_environment_file_name() {
        assert_eq!(
            environment_file(Path::new("/p/folio.toml"), "production"),
            PathBuf::from("/p/folio.production.toml")
        );
    }
}
