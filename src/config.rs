use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::catalog::DEFAULT_FOLD_LENGTH;
use crate::core::extract::js::{DEFAULT_GLOBAL, DEFAULT_MODULE};

pub const CONFIG_FILE_NAME: &str = ".potsyncrc.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Text domain whose messages go into the template.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Path of the `.pot` template.
    #[serde(default = "default_template")]
    pub template: String,
    /// Paths of the locale `.po` files kept in sync with the template.
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    /// Theme stylesheet whose header is extracted.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    /// Output directory of JED files. Defaults to each locale's directory.
    #[serde(default)]
    pub json_dir: Option<String>,
    /// Module specifier exporting the JS translation functions.
    #[serde(default = "default_js_module")]
    pub js_module: String,
    /// Global object path exposing the JS translation functions.
    #[serde(default = "default_js_global")]
    pub js_global: Vec<String>,
    /// Line width of PO strings; 0 only breaks after embedded newlines.
    #[serde(default = "default_fold_length")]
    pub fold_length: usize,
}

fn default_domain() -> String {
    "default".to_string()
}

fn default_template() -> String {
    "languages/messages.pot".to_string()
}

fn default_source_roots() -> Vec<String> {
    vec![".".to_string()]
}

fn default_ignores() -> Vec<String> {
    ["**/node_modules/**", "**/vendor/**", "**/.git/**"]
        .map(String::from)
        .to_vec()
}

fn default_stylesheet() -> String {
    "style.css".to_string()
}

fn default_js_module() -> String {
    DEFAULT_MODULE.to_string()
}

fn default_js_global() -> Vec<String> {
    DEFAULT_GLOBAL.iter().map(|s| s.to_string()).collect()
}

fn default_fold_length() -> usize {
    DEFAULT_FOLD_LENGTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            template: default_template(),
            locales: Vec::new(),
            source_roots: default_source_roots(),
            ignores: default_ignores(),
            stylesheet: default_stylesheet(),
            json_dir: None,
            js_module: default_js_module(),
            js_global: default_js_global(),
            fold_length: default_fold_length(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for an empty domain or invalid glob patterns in
    /// `ignores` or `sourceRoots`.
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            bail!("'domain' must not be empty");
        }

        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Roots without wildcards are literal directories.
        for pattern in &self.source_roots {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'sourceRoots': \"{}\"", pattern)
                })?;
            }
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    /// Directory that relative paths in the config resolve against: the
    /// config file's directory, or the start directory without one.
    pub root_dir: PathBuf,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let root_dir = path
                .parent()
                .map_or_else(|| start_dir.to_path_buf(), Path::to_path_buf);
            Ok(ConfigLoadResult {
                config,
                from_file: true,
                root_dir,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
            root_dir: start_dir.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.domain, "default");
        assert_eq!(config.template, "languages/messages.pot");
        assert!(config.locales.is_empty());
        assert_eq!(config.source_roots, vec!["."]);
        assert_eq!(config.ignores.len(), 3);
        assert_eq!(config.json_dir, None);
        assert_eq!(config.js_module, "@wordpress/i18n");
        assert_eq!(config.js_global, vec!["wp", "i18n"]);
        assert_eq!(config.fold_length, 76);
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "domain": "acme",
              "template": "lang/acme.pot",
              "locales": ["lang/acme-fr_FR.po"],
              "jsonDir": "build/lang",
              "foldLength": 0
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.domain, "acme");
        assert_eq!(config.template, "lang/acme.pot");
        assert_eq!(config.locales, vec!["lang/acme-fr_FR.po"]);
        assert_eq!(config.json_dir.as_deref(), Some("build/lang"));
        assert_eq!(config.fold_length, 0);
        assert_eq!(config.stylesheet, "style.css");
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("blocks");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let found = find_config_file(dir.path());
        assert!(found.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("inc");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "domain": "acme", "ignores": ["**/dist/**"] }"#,
        )
        .unwrap();

        let result = load_config(&sub_dir).unwrap();
        assert!(result.from_file);
        assert_eq!(result.root_dir, dir.path());
        assert_eq!(result.config.domain, "acme");
        assert_eq!(result.config.ignores, vec!["**/dist/**"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.root_dir, dir.path());
        assert_eq!(result.config, Config::default());
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_invalid_root_pattern() {
        let config = Config {
            source_roots: vec!["blocks/*/[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("sourceRoots"));
    }

    #[test]
    fn test_validate_empty_domain() {
        let config = Config {
            domain: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_invalid_json_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ domain: }").unwrap();
        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json = default_config_json().unwrap();
        assert!(json.contains("sourceRoots"));
        assert!(json.contains("jsonDir"));
        assert!(json.contains("foldLength"));
    }
}
