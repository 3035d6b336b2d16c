use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

/// Platform config directory path: `<config_dir>/titlecheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("titlecheck").join("config.toml"))
}

/// Load config by cascading CWD `.titlecheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".titlecheck.toml"));
    merge(platform, cwd)
}

fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("warning: ignoring malformed config {}: {}", path.display(), e);
            None
        }
    }
}

fn merge(platform: Option<ConfigFile>, cwd: Option<ConfigFile>) -> ConfigFile {
    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => ConfigFile {
            api: match (p.api, c.api) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(a)) => Some(a),
                (Some(pa), Some(ca)) => Some(ApiConfig {
                    base_url: ca.base_url.or(pa.base_url),
                }),
            },
        },
    }
}

/// Where the bearer token for the current operator session is persisted.
pub fn token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("titlecheck").join("token"))
}

pub fn load_token() -> Option<String> {
    let path = token_path()?;
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

pub fn save_token(token: &str) -> std::io::Result<()> {
    let path = token_path().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "no config directory")
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, token)
}

/// Discard the stored token. Used on signout and forced logout.
pub fn delete_token() {
    if let Some(path) = token_path() {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cwd_config_overrides_platform() {
        let platform = ConfigFile {
            api: Some(ApiConfig {
                base_url: Some("http://platform".into()),
            }),
        };
        let cwd = ConfigFile {
            api: Some(ApiConfig {
                base_url: Some("http://cwd".into()),
            }),
        };
        let merged = merge(Some(platform), Some(cwd));
        assert_eq!(merged.api.unwrap().base_url.as_deref(), Some("http://cwd"));
    }

    #[test]
    fn platform_fills_cwd_gaps() {
        let platform = ConfigFile {
            api: Some(ApiConfig {
                base_url: Some("http://platform".into()),
            }),
        };
        let cwd = ConfigFile {
            api: Some(ApiConfig { base_url: None }),
        };
        let merged = merge(Some(platform), Some(cwd));
        assert_eq!(
            merged.api.unwrap().base_url.as_deref(),
            Some("http://platform")
        );
    }

    #[test]
    fn parses_partial_toml() {
        let config: ConfigFile = toml::from_str("[api]\nbase_url = \"http://x\"\n").unwrap();
        assert_eq!(config.api.unwrap().base_url.as_deref(), Some("http://x"));

        let empty: ConfigFile = toml::from_str("").unwrap();
        assert!(empty.api.is_none());
    }
}
