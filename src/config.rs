use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CossError;

/// Where on the site to fetch from. Defaults point at production; tests
/// redirect them at a mock server through the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_product_base")]
    pub product_base: String,
    #[serde(default = "default_stock_endpoint")]
    pub stock_endpoint: String,
    #[serde(default = "default_image_base")]
    pub image_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            product_base: default_product_base(),
            stock_endpoint: default_stock_endpoint(),
            image_base: default_image_base(),
        }
    }
}

fn default_product_base() -> String {
    "https://www.clasohlson.com/se/p/".to_string()
}

fn default_stock_endpoint() -> String {
    "https://www.clasohlson.com/se/cocheckout/getCartDataOnReload".to_string()
}

fn default_image_base() -> String {
    "https://images.clasohlson.com".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub chat_id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct RawTelegram {
    token: Option<String>,
    chat_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    products: Vec<String>,
    #[serde(default)]
    telegram: RawTelegram,
    #[serde(default)]
    endpoints: Endpoints,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub products: Vec<String>,
    pub telegram: Telegram,
    pub endpoints: Endpoints,
}

/// Snapshot of the credential-bearing environment, taken once so the
/// resolver never reads process state itself.
#[derive(Debug, Default)]
pub struct Env {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub token_file: Option<PathBuf>,
}

impl Env {
    pub fn from_process() -> Self {
        Self {
            token: env::var("TELEGRAM_TOKEN").ok(),
            chat_id: env::var("TELEGRAM_CHAT_ID").ok(),
            token_file: env::var_os("TELEGRAM_TOKEN_FILE").map(PathBuf::from),
        }
    }
}

impl Config {
    /// Load `config.json` from the working directory, with credentials
    /// resolved from the process environment first.
    pub fn load() -> Result<Self, CossError> {
        Self::from_file("config.json", &Env::from_process())
    }

    pub fn from_file<P: AsRef<Path>>(path: P, env: &Env) -> Result<Self, CossError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CossError::ConfigMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(CossError::ConfigUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let raw: RawConfig =
            serde_json::from_str(&contents).map_err(|e| CossError::ConfigInvalid(e.to_string()))?;
        let telegram = resolve_telegram(raw.telegram, env)?;

        Ok(Self {
            products: raw.products,
            telegram,
            endpoints: raw.endpoints,
        })
    }
}

/// Credential precedence: environment variable, then mounted secret file,
/// then the config file. Absent everywhere is a hard failure.
fn resolve_telegram(raw: RawTelegram, env: &Env) -> Result<Telegram, CossError> {
    let token = match (&env.token, &env.token_file) {
        (Some(token), _) => Some(token.clone()),
        (None, Some(path)) => {
            let secret = fs::read_to_string(path).map_err(|e| CossError::ConfigUnreadable {
                path: path.clone(),
                source: e,
            })?;
            Some(secret.trim().to_string())
        }
        (None, None) => raw.token,
    };

    let chat_id = match &env.chat_id {
        Some(value) => Some(value.parse::<i64>().map_err(|_| {
            CossError::ConfigInvalid(format!("TELEGRAM_CHAT_ID is not an integer: {value}"))
        })?),
        None => raw.chat_id,
    };

    match (token, chat_id) {
        (Some(token), Some(chat_id)) => Ok(Telegram { token, chat_id }),
        _ => Err(CossError::CredentialsMissing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_products_and_credentials_from_file() {
        let (_dir, path) = write_config(
            r#"{"products": ["40-1234", "31-9999"],
                "telegram": {"token": "t0k", "chat_id": 42}}"#,
        );
        let config = Config::from_file(&path, &Env::default()).unwrap();

        assert_eq!(config.products, vec!["40-1234", "31-9999"]);
        assert_eq!(config.telegram.token, "t0k");
        assert_eq!(config.telegram.chat_id, 42);
        assert_eq!(
            config.endpoints.product_base,
            "https://www.clasohlson.com/se/p/"
        );
    }

    #[test]
    fn missing_file_is_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("config.json"), &Env::default()).unwrap_err();
        assert!(matches!(err, CossError::ConfigMissing { .. }));
    }

    #[test]
    fn invalid_json_is_config_invalid() {
        let (_dir, path) = write_config("{products: nope");
        let err = Config::from_file(&path, &Env::default()).unwrap_err();
        assert!(matches!(err, CossError::ConfigInvalid(_)));
    }

    #[test]
    fn environment_beats_config_file() {
        let (_dir, path) = write_config(
            r#"{"products": [], "telegram": {"token": "from-file", "chat_id": 1}}"#,
        );
        let env = Env {
            token: Some("from-env".into()),
            chat_id: Some("2".into()),
            token_file: None,
        };
        let config = Config::from_file(&path, &env).unwrap();

        assert_eq!(config.telegram.token, "from-env");
        assert_eq!(config.telegram.chat_id, 2);
    }

    #[test]
    fn secret_file_beats_config_but_not_env() {
        let (dir, path) = write_config(r#"{"products": [], "telegram": {"chat_id": 1}}"#);
        let secret_path = dir.path().join("telegram_token");
        fs::write(&secret_path, "s3cret\n").unwrap();

        let env = Env {
            token: None,
            chat_id: None,
            token_file: Some(secret_path),
        };
        let config = Config::from_file(&path, &env).unwrap();
        assert_eq!(config.telegram.token, "s3cret");
    }

    #[test]
    fn absent_credentials_everywhere_is_fatal() {
        let (_dir, path) = write_config(r#"{"products": ["40-1234"]}"#);
        let err = Config::from_file(&path, &Env::default()).unwrap_err();
        assert!(matches!(err, CossError::CredentialsMissing));
    }

    #[test]
    fn non_integer_chat_id_from_env_is_config_invalid() {
        let (_dir, path) = write_config(r#"{"products": []}"#);
        let env = Env {
            token: Some("t".into()),
            chat_id: Some("not-a-number".into()),
            token_file: None,
        };
        let err = Config::from_file(&path, &env).unwrap_err();
        assert!(matches!(err, CossError::ConfigInvalid(_)));
    }

    #[test]
    fn endpoints_can_be_overridden() {
        let (_dir, path) = write_config(
            r#"{"products": [],
                "telegram": {"token": "t", "chat_id": 1},
                "endpoints": {"product_base": "http://localhost:1234/p/"}}"#,
        );
        let config = Config::from_file(&path, &Env::default()).unwrap();

        assert_eq!(config.endpoints.product_base, "http://localhost:1234/p/");
        // Unset endpoints keep their defaults.
        assert_eq!(config.endpoints.image_base, "https://images.clasohlson.com");
    }
}
