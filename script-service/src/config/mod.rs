use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_WORD_LIMIT: u32 = 100;
const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub openai: OpenAiConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Word budget appended to every user prompt.
    pub word_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_seconds: i64,
}

impl ScriptConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ScriptConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: mongodb_uri(is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("NolanAIScripts"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("generatedScripts"), is_prod)?,
            },
            openai: OpenAiConfig {
                api_key: get_env_any(&["OPENAI_API_KEY", "GPT_SECRET"], None, is_prod)?,
                base_url: get_env("OPENAI_BASE_URL", Some(DEFAULT_OPENAI_BASE_URL), is_prod)?,
                model: get_env("OPENAI_MODEL", Some(DEFAULT_OPENAI_MODEL), is_prod)?,
                timeout_secs: get_env_parsed(
                    "OPENAI_TIMEOUT_SECS",
                    DEFAULT_TIMEOUT_SECS,
                    is_prod,
                )?,
                word_limit: get_env_parsed("SCRIPT_WORD_LIMIT", DEFAULT_WORD_LIMIT, is_prod)?,
            },
            jwt: JwtConfig {
                secret: get_env_any(&["JWT_SECRET", "ACCESS_TOKEN_SECRET"], None, is_prod)?,
                expiry_seconds: get_env_parsed(
                    "JWT_EXPIRY_SECONDS",
                    DEFAULT_TOKEN_EXPIRY_SECONDS,
                    is_prod,
                )?,
            },
        })
    }
}

/// `MONGODB_URI` if set, otherwise an Atlas SRV URI assembled from
/// `DB_USER`, `DB_PASSWORD` and `MONGODB_HOST`.
fn mongodb_uri(is_prod: bool) -> Result<String, AppError> {
    if let Ok(uri) = env::var("MONGODB_URI") {
        return Ok(uri);
    }

    match (
        env::var("DB_USER"),
        env::var("DB_PASSWORD"),
        env::var("MONGODB_HOST"),
    ) {
        (Ok(user), Ok(password), Ok(host)) => Ok(srv_uri(&user, &password, &host)),
        _ => get_env("MONGODB_URI", None, is_prod),
    }
}

fn srv_uri(user: &str, password: &str, host: &str) -> String {
    format!(
        "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
        urlencoding::encode(user),
        urlencoding::encode(password),
        host
    )
}

fn get_env_any(keys: &[&str], default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    keys.iter()
        .find_map(|key| env::var(key).ok())
        .map(Ok)
        .unwrap_or_else(|| get_env(keys[0], default, is_prod))
}

fn get_env_parsed<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: FromStr + Display + Copy,
{
    let raw = get_env(key, Some(&default.to_string()), is_prod)?;
    Ok(parse_or_default(key, &raw, default))
}

fn parse_or_default<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(
            key = %key,
            value = %raw,
            default = %default,
            "Ignoring unparseable setting, using default"
        );
        default
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
