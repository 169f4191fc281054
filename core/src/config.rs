//! Client configuration: where the API lives and how bodies are encoded.

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.zhconvert.org";

pub const BASE_URL_ENV: &str = "ZHCONVERT_BASE_URL";
pub const BODY_ENCODING_ENV: &str = "ZHCONVERT_BODY_ENCODING";

/// Encoding of the convert request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyEncoding {
    /// `application/json`; booleans and integers stay native.
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`; every value becomes text.
    Form,
}

impl BodyEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            BodyEncoding::Json => "application/json",
            BodyEncoding::Form => "application/x-www-form-urlencoded",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(BodyEncoding::Json),
            "form" => Ok(BodyEncoding::Form),
            _ => Err(ConfigError::UnknownBodyEncoding(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub body_encoding: BodyEncoding,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            body_encoding: BodyEncoding::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            body_encoding: BodyEncoding::default(),
        })
    }

    pub fn with_body_encoding(mut self, body_encoding: BodyEncoding) -> Self {
        self.body_encoding = body_encoding;
        self
    }

    /// Defaults overridden by `ZHCONVERT_BASE_URL` and `ZHCONVERT_BODY_ENCODING`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ClientConfig::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(encoding) = lookup(BODY_ENCODING_ENV).filter(|v| !v.trim().is_empty()) {
            config.body_encoding = BodyEncoding::parse(&encoding)?;
        }
        Ok(config)
    }
}

fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(url.to_string()));
    }
    Ok(url.trim_end_matches('/').to_string())
}
