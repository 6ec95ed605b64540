//! Gateway configuration with validation.
//!
//! Every section has working defaults so the gateway can boot with no
//! configuration at all; deployments override individual fields through
//! `STREAMGATE_*` environment variables (see the binary's `load_config`).

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Identity-provider token verification
    pub identity: IdentityConfig,
    /// Capability token verification for playback
    pub capability: CapabilityConfig,
    /// Per-wallet upload quota
    pub quota: QuotaConfig,
    /// Direct-upload link parameters
    pub upload: UploadConfig,
    /// Video hosting provider API
    pub video_host: VideoHostConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            cors: CorsConfig::default(),
            identity: IdentityConfig::default(),
            capability: CapabilityConfig::default(),
            quota: QuotaConfig::default(),
            upload: UploadConfig::default(),
            video_host: VideoHostConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::InvalidAddress("http port cannot be 0".into()));
        }

        if self.cors.allowed_origin.is_empty() {
            return Err(ConfigError::Invalid("allowed origin cannot be empty".into()));
        }

        if !self.identity.jwks_url.starts_with("http://")
            && !self.identity.jwks_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidUrl(format!(
                "jwks url must be http(s), got '{}'",
                self.identity.jwks_url
            )));
        }

        // The capability key is a compressed BLS12-381 G1 point: 48 bytes.
        match hex::decode(self.capability.network_pubkey.trim_start_matches("0x")) {
            Ok(bytes) if bytes.len() == 48 => {}
            Ok(bytes) => {
                return Err(ConfigError::InvalidKey(format!(
                    "network public key must be 48 bytes, got {}",
                    bytes.len()
                )));
            }
            Err(_) => {
                return Err(ConfigError::InvalidKey(
                    "network public key is not valid hex".into(),
                ));
            }
        }

        if self.capability.playback_ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidDuration(
                "playback ttl cannot be 0".into(),
            ));
        }

        if self.upload.max_duration_seconds == 0 {
            return Err(ConfigError::InvalidLimit(
                "max upload duration cannot be 0".into(),
            ));
        }

        if self.upload.window.as_secs() == 0 {
            return Err(ConfigError::InvalidDuration(
                "upload window cannot be 0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.upload.thumbnail_timestamp_pct) {
            return Err(ConfigError::InvalidLimit(
                "thumbnail timestamp must be between 0 and 1".into(),
            ));
        }

        if self.video_host.api_base.is_empty() {
            return Err(ConfigError::InvalidUrl("video host api base cannot be empty".into()));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8787)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8787,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origin ("*" for all)
    pub allowed_origin: String,
    /// Max age for preflight cache
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            max_age: 86400, // 24 hours
        }
    }
}

/// Identity-provider token verification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// JWKS endpoint of the identity provider
    pub jwks_url: String,
    /// How long a fetched key set stays fresh (0 = fetch on every request)
    #[serde(with = "humantime_serde")]
    pub key_cache_ttl: Duration,
    /// Reject tokens whose `exp` claim has passed
    pub reject_expired: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwks_url: "https://auth.unstoppabledomains.com/keys".to_string(),
            key_cache_ttl: Duration::ZERO,
            reject_expired: false,
        }
    }
}

/// Capability token verification for playback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    /// Network public key the capability signatures verify against (48-byte hex)
    pub network_pubkey: String,
    /// Lifetime of playback tokens minted for verified callers
    #[serde(with = "humantime_serde")]
    pub playback_ttl: Duration,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            network_pubkey: streamgate_auth::DEFAULT_NETWORK_PUBKEY.to_string(),
            playback_ttl: Duration::from_secs(12 * 60 * 60), // 12 hours
        }
    }
}

/// Per-wallet upload quota
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Uploads counted before further ones are refused
    pub max_videos: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { max_videos: 10 }
    }
}

/// Direct-upload link parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Longest video the provider should accept, in seconds
    pub max_duration_seconds: u64,
    /// How long an issued upload link stays usable
    #[serde(with = "humantime_serde")]
    pub window: Duration,
    /// Position of the auto-generated thumbnail, as a fraction of duration
    pub thumbnail_timestamp_pct: f64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_duration_seconds: 3600,
            window: Duration::from_secs(5 * 60),
            thumbnail_timestamp_pct: 0.568427,
        }
    }
}

/// Video hosting provider API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoHostConfig {
    /// Base URL of the provider API
    pub api_base: String,
    /// Account the videos live under
    pub account_id: String,
    /// Bearer token for the provider API
    pub api_token: String,
}

impl Default for VideoHostConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudflare.com/client/v4".to_string(),
            account_id: String::new(),
            api_token: String::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid bind address or port
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Invalid URL
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Invalid key material
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid duration value
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parse a human-readable duration: "500ms", "30s", "5m", or plain seconds.
pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    let s = s.trim();
    // "ms" must be tried before the single-letter suffixes or "100ms"
    // would be read as minutes.
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| "invalid milliseconds")
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| "invalid seconds")
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .map(|m| Duration::from_secs(m * 60))
            .map_err(|_| "invalid minutes")
    } else if let Some(hours) = s.strip_suffix('h') {
        hours
            .trim()
            .parse::<u64>()
            .map(|h| Duration::from_secs(h * 3600))
            .map_err(|_| "invalid hours")
    } else {
        // Try parsing as plain seconds
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| "invalid duration format")
    }
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
