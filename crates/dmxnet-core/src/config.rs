//! Engine configuration.
//!
//! Version française (résumé):
//! Paramètres d'un moteur : adresse de l'interface, port optionnel et
//! fréquence d'émission. Lecture JSON uniquement, rien n'est réécrit.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// DMX512 refresh ceiling, in frames per second.
pub const DEFAULT_OUTPUT_FRAMERATE: f64 = 44.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid output framerate: {framerate} (expected a positive number)")]
    InvalidFramerate { framerate: f64 },
}

/// Settings for one protocol engine.
///
/// # Examples
/// ```
/// use dmxnet_core::config::ServiceConfig;
///
/// let config = ServiceConfig::from_json_str(r#"{ "adapter": "127.0.0.1", "port": 7000 }"#)?;
/// assert_eq!(config.bind_addr(6454).to_string(), "127.0.0.1:7000");
/// assert_eq!(config.output_framerate, 44.0);
/// # Ok::<(), dmxnet_core::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Local adapter to bind and send from. `0.0.0.0` means any interface.
    pub adapter: IpAddr,
    /// Replaces the protocol's well-known port for binding and destinations.
    pub port: Option<u16>,
    pub output_framerate: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            adapter: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: None,
            output_framerate: DEFAULT_OUTPUT_FRAMERATE,
        }
    }
}

impl ServiceConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.output_interval().map(|_| ())
    }

    /// Time between output frames. Fails when the framerate is not positive
    /// or its period does not fit a non-zero `Duration`.
    pub fn output_interval(&self) -> Result<Duration, ConfigError> {
        let framerate = self.output_framerate;
        if !framerate.is_finite() || framerate <= 0.0 {
            return Err(ConfigError::InvalidFramerate { framerate });
        }
        match Duration::try_from_secs_f64(1.0 / framerate) {
            Ok(interval) if !interval.is_zero() => Ok(interval),
            _ => Err(ConfigError::InvalidFramerate { framerate }),
        }
    }

    pub fn port_or(&self, default_port: u16) -> u16 {
        self.port.unwrap_or(default_port)
    }

    pub fn bind_addr(&self, default_port: u16) -> SocketAddr {
        SocketAddr::new(self.adapter, self.port_or(default_port))
    }
}
