//! Network-layer settings.

use serde::Deserialize;

use giraffe_types::error::{GiraffeError, Result};

/// Settings for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetConfig {
    /// Sent as the `User-Agent` request header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Number of `301` hops followed before giving up.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u8,
}

fn default_user_agent() -> String {
    "Giraffe".to_string()
}

fn default_max_redirects() -> u8 {
    10
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl NetConfig {
    /// Parse from a TOML string; missing keys take their defaults.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: NetConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(GiraffeError::Config("user_agent must not be empty".into()));
        }
        if self.user_agent.contains(['\r', '\n']) {
            return Err(GiraffeError::Config(
                "user_agent must be a single line".into(),
            ));
        }
        Ok(())
    }
}
