//! Router configuration.
//!
//! All fields have defaults, so an empty TOML document is a valid
//! configuration. The configuration is fixed once a builder is created.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Maximum number of segments a registered pattern may have.
	pub max_segments: usize,

	/// If enabled, the router checks if another method is allowed for the
	/// current route when the request can not be routed. If so, the request is
	/// answered with `405 Method Not Allowed` and an `Allow` header.
	pub handle_method_not_allowed: bool,

	/// If enabled, the router automatically replies to OPTIONS requests.
	/// Registered `OPTIONS` routes take priority over automatic replies.
	pub handle_options: bool,

	/// If enabled, the matched pattern is appended to the parameters under
	/// [`MATCHED_ROUTE_PATH`](crate::MATCHED_ROUTE_PATH).
	pub save_matched_route_path: bool,

	/// How many parameter buffers are kept per arity for reuse.
	pub pool_capacity: usize,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			max_segments: 16,
			handle_method_not_allowed: true,
			handle_options: true,
			save_matched_route_path: false,
			pool_capacity: 64,
		}
	}
}

impl RouterConfig {
	/// Parse and validate a configuration from a TOML document.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		let config: RouterConfig = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Load and validate a configuration from a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = fs::read_to_string(path)?;
		Self::from_toml(&content)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_segments == 0 {
			return Err(ConfigError::Invalid("max_segments must be at least 1".into()));
		}
		if self.pool_capacity == 0 {
			return Err(ConfigError::Invalid("pool_capacity must be at least 1".into()));
		}
		Ok(())
	}
}
