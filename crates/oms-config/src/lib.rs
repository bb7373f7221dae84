//! Configuration module for the order management service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files with
//! environment variable interpolation and provides validation to ensure all
//! required configuration values are properly set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the order management service.
///
/// Contains all sections required for the service to operate: service
/// identity, the supported currency set, authorization role names, the
/// storage backend selection, and the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the service instance.
	pub service: ServiceConfig,
	/// Supported currency configuration.
	pub currencies: CurrencyConfig,
	/// Role names driving the authorization gate.
	#[serde(default)]
	pub authorization: AuthorizationConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	#[serde(default)]
	pub api: ApiConfig,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Supported currency configuration.
///
/// Orders may only be created in one of the supported codes. A
/// single-currency deployment lists exactly one code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CurrencyConfig {
	/// Supported 3-letter upper-case currency codes.
	pub supported: Vec<String>,
}

/// Role names driving the authorization gate.
///
/// These are explicit configuration rather than ambient constants so that
/// deployments can rename or extend the role vocabulary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizationConfig {
	/// Roles granted full cross-account access and full field visibility.
	#[serde(default = "default_elevated_roles")]
	pub elevated_roles: Vec<String>,
	/// Roles granted cross-account read access with restricted field
	/// visibility.
	#[serde(default = "default_trusted_roles")]
	pub trusted_roles: Vec<String>,
}

impl Default for AuthorizationConfig {
	fn default() -> Self {
		Self {
			elevated_roles: default_elevated_roles(),
			trusted_roles: default_trusted_roles(),
		}
	}
}

/// Returns the default elevated role names.
fn default_elevated_roles() -> Vec<String> {
	vec!["sales_admin".to_string()]
}

/// Returns the default trusted role names.
fn default_trusted_roles() -> Vec<String> {
	vec!["trusted".to_string()]
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
			timeout_seconds: default_api_timeout(),
		}
	}
}

/// Returns the default API enabled flag.
fn default_api_enabled() -> bool {
	true
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Returns the default API timeout in seconds.
fn default_api_timeout() -> u64 {
	30
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables are resolved and the configuration is
	/// validated after parsing.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		raw.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	///
	/// This method checks:
	/// - the service id is not empty
	/// - at least one currency is configured and every code is a 3-letter
	///   upper-case token
	/// - authorization role names are non-empty and do not overlap between
	///   the elevated and trusted sets
	/// - the primary storage backend is named among the implementations
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// Validate currency config
		if self.currencies.supported.is_empty() {
			return Err(ConfigError::Validation(
				"At least one supported currency must be configured".into(),
			));
		}
		for code in &self.currencies.supported {
			if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
				return Err(ConfigError::Validation(format!(
					"Invalid currency code '{}': must be a 3-letter upper-case code",
					code
				)));
			}
		}

		// Validate authorization config
		for role in self
			.authorization
			.elevated_roles
			.iter()
			.chain(&self.authorization.trusted_roles)
		{
			if role.is_empty() {
				return Err(ConfigError::Validation(
					"Authorization role names cannot be empty".into(),
				));
			}
		}
		for role in &self.authorization.elevated_roles {
			if self.authorization.trusted_roles.contains(role) {
				return Err(ConfigError::Validation(format!(
					"Role '{}' cannot be both elevated and trusted",
					role
				)));
			}
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is automatically
/// validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE_CONFIG: &str = r#"
[service]
id = "oms-test"

[currencies]
supported = ["USD"]

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_OMS_HOST", "localhost");
		std::env::set_var("TEST_OMS_PORT", "5432");

		let input = "host = \"${TEST_OMS_HOST}:${TEST_OMS_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("TEST_OMS_HOST");
		std::env::remove_var("TEST_OMS_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_OMS_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_OMS_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_OMS_VAR"));
	}

	#[test]
	fn test_minimal_config_with_defaults() {
		let config: Config = BASE_CONFIG.parse().unwrap();
		assert_eq!(config.service.id, "oms-test");
		assert_eq!(config.currencies.supported, vec!["USD"]);
		assert_eq!(config.authorization.elevated_roles, vec!["sales_admin"]);
		assert_eq!(config.authorization.trusted_roles, vec!["trusted"]);
		assert!(config.api.enabled);
		assert_eq!(config.api.port, 3000);
	}

	#[test]
	fn test_empty_currency_set_rejected() {
		let config_str = BASE_CONFIG.replace("supported = [\"USD\"]", "supported = []");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("At least one supported currency"));
	}

	#[test]
	fn test_malformed_currency_code_rejected() {
		for bad in ["usd", "US", "DOLLARS"] {
			let config_str =
				BASE_CONFIG.replace("supported = [\"USD\"]", &format!("supported = [\"{}\"]", bad));
			let result = Config::from_str(&config_str);
			assert!(result.is_err(), "expected rejection of '{}'", bad);
		}
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = BASE_CONFIG.replace("primary = \"memory\"", "primary = \"postgres\"");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'postgres' not found"));
	}

	#[test]
	fn test_overlapping_roles_rejected() {
		let config_str = format!(
			"{}\n[authorization]\nelevated_roles = [\"trusted\"]\ntrusted_roles = [\"trusted\"]\n",
			BASE_CONFIG
		);
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("cannot be both elevated and trusted"));
	}
}
