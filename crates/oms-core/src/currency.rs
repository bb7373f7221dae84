//! Currency validation.

use std::collections::HashSet;

/// Validates currency codes against the configured supported set.
///
/// Pure lookup with no side effects; used only as a creation-time gate.
#[derive(Debug, Clone)]
pub struct CurrencyValidator {
	supported: HashSet<String>,
}

impl CurrencyValidator {
	/// Builds a validator from the configured codes.
	pub fn new(codes: &[String]) -> Self {
		Self {
			supported: codes.iter().map(|c| c.to_ascii_uppercase()).collect(),
		}
	}

	/// Whether the given code is supported. Comparison is case-insensitive;
	/// the canonical form is upper-case.
	pub fn is_supported(&self, code: &str) -> bool {
		self.supported.contains(&code.to_ascii_uppercase())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_membership() {
		let validator = CurrencyValidator::new(&["USD".to_string()]);
		assert!(validator.is_supported("USD"));
		assert!(validator.is_supported("usd"));
		assert!(!validator.is_supported("EUR"));
		assert!(!validator.is_supported(""));
	}
}
