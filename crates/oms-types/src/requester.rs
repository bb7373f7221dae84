//! Requester context for authorization decisions.
//!
//! A requester is a per-request value derived from upstream authentication;
//! it is never persisted. It names the calling party (a user or a partner)
//! and carries the role flags granted by the identity layer.

use std::collections::HashSet;

use crate::order::{Party, PartyType};

/// Identity and role flags of the caller of a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requester {
	/// Set when the caller is a user-side identity.
	pub user_id: Option<String>,
	/// Set when the caller is a partner-side identity.
	pub partner_id: Option<String>,
	/// Role flags granted upstream, e.g. `trusted` or `sales_admin`.
	pub roles: HashSet<String>,
}

impl Requester {
	/// Builds a user-side requester with no roles.
	pub fn user(id: impl Into<String>) -> Self {
		Self {
			user_id: Some(id.into()),
			..Default::default()
		}
	}

	/// Builds a partner-side requester with no roles.
	pub fn partner(id: impl Into<String>) -> Self {
		Self {
			partner_id: Some(id.into()),
			..Default::default()
		}
	}

	/// Adds a role flag; consuming builder style for tests and call sites.
	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.roles.insert(role.into());
		self
	}

	/// Whether the requester carries the given role flag.
	pub fn has_role(&self, role: &str) -> bool {
		self.roles.contains(role)
	}

	/// Whether the requester is the given party, matching both id and type.
	///
	/// A user-side requester never matches a partner party and vice versa,
	/// even if the raw ids collide.
	pub fn is_party(&self, party: &Party) -> bool {
		match party.party_type {
			PartyType::User => self.user_id.as_deref() == Some(party.id.as_str()),
			PartyType::Partner => self.partner_id.as_deref() == Some(party.id.as_str()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_party_match_requires_matching_type() {
		let requester = Requester::user("id-1");
		assert!(requester.is_party(&Party::user("id-1")));
		// Same raw id, wrong party type.
		assert!(!requester.is_party(&Party::partner("id-1")));
		assert!(!requester.is_party(&Party::user("id-2")));
	}

	#[test]
	fn test_roles() {
		let requester = Requester::partner("partner-1").with_role("trusted");
		assert!(requester.has_role("trusted"));
		assert!(!requester.has_role("sales_admin"));
	}
}
