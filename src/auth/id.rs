//! Strongly typed identifiers and record ids shared by every stored entity.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validate:ident) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;
/// Resource name that grants every resource at once.
pub const WILDCARD_RESOURCE: &str = "all";

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (username, role, consumer, ...).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters where none are allowed.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (username, role, consumer, ...).
		kind: &'static str,
	},
	/// The identifier starts or ends with whitespace.
	#[error("{kind} identifier has leading or trailing whitespace.")]
	Untrimmed {
		/// Kind of identifier (username, role, consumer, ...).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (username, role, consumer, ...).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { Username, "Unique login name of a service identity.", "Username", validate_token }
def_id! { RoleName, "Unique name of an API role.", "Role", validate_token }
def_id! { ResourceId, "ACL resource group such as `styla_product`.", "Resource", validate_token }
def_id! { UserType, "ACL user type that attribute filters apply to.", "UserType", validate_token }
def_id! { ConsumerName, "Unique display name of an OAuth consumer.", "Consumer", validate_label }

impl ResourceId {
	/// Returns `true` for the resource that stands for "every resource".
	pub fn is_wildcard(&self) -> bool {
		self.0 == WILDCARD_RESOURCE
	}
}

/// Store-assigned numeric id of a persisted record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);
impl Display for RecordId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "#{}", self.0)
	}
}

fn validate_token(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_label(kind, view)?;

	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}

	Ok(())
}

fn validate_label(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.trim().is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.trim() != view {
		return Err(IdentifierError::Untrimmed { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn tokens_reject_whitespace_but_labels_allow_inner_spaces() {
		assert!(Username::new("StylaApiAdminUser").is_ok());
		assert!(Username::new("Styla Admin").is_err(), "Inner whitespace must be rejected.");
		assert_eq!(Username::new(""), Err(IdentifierError::Empty { kind: "Username" }));

		let consumer =
			ConsumerName::new("Styla Api Connector").expect("Consumer label should be valid.");

		assert_eq!(consumer.as_ref(), "Styla Api Connector");
		assert_eq!(
			ConsumerName::new(" Styla"),
			Err(IdentifierError::Untrimmed { kind: "Consumer" })
		);
		assert_eq!(ConsumerName::new("   "), Err(IdentifierError::Empty { kind: "Consumer" }));
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let role: RoleName =
			serde_json::from_str("\"StylaApi2Role\"").expect("Role should deserialize.");

		assert_eq!(role.as_ref(), "StylaApi2Role");
		assert!(serde_json::from_str::<RoleName>("\"with space\"").is_err());
	}

	#[test]
	fn length_limit_and_wildcard() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ResourceId::new(&exact).expect("Exact length should succeed.");

		assert!(ResourceId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
		assert!(ResourceId::new("all").expect("Wildcard should be valid.").is_wildcard());
		assert!(!ResourceId::new("styla_product").expect("Fixture should be valid.").is_wildcard());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ResourceId, u8> = HashMap::from_iter([(
			ResourceId::new("styla_category").expect("Resource used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("styla_category"), Some(&7));
	}
}
