//! OAuth1 consumer records.

// self
use crate::{
	_prelude::*,
	auth::{ConsumerName, RecordId, Secret, secret},
};

/// OAuth1 client identity (key + secret) representing the local integration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
	/// Store-assigned id; `None` until persisted.
	pub id: Option<RecordId>,
	/// Unique consumer name; one consumer per integration.
	pub name: ConsumerName,
	/// Public consumer key.
	pub key: String,
	/// Consumer secret; only ever sent over the registration channel.
	pub secret: Secret,
	/// Creation instant.
	pub created_at: OffsetDateTime,
}
impl Consumer {
	/// Mints an unsaved consumer with freshly generated key and secret.
	pub fn generate(name: ConsumerName) -> Self {
		Self {
			id: None,
			name,
			key: secret::generate_token(),
			secret: Secret::generate(),
			created_at: OffsetDateTime::now_utc(),
		}
	}
}
