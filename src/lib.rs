//! Provision a dedicated service identity with read-only ACL grants, mint its OAuth1
//! consumer/token pair, and register the credentials with the Styla API in one idempotent
//! `connect` call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod acl;
pub mod auth;
pub mod binding;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod provision;
pub mod registration;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for unit and integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		binding::{BindingRegistry, MemoryBindingRegistry},
		config::ConnectorConfig,
		http::ReqwestTransport,
		provision::{Connector, ReqwestConnector},
		store::{CredentialStore, MemoryStore},
	};

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(std::time::Duration::from_secs(5))
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`Connector`] backed by an in-memory store, an in-memory binding registry,
	/// and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_connector(
		config: ConnectorConfig,
	) -> (ReqwestConnector, Arc<MemoryStore>, Arc<MemoryBindingRegistry>) {
		let store_backend = Arc::new(MemoryStore::default());
		let bindings_backend = Arc::new(MemoryBindingRegistry::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let bindings: Arc<dyn BindingRegistry> = bindings_backend.clone();
		let connector = Connector::with_transport(store, bindings, config, test_reqwest_transport())
			.expect("Test connector configuration should be valid.");

		(connector, store_backend, bindings_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
