//! Provisioning orchestrator powered by the credential store and registration client.

pub mod connect;
pub mod identity;
pub mod permissions;
pub mod token_issuer;

pub use connect::*;
pub use identity::*;
pub use permissions::*;
pub use token_issuer::*;

// self
use crate::{
	_prelude::*,
	binding::BindingRegistry,
	config::ConnectorConfig,
	http::RegistrationTransport,
	registration::RegistrationClient,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Connector specialized for the crate's default reqwest transport.
pub type ReqwestConnector = Connector<ReqwestTransport>;

/// Sequences identity, permission, token, and registration steps into one `connect` call.
///
/// The connector owns the store, binding registry, and registration client references so each
/// stage can focus on its own convergence logic. Every stage re-resolves records by unique key,
/// so a rerun after a partial failure picks up where the previous run stopped.
pub struct Connector<T>
where
	T: ?Sized + RegistrationTransport,
{
	/// Store that persists identities, roles, consumers, tokens, and ACL rows.
	pub store: Arc<dyn CredentialStore>,
	/// Registry receiving the default binding.
	pub bindings: Arc<dyn BindingRegistry>,
	/// Client used for the outbound registration call.
	pub registration: RegistrationClient<T>,
	/// Settings shared by every stage.
	pub config: ConnectorConfig,
	connect_guard: Arc<AsyncMutex<()>>,
}
impl<T> Connector<T>
where
	T: ?Sized + RegistrationTransport,
{
	/// Creates a connector that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		bindings: Arc<dyn BindingRegistry>,
		config: ConnectorConfig,
		transport: impl Into<Arc<T>>,
	) -> Result<Self> {
		config.validate()?;

		Ok(Self {
			store,
			bindings,
			registration: RegistrationClient::new(transport.into(), &config),
			config,
			connect_guard: Default::default(),
		})
	}

	/// Permission assigner bound to this connector's store and user type.
	pub fn permission_assigner(&self) -> PermissionAssigner {
		PermissionAssigner::new(self.store.clone(), self.config.user_type.clone())
	}

	/// Token issuer bound to this connector's store and user type.
	pub fn token_issuer(&self) -> TokenIssuer {
		TokenIssuer::new(self.store.clone(), self.config.user_type.clone())
	}
}
#[cfg(feature = "reqwest")]
impl Connector<ReqwestTransport> {
	/// Creates a connector with its own reqwest transport bounded by the configured timeout.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		bindings: Arc<dyn BindingRegistry>,
		config: ConnectorConfig,
	) -> Result<Self> {
		let transport = ReqwestTransport::with_timeout(config.request_timeout())?;

		Self::with_transport(store, bindings, config, transport)
	}
}
impl<T> Clone for Connector<T>
where
	T: ?Sized + RegistrationTransport,
{
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			bindings: self.bindings.clone(),
			registration: self.registration.clone(),
			config: self.config.clone(),
			connect_guard: self.connect_guard.clone(),
		}
	}
}
impl<T> Debug for Connector<T>
where
	T: ?Sized + RegistrationTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("registration", &self.registration)
			.field("username", &self.config.username)
			.field("consumer_name", &self.config.consumer_name)
			.finish()
	}
}
