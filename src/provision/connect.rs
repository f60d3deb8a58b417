//! The `connect` operation: provision, issue, register, bind.
//!
//! Stages run in a fixed order and every one converges on rerun. The endpoint is resolved
//! before anything is written so an invalid override leaves the store untouched. Calls on the
//! same [`Connector`] are serialized by a shared async mutex.

// self
use crate::{
	_prelude::*,
	acl::RoleAssignmentRequest,
	auth::{Consumer, LoginData, Token},
	binding::DefaultBinding,
	http::RegistrationTransport,
	obs::{self, ConnectStage, StageOutcome, StageSpan},
	provision::{Connector, GrantOutcome, RoleAssignment, TokenOutcome},
	registration::RegistrationResult,
};

/// Message reported after a successful run.
pub const CONNECT_SUCCESS_MESSAGE: &str = "Connection to Styla made successfully.";

/// Input of [`Connector::connect`].
#[derive(Clone, Debug)]
pub struct ConnectRequest {
	/// Operator credentials forwarded to the remote API.
	pub login: LoginData,
	/// Endpoint override; honored only in developer mode.
	pub connection_url: Option<String>,
}
impl ConnectRequest {
	/// Creates a request against the production endpoint.
	pub fn new(login: LoginData) -> Self {
		Self { login, connection_url: None }
	}

	/// Sets the endpoint override.
	pub fn with_connection_url(mut self, url: impl Into<String>) -> Self {
		self.connection_url = Some(url.into());

		self
	}
}

/// Summary of a successful [`Connector::connect`] run.
#[derive(Clone, Debug)]
pub struct ConnectReport {
	/// Endpoint the credentials were registered with.
	pub endpoint: Url,
	/// `true` when the service identity was created by this run.
	pub identity_created: bool,
	/// Role assignment result.
	pub role: RoleAssignment,
	/// Attribute grant result.
	pub grant: GrantOutcome,
	/// Persisted consumer.
	pub consumer: Consumer,
	/// `true` when the consumer was created by this run.
	pub consumer_created: bool,
	/// Persisted permanent token.
	pub token: Token,
	/// How the token reached the permanent state.
	pub token_outcome: TokenOutcome,
	/// Remote client configuration.
	pub registration: RegistrationResult,
	/// Default binding, when the remote API named a client.
	pub binding: Option<DefaultBinding>,
	/// Human-readable success message.
	pub message: &'static str,
}

impl<T> Connector<T>
where
	T: ?Sized + RegistrationTransport,
{
	/// Provisions the service identity and its credentials, then registers them remotely.
	pub async fn connect(&self, request: ConnectRequest) -> Result<ConnectReport> {
		let _serialized = self.connect_guard.lock().await;
		let ConnectRequest { login, connection_url } = request;
		let endpoint = stage(ConnectStage::Endpoint, async {
			Ok(self.registration.resolve_endpoint(connection_url.as_deref())?)
		})
		.await?;
		let resolved = stage(ConnectStage::Identity, self.resolve_identity(&login)).await?;
		let mut identity = resolved.identity;

		if resolved.created {
			obs::stage_event(ConnectStage::Identity, "service identity created");
		}

		let (role, grant) = stage(ConnectStage::Permissions, async {
			let assigner = self.permission_assigner();
			let request = RoleAssignmentRequest::new(
				self.config.role_name.clone(),
				self.config.role_resources.clone(),
			);
			let role = assigner.assign_role(&mut identity, &request).await?;
			let grant = assigner.grant_read_access(&identity, &self.config.attributes).await?;

			Ok((role, grant))
		})
		.await?;

		if grant == GrantOutcome::WildcardPresent {
			obs::stage_event(
				ConnectStage::Permissions,
				"wildcard attribute grant present; attribute filters left untouched",
			);
		}

		let (consumer, consumer_created, issued) = stage(ConnectStage::Token, async {
			let issuer = self.token_issuer();
			let (consumer, created) = issuer.ensure_consumer(&self.config.consumer_name).await?;
			let issued = issuer.ensure_access_token(&consumer, &identity, &endpoint).await?;

			Ok((consumer, created, issued))
		})
		.await?;

		if issued.outcome != TokenOutcome::Reused {
			obs::stage_event(
				ConnectStage::Token,
				&format!(
					"access token promoted to permanent (secret {})",
					issued.token.secret.fingerprint()
				),
			);
		}

		let registration = stage(ConnectStage::Registration, async {
			Ok(self.registration.register(&login, &consumer, &issued.token, &endpoint).await?)
		})
		.await?;
		let binding = match registration.client.as_deref() {
			Some(client) =>
				Some(
					stage(ConnectStage::Binding, async {
						Ok(self
							.bindings
							.create_default_binding(client, &self.config.front_name)
							.await?)
					})
					.await?,
				),
			None => None,
		};

		Ok(ConnectReport {
			endpoint,
			identity_created: resolved.created,
			role,
			grant,
			consumer,
			consumer_created,
			token: issued.token,
			token_outcome: issued.outcome,
			registration,
			binding,
			message: CONNECT_SUCCESS_MESSAGE,
		})
	}
}

async fn stage<F, R>(kind: ConnectStage, fut: F) -> Result<R>
where
	F: Future<Output = Result<R>>,
{
	let span = StageSpan::new(kind);

	obs::record_stage_outcome(kind, StageOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_stage_outcome(kind, StageOutcome::Success),
		Err(e) => {
			obs::record_stage_outcome(kind, StageOutcome::Failure);
			obs::stage_failure(kind, e);
		},
	}

	result
}
