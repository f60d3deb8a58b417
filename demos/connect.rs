//! Demonstrates a full `connect` run against a mocked registration endpoint, using the default
//! reqwest transport, a file-backed credential store, and the in-memory binding registry.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use styla_connect::{
	auth::LoginData,
	binding::{BindingRegistry, MemoryBindingRegistry},
	config::ConnectorConfig,
	provision::{ConnectRequest, Connector},
	store::{CredentialStore, FileStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let register_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/magento").form_urlencoded_tuple_exists("token_key");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"client\":\"demo-shop\",\"config\":{\"language\":\"en\"}}");
		})
		.await;
	let snapshot = env::temp_dir().join("styla_connect_demo.json");
	let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(&snapshot)?);
	let registry = Arc::new(MemoryBindingRegistry::default());
	let bindings: Arc<dyn BindingRegistry> = registry.clone();
	let config = ConnectorConfig::default()
		.with_connection_url(Url::parse(&server.url("/api/magento"))?)
		.with_request_timeout_secs(10);
	let connector = Connector::new(store, bindings, config)?;
	let login = LoginData::new("ops@demo-shop.test", "correct horse battery staple")?;
	let report = connector.connect(ConnectRequest::new(login)).await?;

	println!("{}", report.message);
	println!("Consumer key: {}.", report.consumer.key);
	println!("Token state: {} ({:?}).", report.token.state, report.token_outcome);
	println!("Default binding: {:?}.", registry.current());
	println!("Credentials persisted to {}.", snapshot.display());

	register_mock.assert_async().await;

	Ok(())
}
