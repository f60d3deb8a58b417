//! Downstream binding registry that ties the remote client name to a front name.

// self
use crate::_prelude::*;

/// Boxed future returned by [`BindingRegistry`] methods.
pub type BindingFuture<'a> =
	Pin<Box<dyn Future<Output = Result<DefaultBinding, BindingError>> + 'a + Send>>;

/// Error reported by a [`BindingRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct BindingError {
	/// Registry-supplied message.
	pub message: String,
}
impl From<BindingError> for Error {
	fn from(e: BindingError) -> Self {
		Error::Binding { message: e.message }
	}
}

/// The binding the storefront serves by default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultBinding {
	/// Remote client name.
	pub client_name: String,
	/// Storefront path the client's content is served under.
	pub front_name: String,
	/// Whether the binding is the default one.
	pub is_default: bool,
}

/// Registry of storefront bindings.
pub trait BindingRegistry
where
	Self: Send + Sync,
{
	/// Creates (or replaces) the default binding for `client_name` under `front_name`.
	fn create_default_binding<'a>(
		&'a self,
		client_name: &'a str,
		front_name: &'a str,
	) -> BindingFuture<'a>;
}

/// In-process registry that keeps exactly one default binding.
#[derive(Clone, Debug, Default)]
pub struct MemoryBindingRegistry(Arc<RwLock<Option<DefaultBinding>>>);
impl MemoryBindingRegistry {
	/// Returns the current default binding.
	pub fn current(&self) -> Option<DefaultBinding> {
		self.0.read().clone()
	}
}
impl BindingRegistry for MemoryBindingRegistry {
	fn create_default_binding<'a>(
		&'a self,
		client_name: &'a str,
		front_name: &'a str,
	) -> BindingFuture<'a> {
		Box::pin(async move {
			if client_name.trim().is_empty() || front_name.trim().is_empty() {
				return Err(BindingError {
					message: "client and front names cannot be empty".into(),
				});
			}

			let binding = DefaultBinding {
				client_name: client_name.to_owned(),
				front_name: front_name.to_owned(),
				is_default: true,
			};

			*self.0.write() = Some(binding.clone());

			Ok(binding)
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	#[test]
	fn registry_keeps_one_default_binding() {
		let registry = MemoryBindingRegistry::default();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for binding test.");

		rt.block_on(registry.create_default_binding("acme", "magazine"))
			.expect("First binding should be created.");
		rt.block_on(registry.create_default_binding("globex", "magazine"))
			.expect("Second binding should replace the first.");

		let current = registry.current().expect("A default binding should exist.");

		assert_eq!(current.client_name, "globex");
		assert!(current.is_default);

		let err = rt
			.block_on(registry.create_default_binding("", "magazine"))
			.expect_err("Empty client names must be rejected.");

		assert!(matches!(Error::from(err), Error::Binding { .. }));
	}
}
