//! Auth-domain identifiers, identities, consumers, and token models.

pub mod consumer;
pub mod id;
pub mod identity;
pub mod secret;
pub mod token;

pub use consumer::*;
pub use id::*;
pub use identity::*;
pub use secret::Secret;
pub use token::*;
