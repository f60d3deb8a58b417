//! Optional observability helpers for connect stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap every stage in a span named `styla_connect.stage` with a `stage`
//!   field, and to emit info/warn events for created records and failures.
//! - Enable `metrics` to increment the `styla_connect_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of a connect run, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectStage {
	/// Registration endpoint resolution.
	Endpoint,
	/// Service identity lookup or creation.
	Identity,
	/// Role assignment and attribute grants.
	Permissions,
	/// Consumer and token issuance.
	Token,
	/// Remote registration call.
	Registration,
	/// Default binding creation.
	Binding,
}
impl ConnectStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ConnectStage::Endpoint => "endpoint",
			ConnectStage::Identity => "identity",
			ConnectStage::Permissions => "permissions",
			ConnectStage::Token => "token",
			ConnectStage::Registration => "registration",
			ConnectStage::Binding => "binding",
		}
	}
}
impl Display for ConnectStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
