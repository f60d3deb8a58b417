// self
use crate::{_prelude::*, obs::ConnectStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// A span builder used by connect stages.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: ConnectStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("styla_connect.stage", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits an info event for a record the stage created or changed.
pub fn stage_event(stage: ConnectStage, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(stage = stage.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, message);
	}
}

/// Emits a warn event for a failed stage.
pub fn stage_failure(stage: ConnectStage, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage = stage.as_str(), error = %error, "connect stage failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn stage_helpers_noop_without_tracing() {
		let _span = StageSpan::new(ConnectStage::Identity);

		stage_event(ConnectStage::Identity, "identity created");
		stage_failure(ConnectStage::Identity, &std::io::Error::other("boom"));
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = StageSpan::new(ConnectStage::Token);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
