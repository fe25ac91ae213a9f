// self
use crate::{_prelude::*, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by gateway operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("storefront_gateway.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
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

/// Lifecycle points of the refresh protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshStage {
	/// This caller won the flag and issued the refresh call.
	Started,
	/// This caller found a refresh in flight and joined the queue.
	Queued,
	/// The refresh stored a new credential.
	Succeeded,
	/// The refresh failed and the credential was cleared.
	Failed,
	/// The refreshing future was dropped before the call settled.
	Abandoned,
}
impl RefreshStage {
	/// Returns a stable label suitable for event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshStage::Started => "started",
			RefreshStage::Queued => "queued",
			RefreshStage::Succeeded => "succeeded",
			RefreshStage::Failed => "failed",
			RefreshStage::Abandoned => "abandoned",
		}
	}
}

/// Emits a refresh lifecycle event; `waiters` is the queue length at that point.
pub fn record_refresh_stage(stage: RefreshStage, path: &str, waiters: usize) {
	#[cfg(feature = "tracing")]
	{
		match stage {
			RefreshStage::Failed | RefreshStage::Abandoned => tracing::warn!(
				target: "storefront_gateway::refresh",
				stage = stage.as_str(),
				path,
				waiters,
				"credential refresh did not complete"
			),
			_ => tracing::debug!(
				target: "storefront_gateway::refresh",
				stage = stage.as_str(),
				path,
				waiters,
				"credential refresh"
			),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, path, waiters);
	}
}
