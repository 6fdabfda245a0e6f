//! The unit of work that models and use cases are built from.

use async_trait::async_trait;
use serde::Serialize;
use tracing::Instrument;

use crate::Result;
use crate::tracer::Tracer;

/// A named, traced operation from `Input` to `Output`.
///
/// Implementors provide [`do_run`](Task::do_run); callers use
/// [`run`](Task::run), which records input and output on the tracer and runs
/// inside a `tracing` span named after the task.
#[async_trait]
pub trait Task: Send + Sync {
    type Input: Serialize + Send + Sync;
    type Output: Serialize + Send;

    /// Name used for spans and trace entries.
    fn name(&self) -> &str;

    /// The task's own logic.
    async fn do_run(&self, input: Self::Input, tracer: &dyn Tracer) -> Result<Self::Output>;

    /// Run the task, tracing its input and output.
    async fn run(&self, input: Self::Input, tracer: &dyn Tracer) -> Result<Self::Output> {
        let span = tracing::debug_span!("task", name = self.name());
        async move {
            tracer.log("Input", serde_json::to_value(&input)?);
            let output = self.do_run(input, tracer).await?;
            tracer.log("Output", serde_json::to_value(&output)?);
            Ok(output)
        }
        .instrument(span)
        .await
    }
}
