//! Pipeline host boundary
//!
//! The minimal surface the gate needs from the telemetry pipeline: a batch
//! type, the downstream consumer, and the host handed to components at start.

use std::error::Error as StdError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;

/// Error type returned by downstream consumers
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A batch of trace data
///
/// The gate never inspects spans; it forwards the batch untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Traces {
    /// Resource spans as received
    pub resource_spans: Vec<serde_json::Value>,
}

impl Traces {
    /// Create a batch from resource spans
    pub fn new(resource_spans: Vec<serde_json::Value>) -> Self {
        Self { resource_spans }
    }

    /// Number of resource span entries
    pub fn len(&self) -> usize {
        self.resource_spans.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.resource_spans.is_empty()
    }
}

/// What a processor declares about its handling of batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorCapabilities {
    /// Whether the processor modifies batches it receives
    pub mutates_consumed_data: bool,
}

/// Receives trace batches
#[async_trait]
pub trait TracesConsumer: Send + Sync {
    /// Consume one batch together with its request context
    async fn consume_traces(&self, ctx: RequestContext, traces: Traces) -> Result<(), BoxError>;
}

/// Services the pipeline host offers components at start
pub trait Host: Send + Sync {
    /// Report an error that should stop the pipeline
    fn report_fatal_error(&self, _error: &(dyn StdError + Send + Sync)) {}
}

/// Host that offers nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl Host for NoopHost {}
