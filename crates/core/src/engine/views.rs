//! The fold store: every registered view type observes the event stream.

use stencil_api::CompilerEvent;
use stencil_plugin::FoldSink;
use tracing::debug;

/// Holds the type-erased fold sinks of all registered view types.
///
/// Multiple view types may fold the same event independently; within one
/// view identity, folds follow event emission order because the store is
/// driven sequentially by the propagation loop.
#[derive(Default)]
pub struct ViewStore {
    sinks: Vec<Box<dyn FoldSink>>,
}

impl ViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sink: Box<dyn FoldSink>) {
        debug!(kinds = ?sink.kinds(), "view sink registered");
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Offers one event to every sink that declares its variant.
    pub fn fold(&mut self, event: &CompilerEvent) {
        let kind = event.kind();
        for sink in &mut self.sinks {
            if sink.kinds().contains(&kind) {
                sink.fold(event);
            }
        }
    }
}
