//! The unit of pipeline extension.

use crate::policy::Policy;
use crate::render::Renderer;
use crate::view::FoldSink;
use serde::{Deserialize, Serialize};

/// Metadata of a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
}

/// A bundle of policies, views, and renderers registered together.
///
/// The pipeline consumes each part once: policies join the fixpoint loop,
/// view sinks join the fold store, renderers run in the order plugins were
/// registered.
pub trait Plugin {
    fn info(&self) -> PluginInfo;

    fn policies(&self) -> Vec<Box<dyn Policy>> {
        Vec::new()
    }

    fn view_sinks(&self) -> Vec<Box<dyn FoldSink>> {
        Vec::new()
    }

    fn renderers(&self) -> Vec<Box<dyn Renderer>> {
        Vec::new()
    }
}
