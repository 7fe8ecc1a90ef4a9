//! The pipeline orchestrator.
//!
//! One compilation run is a single pass:
//! `Idle → ProducingEvents → FoldingPolicyViews → Rendering → Persisting →
//! Done`. A fatal error in any phase aborts the run; file edits are staged
//! in memory and flushed only in the Persisting phase, so an aborted run
//! leaves the output tree untouched.

use crate::engine::{PolicyEngine, ViewStore};
use crate::error::{Result, StencilError};
use crate::producer::EventProducer;
use stencil_api::DescriptorSet;
use stencil_plugin::{
    FoldSink, Plugin, Policy, PolicyContext, RenderContext, Renderer, SettingsDirectory,
    SourceFileSet, SourceSubset, TypeSystem,
};
use tracing::{info, info_span};

/// Phases of one run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ProducingEvents,
    FoldingPolicyViews,
    Rendering,
    Persisting,
    Done,
}

/// Knobs of the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    /// Overrides the derivation-depth bound of the policy fixpoint loop.
    /// `None` picks a bound proportional to the registered policy count.
    pub max_derivation_depth: Option<usize>,
}

/// What one completed run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub events_produced: usize,
    pub events_derived: usize,
    pub reactions_ignored: usize,
    pub files_written: usize,
}

/// Assembles a [`Pipeline`]; registration checks run at [`build`][Self::build].
#[derive(Default)]
pub struct PipelineBuilder {
    descriptors: DescriptorSet,
    sources: Option<SourceFileSet>,
    settings: Option<SettingsDirectory>,
    policies: Vec<Box<dyn Policy>>,
    view_sinks: Vec<Box<dyn FoldSink>>,
    renderers: Vec<Box<dyn Renderer>>,
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new(descriptors: DescriptorSet) -> Self {
        Self {
            descriptors,
            ..Self::default()
        }
    }

    pub fn sources(mut self, sources: SourceFileSet) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn settings(mut self, settings: SettingsDirectory) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn policy(mut self, policy: Box<dyn Policy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn view_sink(mut self, sink: Box<dyn FoldSink>) -> Self {
        self.view_sinks.push(sink);
        self
    }

    pub fn renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderers.push(renderer);
        self
    }

    /// Registers everything a plugin contributes, preserving order.
    pub fn plugin(mut self, plugin: &dyn Plugin) -> Self {
        self.policies.extend(plugin.policies());
        self.view_sinks.extend(plugin.view_sinks());
        self.renderers.extend(plugin.renderers());
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and produces a runnable pipeline.
    ///
    /// Duplicate policy registrations surface here, before any processing
    /// starts.
    pub fn build(self) -> Result<Pipeline> {
        let mut engine = PolicyEngine::new();
        for policy in self.policies {
            engine.register(policy)?;
        }
        let mut views = ViewStore::new();
        for sink in self.view_sinks {
            views.register(sink);
        }
        let sources = self
            .sources
            .ok_or_else(|| StencilError::Internal("pipeline built without sources".into()))?;
        let settings = self
            .settings
            .unwrap_or_else(|| SettingsDirectory::new(sources.root().join(".stencil-settings")));
        Ok(Pipeline {
            descriptors: self.descriptors,
            sources,
            settings,
            engine,
            views,
            renderers: self.renderers,
            config: self.config,
            phase: Phase::Idle,
        })
    }
}

/// A fully configured compilation run.
pub struct Pipeline {
    descriptors: DescriptorSet,
    sources: SourceFileSet,
    settings: SettingsDirectory,
    engine: PolicyEngine,
    views: ViewStore,
    renderers: Vec<Box<dyn Renderer>>,
    config: PipelineConfig,
    phase: Phase,
}

impl Pipeline {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Executes the run to completion.
    ///
    /// Either every staged edit is written, or none: the orchestrator only
    /// touches disk once rendering has finished without error.
    pub fn run(mut self) -> Result<PipelineReport> {
        let type_system = TypeSystem::build(&self.descriptors);
        let mut report = PipelineReport::default();

        self.phase = Phase::ProducingEvents;
        let events = {
            let _span = info_span!("producing_events").entered();
            EventProducer::new(&self.descriptors).events()
        };
        report.events_produced = events.len();

        self.phase = Phase::FoldingPolicyViews;
        {
            let _span = info_span!("folding_policy_views").entered();
            let ctx = PolicyContext {
                type_system: &type_system,
                settings: &self.settings,
            };
            let bound = self
                .config
                .max_derivation_depth
                .unwrap_or_else(|| self.engine.default_depth_bound());
            let outcome = self.engine.propagate(events, &mut self.views, &ctx, bound)?;
            report.events_derived = outcome.derived;
            report.reactions_ignored = outcome.ignored;
        }

        self.phase = Phase::Rendering;
        {
            let _span = info_span!("rendering").entered();
            let ctx = RenderContext {
                type_system: &type_system,
                settings: &self.settings,
            };
            for renderer in &self.renderers {
                let mut subset = SourceSubset::new(&mut self.sources, renderer.language());
                renderer
                    .render(&mut subset, &ctx)
                    .map_err(|source| StencilError::Render {
                        renderer: renderer.name().to_owned(),
                        source,
                    })?;
            }
        }

        self.phase = Phase::Persisting;
        {
            let _span = info_span!("persisting").entered();
            report.files_written = self.sources.write_back()?;
        }

        self.phase = Phase::Done;
        info!(
            events = report.events_produced,
            derived = report.events_derived,
            written = report.files_written,
            "pipeline finished"
        );
        Ok(report)
    }
}
