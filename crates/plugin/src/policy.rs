//! Policies: single-input-type event transformers.
//!
//! A policy reads: whenever *something happens*, then *something else must
//! happen*. It consumes exactly one event variant and produces zero or more
//! new events. Policies are pure transformers of the event stream: they may
//! read the type system and their settings, but keep no state of their own
//! across invocations.

use crate::settings::SettingsDirectory;
use crate::type_system::TypeSystem;
use stencil_api::{CompilerEvent, EventKind};

/// What a policy did with an event.
///
/// `Ignored` means the policy looked at the event and chose not to act;
/// it is deliberately distinct from producing an empty event list, so
/// diagnostics can tell "did nothing" from "found nothing to do".
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    Ignored,
    Produced(Vec<CompilerEvent>),
}

impl Reaction {
    pub fn just(event: CompilerEvent) -> Self {
        Reaction::Produced(vec![event])
    }

    pub fn produced_events(self) -> Vec<CompilerEvent> {
        match self {
            Reaction::Ignored => Vec::new(),
            Reaction::Produced(events) => events,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Reaction::Ignored)
    }
}

/// What a policy may consult while reacting.
pub struct PolicyContext<'a> {
    pub type_system: &'a TypeSystem,
    pub settings: &'a SettingsDirectory,
}

/// A converter of one event into zero to many other events.
///
/// The single `input` kind per policy is enforced by construction: there is
/// one handler method and one declared variant.
pub trait Policy: Send {
    /// Identifies the policy in diagnostics. Must be unique in a pipeline.
    fn name(&self) -> &str;

    /// The one event variant this policy consumes.
    fn input(&self) -> EventKind;

    /// Reacts to an event of the declared variant.
    fn apply(&self, event: &CompilerEvent, ctx: &PolicyContext<'_>) -> Reaction;
}
