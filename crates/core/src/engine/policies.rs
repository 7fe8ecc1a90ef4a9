//! Policy registration and event propagation to a fixpoint.
//!
//! Every event is dispatched to every policy matching its variant, in
//! registration order. Derived events go back into the queue with an
//! incremented derivation depth; exceeding the depth bound is fatal because
//! it signals a cyclic policy graph rather than a long but finite chain.

use crate::engine::views::ViewStore;
use crate::error::{Result, StencilError};
use std::collections::VecDeque;
use stencil_api::{CompilerEvent, EventKind};
use stencil_plugin::{Policy, PolicyContext, Reaction};
use tracing::{debug, trace};

/// The ordered set of registered policies.
#[derive(Default)]
pub struct PolicyEngine {
    policies: Vec<Box<dyn Policy>>,
}

impl PolicyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy. A second policy under an already-taken name is a
    /// configuration error.
    pub fn register(&mut self, policy: Box<dyn Policy>) -> Result<()> {
        if self.policies.iter().any(|p| p.name() == policy.name()) {
            return Err(StencilError::DuplicatePolicy(policy.name().to_owned()));
        }
        debug!(policy = policy.name(), input = ?policy.input(), "policy registered");
        self.policies.push(policy);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    fn matching(&self, kind: EventKind) -> impl Iterator<Item = &dyn Policy> {
        self.policies
            .iter()
            .filter(move |p| p.input() == kind)
            .map(Box::as_ref)
    }

    /// The default derivation-depth bound: proportional to the number of
    /// registered policies, since an acyclic policy graph cannot chain
    /// derivations longer than the policies it contains.
    pub fn default_depth_bound(&self) -> usize {
        2 * self.policies.len() + 8
    }

    /// Folds and dispatches the seed events and everything derived from
    /// them until no policy produces new events.
    ///
    /// Folding happens per event, in emission order, before the event is
    /// offered to policies, so views observe derived events exactly where
    /// they were emitted in the stream.
    pub fn propagate(
        &self,
        seed: Vec<CompilerEvent>,
        views: &mut ViewStore,
        ctx: &PolicyContext<'_>,
        max_depth: usize,
    ) -> Result<FixpointOutcome> {
        let mut queue: VecDeque<(CompilerEvent, usize)> =
            seed.into_iter().map(|e| (e, 0)).collect();
        let mut outcome = FixpointOutcome::default();
        while let Some((event, depth)) = queue.pop_front() {
            views.fold(&event);
            outcome.processed += 1;
            for policy in self.matching(event.kind()) {
                match policy.apply(&event, ctx) {
                    Reaction::Ignored => {
                        trace!(policy = policy.name(), kind = ?event.kind(), "ignored");
                        outcome.ignored += 1;
                    }
                    Reaction::Produced(derived) => {
                        if !derived.is_empty() && depth + 1 > max_depth {
                            return Err(StencilError::Divergence {
                                policy: policy.name().to_owned(),
                                bound: max_depth,
                            });
                        }
                        outcome.derived += derived.len();
                        queue.extend(derived.into_iter().map(|e| (e, depth + 1)));
                    }
                }
            }
        }
        debug!(
            processed = outcome.processed,
            derived = outcome.derived,
            ignored = outcome.ignored,
            "fixpoint reached"
        );
        Ok(outcome)
    }
}

/// Counters of one propagation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixpointOutcome {
    /// Events folded and dispatched, seed and derived together.
    pub processed: usize,
    /// Events produced by policies.
    pub derived: usize,
    /// Policy invocations that explicitly declined to react.
    pub ignored: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;
    use stencil_api::{DescriptorSet, TypeName};
    use stencil_plugin::{SettingsDirectory, TypeSystem};

    fn derived(kind: &str) -> CompilerEvent {
        CompilerEvent::Derived {
            kind: SmolStr::new(kind),
            subject: Some(TypeName::new("t", "T")),
            payload: serde_json::Value::Null,
        }
    }

    /// Reacts to `TypeEntered` by deriving a single labeled fact.
    struct LabelOnType(&'static str);

    impl Policy for LabelOnType {
        fn name(&self) -> &str {
            self.0
        }

        fn input(&self) -> EventKind {
            EventKind::TypeEntered
        }

        fn apply(&self, _event: &CompilerEvent, _ctx: &PolicyContext<'_>) -> Reaction {
            Reaction::just(derived(self.0))
        }
    }

    /// Reacts to every derived event with another derived event: a cycle.
    struct Echo;

    impl Policy for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn input(&self) -> EventKind {
            EventKind::Derived
        }

        fn apply(&self, _event: &CompilerEvent, _ctx: &PolicyContext<'_>) -> Reaction {
            Reaction::just(derived("echo"))
        }
    }

    /// Declines every event it sees.
    struct Bystander;

    impl Policy for Bystander {
        fn name(&self) -> &str {
            "bystander"
        }

        fn input(&self) -> EventKind {
            EventKind::TypeEntered
        }

        fn apply(&self, _event: &CompilerEvent, _ctx: &PolicyContext<'_>) -> Reaction {
            Reaction::Ignored
        }
    }

    fn type_entered() -> CompilerEvent {
        CompilerEvent::TypeEntered {
            file: "t.proto".into(),
            name: TypeName::new("t", "T"),
            ordinal: 0,
            doc: Default::default(),
        }
    }

    fn run(
        engine: &PolicyEngine,
        seed: Vec<CompilerEvent>,
        max_depth: usize,
    ) -> Result<FixpointOutcome> {
        let ts = TypeSystem::build(&DescriptorSet::default());
        let settings = SettingsDirectory::new("unused");
        let ctx = PolicyContext {
            type_system: &ts,
            settings: &settings,
        };
        let mut views = ViewStore::new();
        engine.propagate(seed, &mut views, &ctx, max_depth)
    }

    #[test]
    fn duplicate_policy_name_is_a_configuration_error() {
        let mut engine = PolicyEngine::new();
        engine.register(Box::new(LabelOnType("mark"))).unwrap();
        let err = engine.register(Box::new(LabelOnType("mark"))).unwrap_err();
        assert!(matches!(err, StencilError::DuplicatePolicy(name) if name == "mark"));
    }

    #[test]
    fn acyclic_graph_reaches_fixpoint() {
        let mut engine = PolicyEngine::new();
        engine.register(Box::new(LabelOnType("mark"))).unwrap();
        let outcome = run(&engine, vec![type_entered()], engine.default_depth_bound()).unwrap();
        // The seed event plus the one derived fact; the derived fact matches
        // no policy, so the loop stops.
        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.derived, 1);
    }

    #[test]
    fn every_matching_policy_sees_the_event() {
        let mut engine = PolicyEngine::new();
        engine.register(Box::new(LabelOnType("first"))).unwrap();
        engine.register(Box::new(LabelOnType("second"))).unwrap();
        let outcome = run(&engine, vec![type_entered()], engine.default_depth_bound()).unwrap();
        assert_eq!(outcome.derived, 2);
    }

    #[test]
    fn ignored_reactions_are_counted_separately() {
        let mut engine = PolicyEngine::new();
        engine.register(Box::new(Bystander)).unwrap();
        let outcome = run(&engine, vec![type_entered()], engine.default_depth_bound()).unwrap();
        assert_eq!(outcome.ignored, 1);
        assert_eq!(outcome.derived, 0);
    }

    #[test]
    fn cyclic_graph_is_reported_as_divergence() {
        let mut engine = PolicyEngine::new();
        engine.register(Box::new(LabelOnType("mark"))).unwrap();
        engine.register(Box::new(Echo)).unwrap();
        let err = run(&engine, vec![type_entered()], engine.default_depth_bound()).unwrap_err();
        assert!(matches!(
            err,
            StencilError::Divergence { policy, .. } if policy == "echo"
        ));
    }
}
