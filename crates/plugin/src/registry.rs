//! Runtime registry of named components.
//!
//! Settings files refer to render actions by name; the embedding application
//! registers a factory per name. Because one registry holds every component
//! kind, asking for an action and finding a policy under that name is its
//! own, diagnosable error rather than a generic failure.

use crate::policy::Policy;
use crate::render::{ActionParameter, RenderAction};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stencil_api::Language;
use thiserror::Error;

/// A settings-declared binding of an action name to its parameter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionReference {
    pub name: String,
    #[serde(default)]
    pub parameter: ActionParameter,
}

impl ActionReference {
    pub fn new(name: impl Into<String>, parameter: ActionParameter) -> Self {
        Self {
            name: name.into(),
            parameter,
        }
    }
}

/// An instantiated action together with its bound parameter.
pub struct BoundAction {
    pub action: Box<dyn RenderAction>,
    pub parameter: ActionParameter,
}

impl std::fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundAction")
            .field("action", &self.action.name())
            .field("parameter", &self.parameter)
            .finish()
    }
}

/// A failure to turn an [`ActionReference`] into a [`BoundAction`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a {existing} is already registered under the name `{name}`")]
    DuplicateComponent { name: String, existing: &'static str },
    #[error("no component is registered under the name `{0}`")]
    UnknownComponent(String),
    #[error("component `{name}` is a {actual}, not a render action")]
    NotARenderAction { name: String, actual: &'static str },
    #[error(
        "action `{name}` serves {action_language}, but its renderer serves {renderer_language}"
    )]
    LanguageMismatch {
        name: String,
        action_language: String,
        renderer_language: String,
    },
}

type ActionFactory = Box<dyn Fn() -> Box<dyn RenderAction> + Send + Sync>;
type PolicyFactory = Box<dyn Fn() -> Box<dyn Policy> + Send + Sync>;

enum ComponentFactory {
    Action(ActionFactory),
    Policy(PolicyFactory),
}

impl ComponentFactory {
    fn kind(&self) -> &'static str {
        match self {
            ComponentFactory::Action(_) => "render action",
            ComponentFactory::Policy(_) => "policy",
        }
    }
}

/// Name-to-factory registry for components referenced from settings.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: IndexMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_action<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn RenderAction> + Send + Sync + 'static,
    {
        self.register(name.into(), ComponentFactory::Action(Box::new(factory)))
    }

    pub fn register_policy<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn Policy> + Send + Sync + 'static,
    {
        self.register(name.into(), ComponentFactory::Policy(Box::new(factory)))
    }

    /// Registering a second component under a taken name is a configuration
    /// error, never a silent replacement.
    fn register(&mut self, name: String, factory: ComponentFactory) -> Result<(), RegistryError> {
        if let Some(existing) = self.entries.get(&name) {
            return Err(RegistryError::DuplicateComponent {
                name,
                existing: existing.kind(),
            });
        }
        self.entries.insert(name, factory);
        Ok(())
    }

    /// Instantiates the action the reference names and binds its parameter.
    ///
    /// The action's declared language must match the renderer it is built
    /// for.
    pub fn action(
        &self,
        reference: &ActionReference,
        renderer_language: &Language,
    ) -> Result<BoundAction, RegistryError> {
        let factory = self
            .entries
            .get(&reference.name)
            .ok_or_else(|| RegistryError::UnknownComponent(reference.name.clone()))?;
        let ComponentFactory::Action(make) = factory else {
            return Err(RegistryError::NotARenderAction {
                name: reference.name.clone(),
                actual: factory.kind(),
            });
        };
        let action = make();
        if &action.language() != renderer_language {
            return Err(RegistryError::LanguageMismatch {
                name: reference.name.clone(),
                action_language: action.language().name().to_owned(),
                renderer_language: renderer_language.name().to_owned(),
            });
        }
        Ok(BoundAction {
            action,
            parameter: reference.parameter.clone(),
        })
    }

    /// Instantiates a declared list of actions for one renderer.
    ///
    /// Fails on the first broken reference; configuration errors abort the
    /// run before any rendering starts.
    pub fn actions(
        &self,
        references: &[ActionReference],
        renderer_language: &Language,
    ) -> Result<Vec<BoundAction>, RegistryError> {
        references
            .iter()
            .map(|r| self.action(r, renderer_language))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{PolicyContext, Reaction};
    use crate::render::{RenderContext, RenderError};
    use crate::source::SourceFile;
    use stencil_api::{CompilerEvent, Declaration, EventKind};

    struct NoopAction(Language);

    impl RenderAction for NoopAction {
        fn name(&self) -> &str {
            "noop"
        }

        fn language(&self) -> Language {
            self.0.clone()
        }

        fn apply(
            &self,
            _subject: Option<&Declaration>,
            _file: &mut SourceFile,
            _parameter: &ActionParameter,
            _ctx: &RenderContext<'_>,
        ) -> Result<(), RenderError> {
            Ok(())
        }
    }

    struct NoopPolicy;

    impl Policy for NoopPolicy {
        fn name(&self) -> &str {
            "noop-policy"
        }

        fn input(&self) -> EventKind {
            EventKind::TypeEntered
        }

        fn apply(&self, _event: &CompilerEvent, _ctx: &PolicyContext<'_>) -> Reaction {
            Reaction::Ignored
        }
    }

    fn registry() -> ComponentRegistry {
        let mut reg = ComponentRegistry::new();
        reg.register_action("java-noop", || Box::new(NoopAction(Language::java())))
            .unwrap();
        reg.register_policy("some-policy", || Box::new(NoopPolicy))
            .unwrap();
        reg
    }

    #[test]
    fn taken_name_is_rejected_across_component_kinds() {
        let mut reg = registry();
        let err = reg
            .register_action("java-noop", || Box::new(NoopAction(Language::java())))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateComponent { existing: "render action", .. }
        ));

        // One namespace for every kind: a policy cannot shadow an action.
        let err = reg
            .register_policy("java-noop", || Box::new(NoopPolicy))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateComponent { name, .. } if name == "java-noop"
        ));
    }

    #[test]
    fn resolves_registered_action() {
        let reg = registry();
        let bound = reg
            .action(
                &ActionReference::new("java-noop", ActionParameter::Empty),
                &Language::java(),
            )
            .unwrap();
        assert_eq!(bound.action.name(), "noop");
        assert_eq!(bound.parameter, ActionParameter::Empty);
    }

    #[test]
    fn unknown_name_is_distinct_from_wrong_kind() {
        let reg = registry();
        let missing = reg
            .action(
                &ActionReference::new("nope", ActionParameter::Absent),
                &Language::java(),
            )
            .unwrap_err();
        assert!(matches!(missing, RegistryError::UnknownComponent(_)));

        let wrong_kind = reg
            .action(
                &ActionReference::new("some-policy", ActionParameter::Absent),
                &Language::java(),
            )
            .unwrap_err();
        assert!(matches!(
            wrong_kind,
            RegistryError::NotARenderAction { actual: "policy", .. }
        ));
    }

    #[test]
    fn language_mismatch_is_rejected() {
        let reg = registry();
        let err = reg
            .action(
                &ActionReference::new("java-noop", ActionParameter::Absent),
                &Language::rust(),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::LanguageMismatch { .. }));
    }
}
