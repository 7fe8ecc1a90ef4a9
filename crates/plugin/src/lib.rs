pub mod insertion;
pub mod plugin;
pub mod policy;
pub mod registry;
pub mod render;
pub mod settings;
pub mod source;
pub mod type_system;
pub mod view;

pub use insertion::{Coordinates, InsertionPoint};
pub use plugin::{Plugin, PluginInfo};
pub use policy::{Policy, PolicyContext, Reaction};
pub use registry::{ActionReference, BoundAction, ComponentRegistry, RegistryError};
pub use render::{ActionParameter, RenderAction, RenderContext, RenderError, Renderer, SourceSubset};
pub use settings::{DiscoveredSettings, Format, SettingsDirectory, SettingsError};
pub use source::{EditError, Inserted, SourceAtLine, SourceAtPoint, SourceFile, SourceFileSet};
pub use type_system::{ResolveError, ResolvedValue, TypeDeclRef, TypeSystem};
pub use view::{FoldSink, RepositoryHandle, View, ViewRepository};
