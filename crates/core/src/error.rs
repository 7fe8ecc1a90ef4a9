use stencil_plugin::{RegistryError, RenderError, SettingsError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StencilError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate policy registration: `{0}`")]
    DuplicatePolicy(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("renderer `{renderer}` failed: {source}")]
    Render {
        renderer: String,
        source: RenderError,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(
        "policy `{policy}` produced an event beyond the derivation bound of {bound}; \
         the policy graph is likely cyclic"
    )]
    Divergence { policy: String, bound: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StencilError>;
