//! Error types for export rendering.
//!
//! Rendering failures fall into three kinds:
//! - **Configuration**: the renderer is wired to something that does not
//!   exist (template, theme, area). Never retried.
//! - **Render**: layout construction, block lookup or template evaluation
//!   failed. Errors raised by collaborators are carried unchanged.
//! - **Storage**: persisting a rendered document failed.
//!
//! Validation failures are not errors; see [`crate::validation`].

use crate::context::Area;
use std::fmt;
use thiserror::Error;

/// Broad classification of a [`RenderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Render,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::Render => "render_error",
            ErrorKind::Storage => "storage_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while rendering or persisting an export document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template \"{name}\" is not found")]
    TemplateNotFound { name: String },

    #[error("no default theme is configured for area \"{area}\"")]
    ThemeNotConfigured { area: Area },

    #[error("area code is not set")]
    AreaNotSet,

    #[error("layout block \"{name}\" is not found")]
    BlockNotFound { name: String },

    #[error("presentation context is already emulating area \"{active}\" on this thread")]
    NestedEmulation { active: Area },

    #[error("invalid export file name \"{name}\"")]
    InvalidFileName { name: String },

    #[error("rendered output is not valid UTF-8: {source}")]
    Encoding {
        #[from]
        source: std::string::FromUtf8Error,
    },

    #[error(transparent)]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::TemplateNotFound { .. }
            | RenderError::ThemeNotConfigured { .. }
            | RenderError::AreaNotSet => ErrorKind::Configuration,
            RenderError::Io(_) | RenderError::InvalidFileName { .. } => ErrorKind::Storage,
            RenderError::BlockNotFound { .. }
            | RenderError::NestedEmulation { .. }
            | RenderError::Encoding { .. }
            | RenderError::Template(_)
            | RenderError::Serialization(_)
            | RenderError::Collaborator(_) => ErrorKind::Render,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
