//! Validation and rendering primitives for personal data exports.
//!
//! - [`validation`]: validator units and the [`CompositeValidator`] that
//!   merges their verdicts and messages
//! - [`render`]: export documents, chiefly the [`HtmlRenderer`] which renders
//!   inside an emulated presentation area
//! - [`context`]: the shared presentation context and its scoped emulation
//! - [`storage`]: where rendered documents are written

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod render;
pub mod storage;
pub mod validation;

pub use config::{CliArgs, Command, ExportConfig};
pub use context::{Area, ContextState, PresentationContext};
pub use error::{ErrorKind, RenderError};
pub use logging::{LoggingConfig, init_logging};
pub use render::{ExportRenderer, HtmlRenderer, JsonRenderer};
pub use storage::{DirectoryStorage, ExportStorage};
pub use validation::{CompositeValidator, MessageAccumulator, Messages, Validator};
