//! Rendering of export documents.
//!
//! - [`ExportRenderer`]: a document format the export pipeline can produce
//! - [`HtmlRenderer`]: the HTML document, rendered inside an emulated area
//! - [`JsonRenderer`]: the raw payload as pretty printed JSON
//!
//! The HTML renderer is assembled from collaborators, each behind a trait so
//! it can be swapped or mocked:
//!
//! | Trait | Default |
//! |---|---|
//! | [`ViewFileResolver`] | [`ThemeFileResolver`] |
//! | [`LayoutInitiator`] | [`TemplateLayoutInitiator`] |
//! | [`PageConfigRenderer`] | [`PageConfig`] |
//! | [`TranslationInliner`] | [`InlineTranslator`] |
//! | [`TemplateEvaluator`] | [`TeraEvaluator`] |

pub mod buffer;
pub mod evaluator;
pub mod html;
pub mod layout;
pub mod page_config;
pub mod resolver;
pub mod translate;
pub mod view;

pub use buffer::OutputBuffer;
pub use evaluator::{TemplateEvaluator, TeraEvaluator};
pub use html::{DEFAULT_CONTENT_BLOCK, HtmlRenderer, HtmlRendererBuilder};
pub use layout::{
    Block, BlockDefinition, Layout, LayoutInitiator, TemplateBlock, TemplateLayout,
    TemplateLayoutInitiator,
};
pub use page_config::{ElementType, PageConfig, PageConfigRenderer};
pub use resolver::{ThemeFileResolver, ViewFileResolver};
pub use translate::{InlineTranslator, TranslationInliner};
pub use view::{VIEW_MODEL_KEY, ViewModel, ViewVariables};

use crate::error::RenderError;
use crate::storage::ExportStorage;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// A document format for exported personal data.
pub trait ExportRenderer: Send + Sync {
    /// Render `data` into a document.
    fn render(&self, data: &Map<String, Value>) -> Result<String, RenderError>;

    /// Extension of the files this renderer produces, without the dot.
    fn file_extension(&self) -> &str;

    /// Render `data` and store it as `<file_name>.<extension>`.
    ///
    /// A blank `file_name` is rejected before rendering.
    fn save_data(
        &self,
        storage: &dyn ExportStorage,
        file_name: &str,
        data: &Map<String, Value>,
    ) -> Result<PathBuf, RenderError> {
        if file_name.trim().is_empty() {
            return Err(RenderError::InvalidFileName {
                name: file_name.to_string(),
            });
        }
        let document = self.render(data)?;
        let file_name = format!("{}.{}", file_name, self.file_extension());
        storage.write(&file_name, document.as_bytes())
    }
}

/// Renders the payload as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ExportRenderer for JsonRenderer {
    fn render(&self, data: &Map<String, Value>) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
