//! HTML export document rendered inside an emulated area.
//!
//! A render goes through these steps, all inside
//! [`PresentationContext::with_context`]:
//!
//! 1. switch the area code to the target area (frontend by default)
//! 2. re-assert the design area and default theme for that area
//! 3. build a fresh layout and hand the payload to the content block
//! 4. render head content, html/head/body attributes and layout output
//! 5. resolve the page template and evaluate it into an [`OutputBuffer`]
//! 6. run the translation inliner over the result
//!
//! The previous context is restored when the envelope exits, whether the
//! render succeeded, failed or panicked. A failed evaluation drops its
//! buffer, so partial output never reaches the caller.

use super::buffer::OutputBuffer;
use super::evaluator::{TemplateEvaluator, TeraEvaluator};
use super::layout::LayoutInitiator;
use super::page_config::{ElementType, PageConfigRenderer};
use super::resolver::ViewFileResolver;
use super::translate::{InlineTranslator, TranslationInliner};
use super::view::{VIEW_MODEL_KEY, ViewModel, ViewVariables};
use super::ExportRenderer;
use crate::context::{Area, PresentationContext};
use crate::error::RenderError;
use anyhow::{Result, anyhow};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Block the export payload is attached to.
pub const DEFAULT_CONTENT_BLOCK: &str = "main.content.customer.privacy.export.personal.data";

/// Renders above this duration are logged as slow.
const SLOW_RENDER_THRESHOLD_MS: u64 = 500;

/// Renders the personal data export as an HTML page.
///
/// Renders on one [`PresentationContext`] are serialized; see
/// [`crate::context::emulation`].
pub struct HtmlRenderer {
    context: PresentationContext,
    resolver: Arc<dyn ViewFileResolver>,
    layout_initiator: Arc<dyn LayoutInitiator>,
    page_config: Arc<dyn PageConfigRenderer>,
    translator: Arc<dyn TranslationInliner>,
    evaluator: Arc<dyn TemplateEvaluator>,
    template: String,
    area: Area,
    content_block: String,
}

impl HtmlRenderer {
    pub fn builder(
        context: PresentationContext,
        template: impl Into<String>,
    ) -> HtmlRendererBuilder {
        HtmlRendererBuilder::new(context, template)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn context(&self) -> &PresentationContext {
        &self.context
    }

    /// Render `data` into the export page.
    pub fn render(&self, data: &Map<String, Value>) -> Result<String, RenderError> {
        let span = tracing::info_span!(
            "html_render",
            template = %self.template,
            area = %self.area,
        );
        let _entered = span.enter();
        let started = Instant::now();

        let result = self
            .context
            .with_context(self.area, || self.render_html(data));

        match &result {
            Ok(html) => {
                crate::log_slow_operation!(
                    started.elapsed(),
                    SLOW_RENDER_THRESHOLD_MS,
                    bytes = html.len(),
                    "html export rendered"
                );
            }
            Err(error) => {
                tracing::warn!(%error, kind = %error.kind(), "html export render failed");
            }
        }
        result
    }

    fn render_html(&self, data: &Map<String, Value>) -> Result<String, RenderError> {
        // Emulating the area code does not reach the design layer on its own.
        self.context.reassert_design()?;

        let mut layout = self.layout_initiator.create_layout()?;
        let block = layout
            .get_block(&self.content_block)
            .ok_or_else(|| RenderError::BlockNotFound {
                name: self.content_block.clone(),
            })?;
        block.set_data(VIEW_MODEL_KEY, ViewModel::new(data.clone()).into_value());

        let variables = ViewVariables {
            head_content: self.page_config.render_head_content(),
            html_attributes: self.page_config.render_element_attributes(ElementType::Html),
            head_attributes: self.page_config.render_element_attributes(ElementType::Head),
            body_attributes: self.page_config.render_element_attributes(ElementType::Body),
            layout_content: layout.output()?,
        };

        let mut html = self.render_page(&variables)?;
        self.translator.process_response_body(&mut html);
        Ok(html)
    }

    fn render_page(&self, variables: &ViewVariables) -> Result<String, RenderError> {
        let path = self
            .resolver
            .resolve(&self.template)
            .ok_or_else(|| RenderError::TemplateNotFound {
                name: self.template.clone(),
            })?;

        let mut buffer = OutputBuffer::start();
        self.evaluator.evaluate(&path, variables, &mut buffer)?;
        buffer.finish()
    }
}

impl ExportRenderer for HtmlRenderer {
    fn render(&self, data: &Map<String, Value>) -> Result<String, RenderError> {
        HtmlRenderer::render(self, data)
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("template", &self.template)
            .field("area", &self.area)
            .field("content_block", &self.content_block)
            .finish_non_exhaustive()
    }
}

/// Builder for [`HtmlRenderer`].
///
/// The resolver, layout initiator and page config are required. The
/// translator defaults to a disabled [`InlineTranslator`], the evaluator to
/// [`TeraEvaluator`], the area to [`Area::Frontend`] and the content block to
/// [`DEFAULT_CONTENT_BLOCK`].
pub struct HtmlRendererBuilder {
    context: PresentationContext,
    template: String,
    resolver: Option<Arc<dyn ViewFileResolver>>,
    layout_initiator: Option<Arc<dyn LayoutInitiator>>,
    page_config: Option<Arc<dyn PageConfigRenderer>>,
    translator: Option<Arc<dyn TranslationInliner>>,
    evaluator: Option<Arc<dyn TemplateEvaluator>>,
    area: Option<Area>,
    content_block: Option<String>,
}

impl HtmlRendererBuilder {
    pub fn new(context: PresentationContext, template: impl Into<String>) -> Self {
        Self {
            context,
            template: template.into(),
            resolver: None,
            layout_initiator: None,
            page_config: None,
            translator: None,
            evaluator: None,
            area: None,
            content_block: None,
        }
    }

    pub fn resolver(mut self, resolver: Arc<dyn ViewFileResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn layout_initiator(mut self, layout_initiator: Arc<dyn LayoutInitiator>) -> Self {
        self.layout_initiator = Some(layout_initiator);
        self
    }

    pub fn page_config(mut self, page_config: Arc<dyn PageConfigRenderer>) -> Self {
        self.page_config = Some(page_config);
        self
    }

    pub fn translator(mut self, translator: Arc<dyn TranslationInliner>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn TemplateEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    pub fn content_block(mut self, content_block: impl Into<String>) -> Self {
        self.content_block = Some(content_block.into());
        self
    }

    pub fn build(self) -> Result<HtmlRenderer> {
        anyhow::ensure!(!self.template.trim().is_empty(), "template name must not be empty");
        let content_block = self
            .content_block
            .unwrap_or_else(|| DEFAULT_CONTENT_BLOCK.to_string());
        anyhow::ensure!(
            !content_block.trim().is_empty(),
            "content block name must not be empty"
        );

        Ok(HtmlRenderer {
            context: self.context,
            resolver: self
                .resolver
                .ok_or_else(|| anyhow!("a view file resolver is required"))?,
            layout_initiator: self
                .layout_initiator
                .ok_or_else(|| anyhow!("a layout initiator is required"))?,
            page_config: self
                .page_config
                .ok_or_else(|| anyhow!("a page config renderer is required"))?,
            translator: self
                .translator
                .unwrap_or_else(|| Arc::new(InlineTranslator::disabled())),
            evaluator: self.evaluator.unwrap_or_else(|| Arc::new(TeraEvaluator)),
            template: self.template,
            area: self.area.unwrap_or(Area::Frontend),
            content_block,
        })
    }
}
