#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use privacy_export::render::{
    Block, ElementType, Layout, LayoutInitiator, PageConfigRenderer, TemplateEvaluator,
    ViewFileResolver, ViewVariables,
};
use privacy_export::validation::{MessageAccumulator, Messages, Validator};
use privacy_export::{Area, PresentationContext, RenderError};
use serde_json::{Map, Value, json};

pub const HEAD_MARKER: &str = "<title>head-marker</title>";
pub const HTML_ATTRS_MARKER: &str = "data-marker=\"html\"";
pub const HEAD_ATTRS_MARKER: &str = "data-marker=\"head\"";
pub const BODY_ATTRS_MARKER: &str = "data-marker=\"body\"";
pub const LAYOUT_MARKER: &str = "<main>layout-marker</main>";
pub const PAGE_TEMPLATE: &str = "privacy/export/page.html";
pub const CONTENT_BLOCK: &str = "main.content.customer.privacy.export.personal.data";

pub fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be an object, got {other}"),
    }
}

pub fn sample_payload() -> Map<String, Value> {
    payload(json!({
        "customer": { "email": "jane@example.com", "firstname": "Jane" },
        "addresses": [{ "city": "Lyon" }]
    }))
}

/// Context with frontend and adminhtml themes, currently in adminhtml.
pub fn admin_context() -> PresentationContext {
    let context = PresentationContext::new(IndexMap::from([
        (Area::Frontend, "Opengento/luma".to_string()),
        (Area::Adminhtml, "Magento/backend".to_string()),
    ]));
    context.set_area_code(Area::Adminhtml);
    context
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Unit returning a fixed verdict and a fixed set of messages, counting calls.
pub struct ScriptedValidator {
    verdict: bool,
    messages: Messages,
    calls: Arc<AtomicUsize>,
}

impl ScriptedValidator {
    pub fn new(verdict: bool, messages: &[(&str, &[&str])]) -> Self {
        let mut accumulator = MessageAccumulator::new();
        for (key, values) in messages {
            for value in *values {
                accumulator.add_message(*key, *value);
            }
        }
        Self {
            verdict,
            messages: accumulator.take(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_messages(verdict: bool, messages: Messages) -> Self {
        Self {
            verdict,
            messages,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn passing() -> Self {
        Self::new(true, &[])
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl<T: ?Sized> Validator<T> for ScriptedValidator {
    fn is_valid(&mut self, _value: &T) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }

    fn messages(&self) -> &Messages {
        &self.messages
    }
}

// ---------------------------------------------------------------------------
// Render collaborators
// ---------------------------------------------------------------------------

/// Resolver backed by a fixed name to path table. Records every lookup
/// together with the design area active at the time.
#[derive(Default)]
pub struct MapResolver {
    files: HashMap<String, PathBuf>,
    context: Option<PresentationContext>,
    lookups: Mutex<Vec<(String, Option<Area>)>>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.files.insert(name.to_string(), path.into());
        self
    }

    pub fn observing(mut self, context: PresentationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn lookups(&self) -> Vec<(String, Option<Area>)> {
        self.lookups.lock().clone()
    }
}

impl ViewFileResolver for MapResolver {
    fn resolve(&self, template: &str) -> Option<PathBuf> {
        let area = self.context.as_ref().and_then(PresentationContext::design_area);
        self.lookups.lock().push((template.to_string(), area));
        self.files.get(template).cloned()
    }
}

/// Block that only stores data.
pub struct RecordingBlock {
    name: String,
    data: IndexMap<String, Value>,
    sink: Arc<Mutex<Option<Value>>>,
}

impl Block for RecordingBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_data(&mut self, key: &str, value: Value) {
        *self.sink.lock() = Some(value.clone());
        self.data.insert(key.to_string(), value);
    }

    fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

pub struct StaticLayout {
    block: Option<RecordingBlock>,
    output: Result<String, String>,
}

impl Layout for StaticLayout {
    fn get_block(&mut self, name: &str) -> Option<&mut dyn Block> {
        self.block
            .as_mut()
            .filter(|block| block.name == name)
            .map(|block| block as &mut dyn Block)
    }

    fn output(&mut self) -> Result<String, RenderError> {
        self.output
            .clone()
            .map_err(|message| RenderError::from(anyhow::anyhow!(message)))
    }
}

/// Layout initiator producing a single recording block with a fixed output.
pub struct StaticLayoutInitiator {
    block_name: Option<String>,
    output: Result<String, String>,
    creations: AtomicUsize,
    received: Arc<Mutex<Option<Value>>>,
}

impl StaticLayoutInitiator {
    pub fn new(block_name: &str, output: &str) -> Self {
        Self {
            block_name: Some(block_name.to_string()),
            output: Ok(output.to_string()),
            creations: AtomicUsize::new(0),
            received: Arc::new(Mutex::new(None)),
        }
    }

    pub fn without_blocks(output: &str) -> Self {
        Self {
            block_name: None,
            ..Self::new("", output)
        }
    }

    pub fn failing_output(block_name: &str, message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            ..Self::new(block_name, "")
        }
    }

    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    /// Data last handed to the content block.
    pub fn received(&self) -> Option<Value> {
        self.received.lock().clone()
    }
}

impl LayoutInitiator for StaticLayoutInitiator {
    fn create_layout(&self) -> Result<Box<dyn Layout>, RenderError> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StaticLayout {
            block: self.block_name.as_ref().map(|name| RecordingBlock {
                name: name.clone(),
                data: IndexMap::new(),
                sink: self.received.clone(),
            }),
            output: self.output.clone(),
        }))
    }
}

/// Page config rendering one marker per element.
pub struct MarkerPageConfig;

impl PageConfigRenderer for MarkerPageConfig {
    fn render_head_content(&self) -> String {
        HEAD_MARKER.to_string()
    }

    fn render_element_attributes(&self, element: ElementType) -> String {
        match element {
            ElementType::Html => HTML_ATTRS_MARKER,
            ElementType::Head => HEAD_ATTRS_MARKER,
            ElementType::Body => BODY_ATTRS_MARKER,
        }
        .to_string()
    }
}

/// Evaluator writing the view variables in a fixed skeleton.
#[derive(Default)]
pub struct SkeletonEvaluator {
    calls: AtomicUsize,
    seen: Mutex<Vec<(PathBuf, ViewVariables)>>,
}

impl SkeletonEvaluator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, ViewVariables)> {
        self.seen.lock().clone()
    }
}

impl TemplateEvaluator for SkeletonEvaluator {
    fn evaluate(
        &self,
        template: &Path,
        variables: &ViewVariables,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .push((template.to_path_buf(), variables.clone()));
        write!(
            out,
            "<html {}><head {}>{}</head><body {}>{}</body></html>",
            variables.html_attributes,
            variables.head_attributes,
            variables.head_content,
            variables.body_attributes,
            variables.layout_content
        )?;
        Ok(())
    }
}

/// Evaluator that writes part of a page and then fails.
pub struct FailingEvaluator {
    pub partial: &'static str,
}

impl TemplateEvaluator for FailingEvaluator {
    fn evaluate(
        &self,
        _template: &Path,
        _variables: &ViewVariables,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        out.write_all(self.partial.as_bytes())?;
        Err(RenderError::from(anyhow::anyhow!(
            "template raised after partial output"
        )))
    }
}

/// Evaluator that panics mid-render.
pub struct PanickingEvaluator;

impl TemplateEvaluator for PanickingEvaluator {
    fn evaluate(
        &self,
        _template: &Path,
        _variables: &ViewVariables,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let _ = out.write_all(b"<html>");
        panic!("template engine crashed");
    }
}
