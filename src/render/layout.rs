//! Page layout: a tree of named blocks producing the page body.

use super::resolver::ViewFileResolver;
use crate::error::RenderError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tera::Tera;

/// A named unit of a layout that carries data for its template.
pub trait Block {
    fn name(&self) -> &str;

    fn set_data(&mut self, key: &str, value: Value);

    fn data(&self, key: &str) -> Option<&Value>;
}

/// A built layout.
pub trait Layout {
    /// Block registered under `name`.
    fn get_block(&mut self, name: &str) -> Option<&mut dyn Block>;

    /// Render every block of the layout.
    fn output(&mut self) -> Result<String, RenderError>;
}

/// Produces a fresh layout for each render.
pub trait LayoutInitiator: Send + Sync {
    fn create_layout(&self) -> Result<Box<dyn Layout>, RenderError>;
}

/// A block declared by name and template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    pub template: String,
}

impl BlockDefinition {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }
}

/// Builds [`TemplateLayout`]s from a fixed list of block definitions.
pub struct TemplateLayoutInitiator {
    resolver: Arc<dyn ViewFileResolver>,
    blocks: Vec<BlockDefinition>,
}

impl TemplateLayoutInitiator {
    pub fn new(resolver: Arc<dyn ViewFileResolver>, blocks: Vec<BlockDefinition>) -> Self {
        Self { resolver, blocks }
    }
}

impl LayoutInitiator for TemplateLayoutInitiator {
    fn create_layout(&self) -> Result<Box<dyn Layout>, RenderError> {
        let blocks = self
            .blocks
            .iter()
            .map(|definition| {
                (
                    definition.name.clone(),
                    TemplateBlock::new(&definition.name, &definition.template),
                )
            })
            .collect();
        Ok(Box::new(TemplateLayout {
            resolver: self.resolver.clone(),
            blocks,
        }))
    }
}

/// Block rendered from a template file with its own data as context.
#[derive(Debug, Clone)]
pub struct TemplateBlock {
    name: String,
    template: String,
    data: IndexMap<String, Value>,
}

impl TemplateBlock {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            data: IndexMap::new(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn render(&self, resolver: &dyn ViewFileResolver) -> Result<String, RenderError> {
        let path = resolver
            .resolve(&self.template)
            .ok_or_else(|| RenderError::TemplateNotFound {
                name: self.template.clone(),
            })?;

        let mut tera = Tera::default();
        tera.add_template_file(&path, Some(self.template.as_str()))?;
        let context = tera::Context::from_serialize(&self.data)?;
        Ok(tera.render(&self.template, &context)?)
    }
}

impl Block for TemplateBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_data(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Layout whose output is the concatenation of its blocks, in declaration
/// order.
pub struct TemplateLayout {
    resolver: Arc<dyn ViewFileResolver>,
    blocks: IndexMap<String, TemplateBlock>,
}

impl Layout for TemplateLayout {
    fn get_block(&mut self, name: &str) -> Option<&mut dyn Block> {
        self.blocks
            .get_mut(name)
            .map(|block| block as &mut dyn Block)
    }

    fn output(&mut self) -> Result<String, RenderError> {
        let mut output = String::new();
        for block in self.blocks.values() {
            output.push_str(&block.render(self.resolver.as_ref())?);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct DirResolver(PathBuf);

    impl ViewFileResolver for DirResolver {
        fn resolve(&self, template: &str) -> Option<PathBuf> {
            let path = self.0.join(template);
            path.is_file().then_some(path)
        }
    }

    fn initiator(dir: &std::path::Path) -> TemplateLayoutInitiator {
        std::fs::write(dir.join("header.html"), "<h1>Export</h1>").unwrap();
        std::fs::write(
            dir.join("content.html"),
            "<p>{{ view_model.customer.email }}</p>",
        )
        .unwrap();
        TemplateLayoutInitiator::new(
            Arc::new(DirResolver(dir.to_path_buf())),
            vec![
                BlockDefinition::new("header", "header.html"),
                BlockDefinition::new("content", "content.html"),
            ],
        )
    }

    #[test]
    fn test_output_concatenates_blocks_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut layout = initiator(dir.path()).create_layout().unwrap();

        layout.get_block("content").unwrap().set_data(
            "view_model",
            serde_json::json!({ "customer": { "email": "<jane@example.com>" } }),
        );

        assert_eq!(
            layout.output().unwrap(),
            "<h1>Export</h1><p>&lt;jane@example.com&gt;</p>"
        );
    }

    #[test]
    fn test_each_layout_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let initiator = initiator(dir.path());

        let mut first = initiator.create_layout().unwrap();
        first
            .get_block("content")
            .unwrap()
            .set_data("view_model", serde_json::json!({}));

        let mut second = initiator.create_layout().unwrap();
        assert!(second.get_block("content").unwrap().data("view_model").is_none());
        assert!(second.get_block("missing").is_none());
    }

    #[test]
    fn test_missing_block_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let initiator = TemplateLayoutInitiator::new(
            Arc::new(DirResolver(dir.path().to_path_buf())),
            vec![BlockDefinition::new("content", "nope.html")],
        );

        let mut layout = initiator.create_layout().unwrap();
        assert!(matches!(
            layout.output(),
            Err(RenderError::TemplateNotFound { name }) if name == "nope.html"
        ));
    }
}
