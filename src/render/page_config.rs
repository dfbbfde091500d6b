//! Page-level head content and element attributes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tera::escape_html;

/// Elements of the page skeleton that carry configurable attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Html,
    Head,
    Body,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Html => write!(f, "html"),
            ElementType::Head => write!(f, "head"),
            ElementType::Body => write!(f, "body"),
        }
    }
}

/// Renders the page head and the attributes of the skeleton elements.
pub trait PageConfigRenderer: Send + Sync {
    fn render_head_content(&self) -> String;

    /// Attributes of `element` as `name="value"` pairs separated by spaces.
    fn render_element_attributes(&self, element: ElementType) -> String;
}

/// Static page configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageConfig {
    title: Option<String>,
    charset: Option<String>,
    metadata: IndexMap<String, String>,
    element_attributes: IndexMap<ElementType, IndexMap<String, String>>,
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.metadata.insert(name.into(), content.into());
        self
    }

    pub fn with_element_attribute(
        mut self,
        element: ElementType,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.element_attributes
            .entry(element)
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl PageConfigRenderer for PageConfig {
    fn render_head_content(&self) -> String {
        let mut head = String::new();
        if let Some(charset) = &self.charset {
            head.push_str(&format!("<meta charset=\"{}\"/>\n", escape_html(charset)));
        }
        for (name, content) in &self.metadata {
            head.push_str(&format!(
                "<meta name=\"{}\" content=\"{}\"/>\n",
                escape_html(name),
                escape_html(content)
            ));
        }
        if let Some(title) = &self.title {
            head.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        }
        head
    }

    fn render_element_attributes(&self, element: ElementType) -> String {
        self.element_attributes
            .get(&element)
            .map(|attributes| {
                attributes
                    .iter()
                    .map(|(name, value)| format!("{}=\"{}\"", name, escape_html(value)))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }
}
