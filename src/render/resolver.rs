//! Mapping logical template names to files.

use crate::context::PresentationContext;
use std::path::{Component, Path, PathBuf};

/// Resolves a logical template name to a template file.
pub trait ViewFileResolver: Send + Sync {
    /// Path of the template file, or `None` when no file provides it.
    fn resolve(&self, template: &str) -> Option<PathBuf>;
}

/// Looks templates up in a theme directory tree with fallback.
///
/// For design area `area` and theme `theme` the candidates are, in order:
///
/// 1. `<root>/<area>/<theme>/<template>`
/// 2. `<root>/<area>/<template>`
/// 3. `<root>/base/<template>`
///
/// The area and theme are read from the presentation context at resolution
/// time, so the same resolver follows an emulated area.
#[derive(Debug, Clone)]
pub struct ThemeFileResolver {
    root: PathBuf,
    context: PresentationContext,
}

impl ThemeFileResolver {
    pub fn new(root: impl Into<PathBuf>, context: PresentationContext) -> Self {
        Self {
            root: root.into(),
            context,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, template: &Path) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(3);
        if let Some(area) = self.context.design_area() {
            let area_dir = self.root.join(area.as_str());
            if let Some(theme) = self.context.theme() {
                candidates.push(area_dir.join(theme).join(template));
            }
            candidates.push(area_dir.join(template));
        }
        candidates.push(self.root.join("base").join(template));
        candidates
    }
}

/// Template names are relative paths without parent or root components.
fn is_relative_name(template: &Path) -> bool {
    template
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

impl ViewFileResolver for ThemeFileResolver {
    fn resolve(&self, template: &str) -> Option<PathBuf> {
        let name = Path::new(template);
        if template.is_empty() || !is_relative_name(name) {
            tracing::warn!(template, "rejecting template name outside the theme tree");
            return None;
        }

        let resolved = self
            .candidates(name)
            .into_iter()
            .find(|candidate| candidate.is_file());
        tracing::debug!(template, resolved = ?resolved, "template resolution");
        resolved
    }
}
