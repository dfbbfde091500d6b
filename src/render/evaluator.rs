//! Page template evaluation.

use super::view::ViewVariables;
use crate::error::RenderError;
use std::io::Write;
use std::path::Path;
use tera::Tera;

/// Evaluates a page template file into a caller-supplied writer.
///
/// Implementations may write partial output before failing; the caller owns
/// the writer and decides what happens to it.
pub trait TemplateEvaluator: Send + Sync {
    fn evaluate(
        &self,
        template: &Path,
        variables: &ViewVariables,
        out: &mut dyn Write,
    ) -> Result<(), RenderError>;
}

/// Evaluates page templates with Tera.
///
/// The file is loaded into a fresh Tera instance per evaluation, so edits to
/// templates are picked up without restarting. Autoescaping follows the
/// file name; page templates emit the view variables with `| safe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraEvaluator;

impl TemplateEvaluator for TeraEvaluator {
    fn evaluate(
        &self,
        template: &Path,
        variables: &ViewVariables,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let name = template.to_string_lossy().into_owned();
        let mut tera = Tera::default();
        tera.add_template_file(template, Some(name.as_str()))?;
        let context = variables.to_context()?;
        tera.render_to(&name, &context, out)?;
        Ok(())
    }
}
