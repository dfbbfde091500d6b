//! Presentation context: which area and theme are currently active.
//!
//! The context is shared, mutable state: template resolution reads it, and a
//! render temporarily overrides it. Instead of a process global it lives
//! behind an explicit handle, [`PresentationContext`], which is cheap to
//! clone and is handed to every collaborator that needs it.
//!
//! Overrides go through [`PresentationContext::with_context`] (see
//! [`emulation`]), which restores the previous state on every exit path.

pub mod emulation;

pub use emulation::EmulationGuard;

use crate::error::RenderError;
use clap::ValueEnum;
use indexmap::IndexMap;
use parking_lot::{ReentrantMutex, RwLock};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Application area a render runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Global,
    Frontend,
    Adminhtml,
    Crontab,
}

impl Area {
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Global => "global",
            Area::Frontend => "frontend",
            Area::Adminhtml => "adminhtml",
            Area::Crontab => "crontab",
        }
    }
}

impl FromStr for Area {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the presentation context.
///
/// `area` is the application area code. `design_area` is the area the
/// design layer resolves themes for; when unset it follows `area`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextState {
    pub area: Option<Area>,
    pub design_area: Option<Area>,
    pub theme: Option<String>,
}

struct ContextInner {
    state: RwLock<ContextState>,
    // Holds the area being emulated by the thread that owns the lock.
    gate: ReentrantMutex<Cell<Option<Area>>>,
    themes: IndexMap<Area, String>,
}

/// Shared handle to the presentation context.
#[derive(Clone)]
pub struct PresentationContext {
    inner: Arc<ContextInner>,
}

impl PresentationContext {
    /// Create a context with no area set and the given default theme per area.
    pub fn new(themes: IndexMap<Area, String>) -> Self {
        Self::with_state(ContextState::default(), themes)
    }

    pub fn with_state(state: ContextState, themes: IndexMap<Area, String>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                state: RwLock::new(state),
                gate: ReentrantMutex::new(Cell::new(None)),
                themes,
            }),
        }
    }

    pub fn snapshot(&self) -> ContextState {
        self.inner.state.read().clone()
    }

    pub fn area(&self) -> Option<Area> {
        self.inner.state.read().area
    }

    pub fn set_area_code(&self, area: Area) {
        self.inner.state.write().area = Some(area);
    }

    /// Area the design layer works in, falling back to the area code.
    pub fn design_area(&self) -> Option<Area> {
        let state = self.inner.state.read();
        state.design_area.or(state.area)
    }

    /// Switch the design area. The current theme no longer applies and is
    /// cleared.
    pub fn set_design_area(&self, area: Area) {
        let mut state = self.inner.state.write();
        state.design_area = Some(area);
        state.theme = None;
    }

    pub fn theme(&self) -> Option<String> {
        self.inner.state.read().theme.clone()
    }

    pub fn default_theme(&self, area: Area) -> Option<&str> {
        self.inner.themes.get(&area).map(String::as_str)
    }

    /// Apply the configured default theme of the current design area.
    pub fn set_default_design_theme(&self) -> Result<(), RenderError> {
        let area = self.design_area().ok_or(RenderError::AreaNotSet)?;
        let theme = self
            .default_theme(area)
            .ok_or(RenderError::ThemeNotConfigured { area })?
            .to_string();
        self.inner.state.write().theme = Some(theme);
        Ok(())
    }

    /// Re-apply the design area and default theme for the current area code.
    ///
    /// Switching the area code alone leaves the design layer on whatever it
    /// resolved before; this brings it in line with the emulated area.
    pub fn reassert_design(&self) -> Result<(), RenderError> {
        let area = self.area().ok_or(RenderError::AreaNotSet)?;
        self.set_design_area(area);
        self.set_default_design_theme()
    }

    fn restore(&self, state: ContextState) {
        *self.inner.state.write() = state;
    }
}

impl fmt::Debug for PresentationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationContext")
            .field("state", &*self.inner.state.read())
            .field("themes", &self.inner.themes)
            .finish()
    }
}
