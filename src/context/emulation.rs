//! Scoped area emulation.
//!
//! [`PresentationContext::with_context`] runs a closure with the area code
//! switched to a target area and puts the previous context back afterwards.
//! Restoration happens in [`EmulationGuard`]'s `Drop`, so it covers normal
//! returns, early `?` returns and unwinding panics alike.
//!
//! Emulation is serialized per context: a second thread blocks until the
//! first one has restored the context, and a nested emulation on the same
//! thread is rejected with [`RenderError::NestedEmulation`].

use super::{Area, ContextState, PresentationContext};
use crate::error::RenderError;
use parking_lot::ReentrantMutexGuard;
use std::cell::Cell;

/// RAII guard for an active area emulation.
///
/// Dropping the guard restores the context captured at acquisition and
/// releases the emulation gate.
pub struct EmulationGuard<'a> {
    context: &'a PresentationContext,
    gate: ReentrantMutexGuard<'a, Cell<Option<Area>>>,
    saved: ContextState,
    area: Area,
}

impl<'a> EmulationGuard<'a> {
    /// Switch `context` to `area`, blocking while another thread emulates.
    pub fn acquire(context: &'a PresentationContext, area: Area) -> Result<Self, RenderError> {
        let gate = context.inner.gate.lock();
        if let Some(active) = gate.get() {
            return Err(RenderError::NestedEmulation { active });
        }
        gate.set(Some(area));

        let saved = context.snapshot();
        context.set_area_code(area);
        tracing::debug!(area = %area, previous = ?saved.area, "area emulation started");

        Ok(Self {
            context,
            gate,
            saved,
            area,
        })
    }

    /// Area being emulated.
    pub fn area(&self) -> Area {
        self.area
    }

    /// Context that will be restored on drop.
    pub fn saved_state(&self) -> &ContextState {
        &self.saved
    }
}

impl Drop for EmulationGuard<'_> {
    fn drop(&mut self) {
        let saved = std::mem::take(&mut self.saved);
        self.context.restore(saved);
        self.gate.set(None);
        tracing::debug!(
            area = %self.area,
            panicking = std::thread::panicking(),
            "area emulation finished, context restored"
        );
    }
}

impl PresentationContext {
    /// Run `body` with the area code switched to `area`.
    ///
    /// The previous context is restored whatever `body` does.
    pub fn with_context<T, F>(&self, area: Area, body: F) -> Result<T, RenderError>
    where
        F: FnOnce() -> Result<T, RenderError>,
    {
        let _guard = EmulationGuard::acquire(self, area)?;
        body()
    }

    /// Area emulated by the calling thread, if any.
    pub fn emulated_area(&self) -> Option<Area> {
        // Another thread holding the gate means this thread is not emulating.
        self.inner.gate.try_lock().and_then(|gate| gate.get())
    }
}
