//! Non-fatal diagnostic channel.
//!
//! Binding failures, load failures and (optionally) unmatched transitions are
//! recorded here instead of being returned as errors. Every report is mirrored to
//! `tracing` so operators see it even when nobody drains the channel.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Category of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An action could not resolve its target region.
    Binding,
    /// An image or description failed to load.
    Load,
    /// A description contained something suspicious but usable.
    Description,
    /// An event found no transition in the current state.
    Unmatched,
}

/// A single diagnostic report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Report category.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

/// Shared collector for [`Diagnostic`]s.
///
/// Cloning yields another handle to the same collector.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and logs it.
    pub fn report(&self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            DiagnosticKind::Unmatched => tracing::debug!(kind = ?kind, "{message}"),
            _ => tracing::warn!(kind = ?kind, "{message}"),
        }
        self.entries.borrow_mut().push(Diagnostic { kind, message });
    }

    /// Returns a copy of all recorded diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Removes and returns all recorded diagnostics.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    /// Number of recorded diagnostics of the given kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.borrow().iter().filter(|d| d.kind == kind).count()
    }

    /// Returns `true` if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
