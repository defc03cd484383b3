//! Engine warnings with pluggable sinks.
//!
//! Matching never fails because a selector uses something the engine
//! recognizes but cannot evaluate; instead a [`Warning`] is handed to the
//! caller's [`WarnSink`]. [`StderrSink`] prints each distinct warning once
//! with colored terminal output, [`WarningLog`] collects them.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// A single non-fatal diagnostic produced while matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Warning {
    /// Component that raised the warning, e.g. `"Selector"`.
    pub component: String,
    /// Human-readable message, e.g. `"Unsupported pseudo-class :playing"`.
    pub message: String,
}

impl Warning {
    /// Create a warning for `component`.
    #[must_use]
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

/// Receiver for warnings raised during a call.
pub trait WarnSink {
    /// Deliver one warning.
    fn warn(&self, warning: &Warning);
}

impl<F> WarnSink for F
where
    F: Fn(&Warning),
{
    fn warn(&self, warning: &Warning) {
        self(warning);
    }
}

/// Sink that prints to stderr through [`warn_once`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl WarnSink for StderrSink {
    fn warn(&self, warning: &Warning) {
        warn_once(&warning.component, &warning.message);
    }
}

/// Sink that records every warning it receives, in order.
#[derive(Debug, Default)]
pub struct WarningLog {
    entries: Mutex<Vec<Warning>>,
}

impl WarningLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded warnings.
    #[must_use]
    pub fn entries(&self) -> Vec<Warning> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded messages only, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|w| w.message).collect()
    }

    /// Drain the recorded warnings.
    pub fn take(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl WarnSink for WarningLog {
    fn warn(&self, warning: &Warning) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning.clone());
    }
}

/// Warn about an unsupported feature (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Selector", "Unsupported pseudo-class :playing");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{YELLOW}[Kestrel {component}] ⚠ {message}{RESET}");
    }
}

/// Clear all recorded warnings so they print again.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_records_in_order() {
        let log = WarningLog::new();
        log.warn(&Warning::new("Selector", "first"));
        log.warn(&Warning::new("Selector", "second"));
        assert_eq!(log.messages(), vec!["first", "second"]);
        assert_eq!(log.take().len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let seen = std::cell::RefCell::new(Vec::new());
        let sink = |w: &Warning| seen.borrow_mut().push(w.to_string());
        sink.warn(&Warning::new("Selector", "x"));
        assert_eq!(seen.into_inner(), vec!["[Selector] x".to_string()]);
    }
}
