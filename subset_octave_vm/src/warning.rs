//! Recoverable runtime warnings.
//!
//! Kernels report conditions such as division by zero here instead of
//! failing. Each warning goes out as a `tracing` event carrying its Octave
//! identifier and is also queued in a thread-local collector so the
//! evaluator can show it after the statement completes.
//!
//! # Usage
//!
//! - `set_enabled(id, false)` - silence one warning process-wide
//! - `set_echo(true)` - also write warnings to stderr
//! - `WarningCollector::take()` - retrieve and clear queued warnings
//!
//! The queue holds at most `MAX_QUEUED` warnings per thread; once full, the
//! oldest entry is dropped for each new one. Evaluators should drain it
//! after every statement.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

/// Known warning identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningId {
    DivideByZero,
    NanToLogical,
    ImagToReal,
    SingularMatrix,
}

impl WarningId {
    pub const ALL: [WarningId; 4] = [
        WarningId::DivideByZero,
        WarningId::NanToLogical,
        WarningId::ImagToReal,
        WarningId::SingularMatrix,
    ];

    /// Octave warning identifier
    pub fn as_str(self) -> &'static str {
        match self {
            WarningId::DivideByZero => "Octave:divide-by-zero",
            WarningId::NanToLogical => "Octave:nan-to-logical-conversion",
            WarningId::ImagToReal => "Octave:imag-to-real",
            WarningId::SingularMatrix => "Octave:singular-matrix",
        }
    }

    pub fn from_id(id: &str) -> Option<WarningId> {
        WarningId::ALL.iter().copied().find(|w| w.as_str() == id)
    }

    fn index(self) -> usize {
        match self {
            WarningId::DivideByZero => 0,
            WarningId::NanToLogical => 1,
            WarningId::ImagToReal => 2,
            WarningId::SingularMatrix => 3,
        }
    }
}

impl fmt::Display for WarningId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted warning
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub id: WarningId,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {}", self.message)
    }
}

static DISABLED: [AtomicBool; 4] = [
    AtomicBool::new(false),
    AtomicBool::new(false),
    AtomicBool::new(false),
    AtomicBool::new(false),
];
static ECHO: AtomicBool = AtomicBool::new(false);

/// Per-thread queue capacity
pub const MAX_QUEUED: usize = 256;

thread_local! {
    static WARNINGS: RefCell<Vec<Warning>> = const { RefCell::new(Vec::new()) };
}

/// Enable or disable one warning for the whole process
pub fn set_enabled(id: WarningId, enabled: bool) {
    DISABLED[id.index()].store(!enabled, Ordering::Relaxed);
}

pub fn is_enabled(id: WarningId) -> bool {
    !DISABLED[id.index()].load(Ordering::Relaxed)
}

/// Mirror warnings onto stderr
pub fn set_echo(echo: bool) {
    ECHO.store(echo, Ordering::Relaxed);
}

/// Emit a warning unless it is disabled. Queued until
/// `WarningCollector::take()`; past `MAX_QUEUED` the oldest is discarded.
pub fn warn(id: WarningId, message: impl Into<String>) {
    if !is_enabled(id) {
        return;
    }
    let warning = Warning {
        id,
        message: message.into(),
    };
    tracing::warn!(warning_id = id.as_str(), "{}", warning.message);
    if ECHO.load(Ordering::Relaxed) {
        let _ = writeln!(std::io::stderr(), "{}", warning);
    }
    WARNINGS.with(|w| {
        let mut queue = w.borrow_mut();
        if queue.len() >= MAX_QUEUED {
            queue.remove(0);
        }
        queue.push(warning);
    });
}

pub fn warn_divide_by_zero() {
    warn(WarningId::DivideByZero, "division by zero");
}

pub fn warn_imag_to_real() {
    warn(
        WarningId::ImagToReal,
        "imaginary part of complex value discarded",
    );
}

/// Collector for warnings emitted on the current thread.
#[derive(Debug)]
pub struct WarningCollector;

impl WarningCollector {
    /// Take all queued warnings, clearing the queue.
    pub fn take() -> Vec<Warning> {
        WARNINGS.with(|w| std::mem::take(&mut *w.borrow_mut()))
    }

    pub fn clear() {
        WARNINGS.with(|w| w.borrow_mut().clear());
    }

    pub fn count() -> usize {
        WARNINGS.with(|w| w.borrow().len())
    }

    /// True if a warning with `id` is queued
    pub fn contains(id: WarningId) -> bool {
        WARNINGS.with(|w| w.borrow().iter().any(|x| x.id == id))
    }
}
