//! Call-counting test doubles for lifecycle hooks.

use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// A cloneable call counter. Clones share the same underlying counter, so a
/// spy can be handed to a hook closure and observed from the caller.
#[derive(Clone, Debug, Default)]
pub struct CallSpy {
    calls: Arc<AtomicU64>,
}

impl CallSpy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one invocation.
    pub fn call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn called(&self) -> bool {
        self.count() > 0
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

/// Spy observed by the child entity's after-delete hook.
///
/// `ActiveModelBehavior` hooks are static trait methods with no user context,
/// so the hook has to report into process-global state. Callers that read
/// this spy must serialize scenario runs (see `run`).
pub fn destroy_spy() -> &'static CallSpy {
    static DESTROY_SPY: LazyLock<CallSpy> = LazyLock::new(CallSpy::new);
    &DESTROY_SPY
}
