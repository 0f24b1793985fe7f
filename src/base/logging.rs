//! Shared log-verbosity state, adjustable at runtime.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cloneable handle over the process-wide debug-logging switch.
///
/// The binary wires `apply` to a `tracing_subscriber::reload` handle so the
/// control plane's `debug` command can flip verbosity without a restart.
/// Tests use [`LogControl::noop`].
#[derive(Clone)]
pub struct LogControl {
    inner: Arc<LogControlInner>,
}

struct LogControlInner {
    debug: AtomicBool,
    apply: Box<dyn Fn(bool) + Send + Sync>,
}

impl LogControl {
    pub fn new(debug: bool, apply: impl Fn(bool) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(LogControlInner {
                debug: AtomicBool::new(debug),
                apply: Box::new(apply),
            }),
        }
    }

    /// A handle that tracks state but reconfigures nothing.
    pub fn noop(debug: bool) -> Self {
        Self::new(debug, |_| {})
    }

    pub fn debug(&self) -> bool {
        self.inner.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, debug: bool) {
        self.inner.debug.store(debug, Ordering::Relaxed);
        (self.inner.apply)(debug);
    }
}

impl std::fmt::Debug for LogControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogControl").field("debug", &self.debug()).finish()
    }
}
