use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Environment variable consulted by [`MutateOptions::from_env`].
pub const HYBRID_ENV_VAR: &str = "FORMULA_MUTATE_HYBRID";

#[derive(Debug, Clone)]
pub struct MutateOptions {
    /// Answer recognised reductions (`mean`, `var`, `sd` of a column) with the specialized
    /// reducers instead of evaluating the call once per group.
    pub hybrid: bool,
    /// Polled between output expressions.
    pub interrupt: Option<InterruptFlag>,
}

impl Default for MutateOptions {
    fn default() -> Self {
        Self {
            hybrid: true,
            interrupt: None,
        }
    }
}

impl MutateOptions {
    /// Defaults, with `hybrid` disabled when `FORMULA_MUTATE_HYBRID` is `0`, `false` or `off`.
    pub fn from_env() -> Self {
        let hybrid = match std::env::var(HYBRID_ENV_VAR) {
            Ok(value) => !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off"
            ),
            Err(_) => true,
        };
        Self {
            hybrid,
            ..Self::default()
        }
    }

    pub fn with_hybrid(mut self, hybrid: bool) -> Self {
        self.hybrid = hybrid;
        self
    }

    pub fn with_interrupt(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub(crate) fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(InterruptFlag::is_raised)
    }
}

/// Cooperative cancellation flag shared between a running transform and its caller.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
