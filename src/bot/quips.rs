//! Non-repeating quip rotation for link replies.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use rand::Rng;

/// The stock phrasing templates. Each has exactly one `{}` link slot.
pub const DEFAULT_QUIPS: &[&str] = &[
    "{}",
    "linkbot noticed a link! {}",
    "Oh, here it is... {}",
    "Maybe this, {}, will help?",
    "Click me! {}",
    "Click my shiny metal link! {}",
    "Here, let me link that for you... {}",
    "Couldn't help but notice {} was mentioned...",
    "Not that I was eavesdropping, but did you mention {}?",
    "hmmmm, did you mean {}?",
    "{}...  Mama said there'd be days like this...",
    "{}?  An epic, yet approachable tale...",
    "{}?  Reminds me of a story...",
];

/// Shuffled-without-replacement rotation over a bot's quip templates.
///
/// The working pool is drained one draw at a time and refilled from the full
/// template list on exhaustion, so every template appears once per cycle.
pub struct QuipRotator {
    templates: Vec<String>,
    pool: Mutex<Vec<String>>,
    enabled: AtomicBool,
}

impl QuipRotator {
    pub fn new(templates: Vec<String>) -> Self {
        Self {
            templates,
            pool: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_QUIPS.iter().map(|quip| (*quip).to_string()).collect())
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// The full template list this rotator draws from.
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Clear the working pool; the next draw refills from the full list.
    pub fn reset(&self) {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Wrap `link` in the next quip, or return it bare when quips are off.
    pub fn next(&self, link: &str) -> String {
        if !self.enabled() || self.templates.is_empty() {
            return link.to_string();
        }

        let template = {
            let mut pool = self.pool.lock().unwrap_or_else(PoisonError::into_inner);

            if pool.is_empty() {
                *pool = self.templates.clone();
            }

            let index = rand::rng().random_range(0..pool.len());
            pool.swap_remove(index)
        };

        template.replacen("{}", link, 1)
    }
}
