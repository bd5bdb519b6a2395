pub mod button;
pub mod models;
pub mod recommend;
pub mod settings;
mod utils;

use button::{ButtonRegistry, Container, STATEFUL_MARKER};
use models::{ContentItem, UserState};
use recommend::{RecommendOptions, RecommendationEngine};
use settings::PlatformSettings;

/// Initialise `env_logger` from `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

/// Everything one rendered page needs: a recommendation engine and the
/// registry of stateful buttons on that page. Drop it, or call
/// [`teardown`](Self::teardown), when the page goes away.
pub struct PageSession {
    pub engine: RecommendationEngine,
    pub buttons: ButtonRegistry,
}

impl PageSession {
    pub fn new(settings: &PlatformSettings) -> Self {
        log::info!(
            "starting page session (limit {}, debounce {}ms)",
            settings.recommendations.default_limit,
            settings.buttons.debounce_ms
        );

        Self {
            engine: RecommendationEngine::new(&settings.recommendations),
            buttons: ButtonRegistry::new(settings.buttons.clone()),
        }
    }

    /// Register every control in `container` marked as stateful.
    pub fn mount(&self, container: &dyn Container) -> usize {
        self.buttons.init_all(container, STATEFUL_MARKER)
    }

    pub fn recommend(
        &self,
        items: &[ContentItem],
        options: &RecommendOptions,
        user_state: &UserState,
    ) -> Vec<ContentItem> {
        self.engine.recommend(items, options, user_state)
    }

    pub fn teardown(&self) {
        self.buttons.teardown();
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.buttons.teardown();
    }
}
