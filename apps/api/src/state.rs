use crate::config::Config;
use crate::preview::template::PageTemplate;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Paper the programme is printed on and the preview stands in for.
    pub template: PageTemplate,
}
