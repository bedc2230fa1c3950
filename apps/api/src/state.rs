use crate::ats::controller::Controller;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Holds the page extractor and text generator; stubbed in tests.
    pub controller: Controller,
}
