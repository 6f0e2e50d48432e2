pub mod cache;
pub mod db;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod rejections;
pub mod services;
pub mod session;
pub mod utils;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};

use crate::cache::CachedRepository;
use crate::db::Db;
use crate::services::quiz::{AppearanceRepository, QuizService};
use crate::session::SessionStore;

/// Shared handler state. `R` is the store behind the read cache.
pub struct AppState<R: AppearanceRepository = Db> {
    pub quiz: Arc<QuizService<CachedRepository<R>>>,
    pub sessions: SessionStore,
    /// Competition named in page copy.
    pub competition: Arc<str>,
    /// How long a wrong answer stays on screen before the board reloads.
    pub reset_delay: Duration,
    pub secure_cookies: bool,
}

impl<R: AppearanceRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            quiz: Arc::clone(&self.quiz),
            sessions: self.sessions.clone(),
            competition: Arc::clone(&self.competition),
            reset_delay: self.reset_delay,
            secure_cookies: self.secure_cookies,
        }
    }
}

pub fn router<R: AppearanceRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .merge(handlers::game::routes())
        .layer(middleware::from_fn(csrf_check))
        .with_state(state)
}

async fn csrf_check(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    use axum::http::{Method, StatusCode};
    use axum::response::IntoResponse;

    let state_changing = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

    if state_changing.contains(req.method()) {
        let has_hx_request = req
            .headers()
            .get("HX-Request")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");

        if !has_hx_request {
            return (StatusCode::FORBIDDEN, "CSRF check failed").into_response();
        }
    }

    next.run(req).await
}
