use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use maud::Markup;

use crate::{
    names, services::quiz::AppearanceRepository, session::SessionHandle, utils, AppState,
};

/// Extracts whether the request is an HTMX request by checking the `HX-Request` header.
pub struct IsHtmx(pub bool);

impl<S: Send + Sync> FromRequestParts<S> for IsHtmx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get("HX-Request")
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .is_some_and(|v| v == "true");
        Ok(IsHtmx(is_htmx))
    }
}

/// The caller's game session, resolved from the session cookie.
/// A browser without a (known) cookie gets a fresh session.
pub struct PlayerSession {
    pub handle: SessionHandle,
    secure_cookies: bool,
}

impl<R: AppearanceRepository> FromRequestParts<AppState<R>> for PlayerSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(names::GAME_SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string());

        Ok(PlayerSession {
            handle: state.sessions.resolve(token.as_deref()),
            secure_cookies: state.secure_cookies,
        })
    }
}

impl PlayerSession {
    /// Wraps `body` in a response, setting the session cookie if it was just minted.
    pub fn respond(&self, body: Markup) -> Response {
        let mut response = body.into_response();
        if self.handle.is_new {
            let cookie = utils::cookie(
                names::GAME_SESSION_COOKIE_NAME,
                &self.handle.token,
                self.secure_cookies,
            );
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().insert(SET_COOKIE, value);
                }
                Err(e) => tracing::error!("could not build session cookie: {e}"),
            }
        }
        response
    }
}
