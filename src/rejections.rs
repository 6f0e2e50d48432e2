use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{html, Markup};

use crate::views;

#[derive(Debug)]
pub enum AppError {
    Input(&'static str),
    /// The appearances store could not answer; nothing of the page is rendered.
    DataUnavailable(&'static str),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::Input(_) => "INPUT_ERROR",
            AppError::DataUnavailable(_) => "DATA_UNAVAILABLE",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), error_page(self.message())).into_response()
    }
}

pub trait ResultExt<T> {
    fn reject_input(self, msg: &'static str) -> Result<T, AppError>;
    fn unavailable(self, msg: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn reject_input(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::warn!("{msg}: {e}");
            AppError::Input(msg)
        })
    }

    fn unavailable(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{msg}: {e}");
            AppError::DataUnavailable(msg)
        })
    }
}

fn error_page(message: &str) -> Markup {
    views::titled(
        "Error",
        html! {
            article {
                h1 { (message) }
                p { "Please try again in a moment." }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_failures_map_to_service_unavailable() {
        let err: Result<(), _> = Err("connection refused");
        let response = err.unavailable("could not load players").unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn input_failures_map_to_bad_request() {
        let err: Result<(), _> = Err("bad level");
        let response = err.reject_input("invalid level").unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
