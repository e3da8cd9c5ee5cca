// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure bodies: `{error, details: {kind, correlation_id, session_id?}}`.
//!
//! Every rendered failure is logged with its correlation id.

use attune_core::AttuneError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

/// An error rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: String,
    pub message: String,
    pub correlation_id: Uuid,
    /// The session the failed request touched, when one exists.
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: ErrorDetails,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub kind: String,
    pub correlation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ApiError {
    pub fn from_error(err: &AttuneError, correlation_id: Uuid) -> Self {
        Self {
            status: StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            kind: err.kind().to_string(),
            message: err.to_string(),
            correlation_id,
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// A `Validation` failure with a fresh correlation id.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::from_error(&AttuneError::Validation(message.into()), Uuid::new_v4())
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            kind: "unauthorized".to_string(),
            message: "missing or invalid bearer token".to_string(),
            correlation_id: Uuid::new_v4(),
            session_id: None,
        }
    }
}

impl From<AttuneError> for ApiError {
    fn from(err: AttuneError) -> Self {
        Self::from_error(&err, Uuid::new_v4())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let session_id = self.session_id.as_deref().unwrap_or("-");
        if self.status.is_server_error() {
            tracing::error!(
                correlation_id = %self.correlation_id,
                session_id,
                status = self.status.as_u16(),
                kind = %self.kind,
                error = %self.message,
                "request failed"
            );
        } else {
            tracing::warn!(
                correlation_id = %self.correlation_id,
                session_id,
                status = self.status.as_u16(),
                kind = %self.kind,
                error = %self.message,
                "request rejected"
            );
        }
        let body = ErrorBody {
            error: self.message,
            details: ErrorDetails {
                kind: self.kind,
                correlation_id: self.correlation_id,
                session_id: self.session_id,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let id = Uuid::new_v4();
        let busy = ApiError::from_error(&AttuneError::Busy, id);
        assert_eq!(busy.status, StatusCode::CONFLICT);
        assert_eq!(busy.kind, "busy");
        assert_eq!(busy.correlation_id, id);

        let config = ApiError::from(AttuneError::Config("no key".into()));
        assert_eq!(config.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(config.kind, "configuration");

        let service = ApiError::from(AttuneError::service("down"));
        assert_eq!(service.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn body_shape() {
        let err = ApiError::validation("message must not be empty");
        let body = ErrorBody {
            error: err.message.clone(),
            details: ErrorDetails {
                kind: err.kind.clone(),
                correlation_id: err.correlation_id,
                session_id: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "validation error: message must not be empty");
        assert_eq!(json["details"]["kind"], "validation");
        assert!(json["details"]["correlation_id"].is_string());
        assert!(json["details"].get("session_id").is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn rendering_logs_the_correlation_id() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let err = ApiError::validation("bad label").with_session("s-42");
        let id = err.correlation_id;
        let response = tracing::subscriber::with_default(subscriber, || err.into_response());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("request rejected"), "{logged}");
        assert!(logged.contains(&id.to_string()), "{logged}");
        assert!(logged.contains("s-42"), "{logged}");
    }
}
