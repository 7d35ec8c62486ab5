// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::auth_service::AuthError;
use crate::domain::agreement::AgreementError;
use crate::domain::calculation::CalculationError;
use crate::domain::repository::RepositoryError;

/// Errors surfaced by HTTP handlers.
///
/// Rendered as `{"detail": ..., "code": ...}` with an optional `field` for
/// validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Agreement(#[from] AgreementError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("{detail}")]
    Body { status: StatusCode, detail: String },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: String,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

const INTERNAL_DETAIL: &str = "Internal server error";

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Agreement(e) => match e {
                AgreementError::NotFound(_) => StatusCode::NOT_FOUND,
                AgreementError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                AgreementError::Deleted(_) => StatusCode::BAD_REQUEST,
                AgreementError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Calculation(e) => match e {
                CalculationError::AgreementNotFound(_) => StatusCode::NOT_FOUND,
                CalculationError::UnsupportedAgreementType(_)
                | CalculationError::InvalidPeriod { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CalculationError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CalculationError::Failed(_) | CalculationError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::Credential(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Body { status, .. } => *status,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Agreement(e) => e.code(),
            Self::Calculation(e) => e.code(),
            Self::Auth(e) => e.code(),
            Self::Repository(_) => "repository_error",
            Self::InvalidId(_) => "invalid_id",
            Self::Body { .. } => "invalid_request",
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            Self::Agreement(e) => e.field(),
            _ => None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(code = self.code(), "Request failed: {}", self);
            INTERNAL_DETAIL.to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorBody {
            detail,
            code: self.code(),
            field: self.field(),
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
