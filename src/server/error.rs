use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::MatchdayError;

/// Error rendered as a JSON `{"error": "..."}` body with a matching status
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<MatchdayError> for AppError {
    fn from(e: MatchdayError) -> Self {
        match &e {
            MatchdayError::UnknownTeam(_) => AppError::new(StatusCode::NOT_FOUND, e.to_string()),
            MatchdayError::MatchNotFound { .. } => {
                AppError::new(StatusCode::NOT_FOUND, "Match not found in current data")
            }
            MatchdayError::InvalidRequest(msg) => {
                AppError::new(StatusCode::BAD_REQUEST, msg.clone())
            }
            MatchdayError::FeedUnavailable(_) => AppError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch live match data",
            ),
            MatchdayError::Provider { .. } | MatchdayError::EmptyResponse(_) => {
                AppError::new(StatusCode::BAD_GATEWAY, format!("Model inference failed: {}", e))
            }
            MatchdayError::Http(_) => AppError::new(StatusCode::BAD_GATEWAY, e.to_string()),
            _ => {
                log::error!("Request failed: {}", e);
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (MatchdayError::UnknownTeam("X".into()), StatusCode::NOT_FOUND),
            (
                MatchdayError::MatchNotFound {
                    home: "A".into(),
                    away: "B".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                MatchdayError::InvalidRequest("Missing field: h2h".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                MatchdayError::EmptyResponse(Provider::Gemini),
                StatusCode::BAD_GATEWAY,
            ),
            (
                MatchdayError::Parse("bad csv".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status, status);
        }
    }

    #[test]
    fn test_invalid_request_message_is_bare() {
        let err = AppError::from(MatchdayError::InvalidRequest("Missing field: h2h".into()));
        assert_eq!(err.message, "Missing field: h2h");
    }
}
