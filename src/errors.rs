use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to request date catalog: {0}")]
    Http(#[from] reqwest::Error),

    #[error("date catalog responded with status {status}")]
    Status { status: u16 },

    #[error("failed to decode date catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid date in catalog: {value:?}")]
    InvalidDate { value: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to request snapshot for {date}: {source}")]
    Http {
        date: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("snapshot for {date} responded with status {status}")]
    Status { date: String, status: u16 },

    #[error("failed to decode snapshot for {date}: {source}")]
    Json {
        date: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn date(&self) -> &str {
        match self {
            Self::Http { date, .. } | Self::Status { date, .. } | Self::Json { date, .. } => date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("timeline is disabled: {reason}")]
    Disabled { reason: String },

    #[error("no dates available")]
    Empty,

    #[error("index {index} is outside 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("date {date} is not in the catalog")]
    UnknownDate { date: String },

    #[error("seek requires an index or a date")]
    MissingTarget,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<TimelineError> for AppError {
    fn from(err: TimelineError) -> Self {
        let status = match err {
            TimelineError::Disabled { .. } | TimelineError::Empty => StatusCode::SERVICE_UNAVAILABLE,
            TimelineError::UnknownDate { .. } => StatusCode::NOT_FOUND,
            TimelineError::IndexOutOfRange { .. } | TimelineError::MissingTarget => {
                StatusCode::BAD_REQUEST
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
