use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    // Model loading
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid model format: {0}")]
    ModelFormat(String),

    // Tokenization
    #[error("Tokenizer not found: {0}")]
    TokenizerNotFound(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    // Inference
    #[error("Inference failed: {0}")]
    Inference(String),

    // Network/Download
    #[error("Download failed: {0}")]
    Download(String),

    // Device
    #[error("Device error: {0}")]
    Device(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SentimentError>;

impl From<hf_hub::api::tokio::ApiError> for SentimentError {
    fn from(value: hf_hub::api::tokio::ApiError) -> Self {
        SentimentError::Download(value.to_string())
    }
}

impl From<config::ConfigError> for SentimentError {
    fn from(value: config::ConfigError) -> Self {
        SentimentError::Config(value.to_string())
    }
}

impl From<minijinja::Error> for SentimentError {
    fn from(value: minijinja::Error) -> Self {
        SentimentError::Template(value.to_string())
    }
}

impl From<actix_web::error::BlockingError> for SentimentError {
    fn from(value: actix_web::error::BlockingError) -> Self {
        SentimentError::Inference(value.to_string())
    }
}

/// Every failure reaches the client as a bare 500; the details only go to the log.
impl ResponseError for SentimentError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!(error = %self, "request failed");
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body("Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn errors_map_to_generic_server_error() {
        let err = SentimentError::Tokenization("bad input".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = err.error_response().into_body().try_into_bytes().unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[test]
    fn display_includes_context() {
        let err = SentimentError::ModelFormat("expected 5 labels, found 2".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid model format: expected 5 labels, found 2"
        );
    }
}
