//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  /// The model cannot be called at all (no API key).
  #[error("{0}")]
  Unavailable(String),

  /// The model call failed or its reply was unusable.
  #[error("{message}")]
  Analysis { message: String, raw: Option<String> },

  /// A remote page could not be fetched.
  #[error("upstream error: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"veritas\""),
        );
        return res;
      }
      ApiError::Analysis { message, raw: Some(raw) } => {
        (StatusCode::BAD_GATEWAY, json!({ "error": message, "raw": raw }))
      }
      ApiError::Analysis { message, raw: None } => {
        (StatusCode::BAD_GATEWAY, json!({ "error": message }))
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": m })),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, json!({ "error": m })),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() })),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": m })),
    };
    (status, Json(body)).into_response()
  }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl ApiError {
  /// Wrap a backend error. Backends that report with [`veritas_core::Error`]
  /// get its status mapping, so a vanished session is a 404 rather than a 500.
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
    match boxed.downcast::<veritas_core::Error>() {
      Ok(core) => (*core).into(),
      Err(other) => ApiError::Store(other),
    }
  }
}

impl From<veritas_core::Error> for ApiError {
  fn from(e: veritas_core::Error) -> Self {
    use veritas_core::Error as E;
    match e {
      E::SessionNotFound(_) | E::RecordNotFound(_) => ApiError::NotFound(e.to_string()),
      E::UnknownExportFormat(_) => ApiError::BadRequest(e.to_string()),
      other => ApiError::Internal(other.to_string()),
    }
  }
}

impl From<veritas_model::Error> for ApiError {
  fn from(e: veritas_model::Error) -> Self {
    match e {
      veritas_model::Error::MissingApiKey => ApiError::Unavailable(e.to_string()),
      other => ApiError::Analysis {
        raw:     other.raw_reply().map(str::to_string),
        message: other.to_string(),
      },
    }
  }
}

impl From<veritas_ingest::Error> for ApiError {
  fn from(e: veritas_ingest::Error) -> Self {
    if e.is_bad_input() {
      ApiError::BadRequest(e.to_string())
    } else {
      ApiError::Upstream(e.to_string())
    }
  }
}

#[cfg(test)]
mod tests {
  use veritas_model::ReplyError;

  use super::*;

  #[test]
  fn model_errors_map_to_gateway_statuses() {
    let missing: ApiError = veritas_model::Error::MissingApiKey.into();
    assert_eq!(missing.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

    let invalid: ApiError = veritas_model::Error::InvalidReply {
      reason: ReplyError::NoJson,
      raw:    "nope".into(),
    }
    .into();
    assert!(matches!(&invalid, ApiError::Analysis { raw: Some(r), .. } if r == "nope"));
    assert_eq!(invalid.into_response().status(), StatusCode::BAD_GATEWAY);
  }

  #[test]
  fn ingest_errors_split_on_blame() {
    let blank: ApiError = veritas_ingest::Error::EmptyText.into();
    assert_eq!(blank.into_response().status(), StatusCode::BAD_REQUEST);

    let remote: ApiError = veritas_ingest::Error::HttpStatus {
      status: 500,
      url:    "https://x.example".into(),
    }
    .into();
    assert_eq!(remote.into_response().status(), StatusCode::BAD_GATEWAY);
  }

  #[derive(Debug, thiserror::Error)]
  #[error("disk on fire")]
  struct OtherBackend;

  #[test]
  fn store_errors_keep_core_statuses() {
    let gone = ApiError::from_store(veritas_core::Error::SessionNotFound(uuid::Uuid::nil()));
    assert!(matches!(gone, ApiError::NotFound(_)));
    assert_eq!(gone.into_response().status(), StatusCode::NOT_FOUND);

    let other = ApiError::from_store(OtherBackend);
    assert!(matches!(other, ApiError::Store(_)));
    assert_eq!(other.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
