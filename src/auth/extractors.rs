use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::error::AppError;

/// Header carrying the caller's user id.
pub const SHARER_HEADER: &str = "X-Sharer-User-Id";

/// Reads and validates the caller id from `X-Sharer-User-Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SharerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SHARER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("missing caller id header");
                AppError::Validation(format!("missing {SHARER_HEADER} header"))
            })?;

        let id = raw.trim().parse::<i64>().map_err(|_| {
            warn!(value = %raw, "non-numeric caller id");
            AppError::Validation(format!("{SHARER_HEADER} must be a number"))
        })?;

        if id <= 0 {
            return Err(AppError::Validation(format!(
                "{SHARER_HEADER} must be positive"
            )));
        }

        Ok(SharerId(id))
    }
}
