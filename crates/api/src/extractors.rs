//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use school_common::AppError;
use school_core::PageRequest;
use serde::{Deserialize, de::DeserializeOwned};

/// JSON body whose rejections render as the common error envelope.
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}

/// `?page=&limit=&includeInactive=` of the list endpoints.
///
/// Inactive rows are listed unless the caller opts out.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub include_inactive: Option<bool>,
}

impl ListQuery {
    /// Page request with defaults applied and bounds clamped.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }

    #[must_use]
    pub fn include_inactive(&self) -> bool {
        self.include_inactive.unwrap_or(true)
    }
}
