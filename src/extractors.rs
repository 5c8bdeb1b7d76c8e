use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::error_response;

/// JSON body extractor whose rejections use the service error body
///
/// Unknown fields, wrong types and malformed JSON all become a 400 with
/// `{"error": {"message", "status"}}` instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
            let content_type_str = content_type
                .to_str()
                .map_err(|_| ApiJsonRejection::InvalidContentType)?;

            // Media type without parameters such as charset
            let media_type = content_type_str
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_lowercase();

            if media_type != "application/json" {
                return Err(ApiJsonRejection::InvalidContentType);
            }
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiJsonRejection::JsonRejection(rejection)),
        }
    }
}

pub enum ApiJsonRejection {
    InvalidContentType,
    JsonRejection(JsonRejection),
}

impl ApiJsonRejection {
    pub fn to_response(&self) -> (StatusCode, Json<serde_json::Value>) {
        let message = match self {
            ApiJsonRejection::InvalidContentType => {
                "Content-Type must be application/json".to_string()
            }
            ApiJsonRejection::JsonRejection(rejection) => rejection.body_text(),
        };
        error_response(StatusCode::BAD_REQUEST, &message)
    }
}

impl IntoResponse for ApiJsonRejection {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}
