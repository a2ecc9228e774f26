// handlers/form.rs - content form extractor
//
// Admin create/update endpoints accept the same fields as multipart forms
// (with an optional `image` file), urlencoded forms or JSON objects. All of
// them are flattened to text fields before validation.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde_json::Value;

use crate::database::models::Fields;
use crate::error::ApiError;
use crate::storage::Upload;

/// Form field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct ContentForm {
    pub fields: Fields,
    pub image: Option<Upload>,
}

#[async_trait]
impl<S> FromRequest<S> for ContentForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| body_rejection(e.status(), e.body_text(), ApiError::bad_request))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| body_rejection(e.status(), e.body_text(), ApiError::invalid_json))?;
            Self::from_json(value)
        } else {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| body_rejection(e.status(), e.body_text(), ApiError::bad_request))?;
            Ok(Self { fields, image: None })
        }
    }
}

impl ContentForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = ContentForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD && field.file_name().is_some() {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // An empty file input still sends a part
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }

    fn from_json(value: Value) -> Result<Self, ApiError> {
        let Value::Object(map) = value else {
            return Err(ApiError::invalid_json("Expected a JSON object"));
        };

        let fields = map
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    // Arrays stay JSON text so tag lists parse as JSON
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect();

        Ok(Self { fields, image: None })
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    body_rejection(err.status(), err.body_text(), ApiError::bad_request)
}

/// Bodies over the request limit stay 413 whatever the content type.
pub(crate) fn body_rejection(status: StatusCode, message: String, otherwise: fn(String) -> ApiError) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(message)
    } else {
        otherwise(message)
    }
}
