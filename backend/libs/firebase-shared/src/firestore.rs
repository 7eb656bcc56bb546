use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::auth::TokenSource;
use crate::errors::FirebaseError;

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// Typed Firestore field value as returned by the REST API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(serde_json::Value),
    MapValue(serde_json::Value),
}

/// A Firestore document snapshot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl Document {
    /// String field lookup; fields of any other type read as absent
    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.fields.get(field)? {
            Value::StringValue(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Read-only Cloud Firestore REST client
pub struct FirestoreClient {
    pub project_id: String,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
    http_client: reqwest::Client,
}

impl FirestoreClient {
    pub fn new(
        project_id: String,
        token_source: Arc<dyn TokenSource>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            project_id,
            base_url: FIRESTORE_BASE_URL.to_string(),
            token_source,
            http_client,
        }
    }

    /// Point the client at another API host (emulator, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `collection` may be a nested path such as `tenants/t1/users`;
    /// each of its segments is escaped on its own
    fn document_url(&self, collection: &str, document_id: &str) -> String {
        let collection_path = collection
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url,
            self.project_id,
            collection_path,
            urlencoding::encode(document_id)
        )
    }

    /// Fetch `collection/document_id`; `Ok(None)` when it does not exist
    pub async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<Document>, FirebaseError> {
        let access_token = self.token_source.access_token().await?;

        let response = self
            .http_client
            .get(self.document_url(collection, document_id))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| FirebaseError::FirestoreRequestError(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => {
                let error_text = response.text().await.unwrap_or_default();
                if is_missing_document(&error_text) {
                    tracing::debug!(collection, document_id, "document not found");
                    Ok(None)
                } else {
                    // Missing database or project, not a missing document
                    Err(FirebaseError::FirestoreApiError(
                        reqwest::StatusCode::NOT_FOUND.to_string(),
                        error_text,
                    ))
                }
            }
            status if status.is_success() => {
                let document: Document = response
                    .json()
                    .await
                    .map_err(|e| FirebaseError::FirestoreRequestError(e.to_string()))?;
                Ok(Some(document))
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(FirebaseError::FirestoreApiError(status.to_string(), error_text))
            }
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorStatus,
}

#[derive(Deserialize)]
struct ApiErrorStatus {
    #[serde(default)]
    message: String,
}

/// Firestore answers 404 both for an absent document and for an absent
/// database; only the former names the document in its message.
fn is_missing_document(error_text: &str) -> bool {
    serde_json::from_str::<ApiErrorBody>(error_text)
        .map(|body| body.error.message.starts_with("Document "))
        .unwrap_or(false)
}
