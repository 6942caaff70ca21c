// ABOUTME: BSON (de)serialization helpers shared by the document-backend repositories
// ABOUTME: Entities keep their natural field names; `_id` is injected/stripped at the boundary

use bson::Document;
use registry_core::AppError;
use registry_core::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize `value` to a BSON document and set `_id` to `id`.
pub fn to_document_with_id<T: Serialize>(value: &T, id: &str) -> AppResult<Document> {
    let mut doc = bson::to_document(value)
        .map_err(|e| AppError::unexpected(format!("bson encode error: {e}")))?;
    doc.insert("_id", id);
    Ok(doc)
}

/// Deserialize a BSON document fetched from a collection back into `T`,
/// ignoring the injected `_id` field.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> AppResult<T> {
    bson::from_document(doc).map_err(|e| AppError::unexpected(format!("bson decode error: {e}")))
}
