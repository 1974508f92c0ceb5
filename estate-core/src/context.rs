//! Request descriptors.
//!
//! A [`RequestContext`] describes one logical call to the backend. It is
//! threaded through the session client by value, so a retry re-sends exactly
//! the same method, path, query and body. The `retried` flag lives on the
//! context itself and guarantees at most one refresh-and-retry per call.

use crate::errors::{ApiError, Result};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// File name sent in the part's content disposition.
    pub file_name: String,
    /// Content type of the part.
    pub mime: mime::Mime,
    /// File contents.
    pub bytes: Bytes,
}

impl FilePart {
    /// Create a file part, guessing the content type from the extension.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime = mime_from_name(&file_name);
        Self {
            file_name,
            mime,
            bytes: bytes.into(),
        }
    }

    /// Override the content type.
    #[must_use]
    pub fn with_mime(mut self, mime: mime::Mime) -> Self {
        self.mime = mime;
        self
    }
}

fn mime_from_name(name: &str) -> mime::Mime {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Plain text field.
    Text(String),
    /// File field.
    File(FilePart),
}

/// Multipart form description.
///
/// This is a plain value rather than a transport form so it can be rebuilt
/// for the retried request. Repeated names are allowed and sent in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    /// Fields in insertion order.
    pub fields: Vec<(String, FormValue)>,
}

impl MultipartForm {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        self.fields.push((name.into(), FormValue::File(part)));
        self
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the form has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text values recorded under `name`.
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, v)| match v {
                FormValue::Text(s) => Some(s.as_str()),
                FormValue::File(_) => None,
            })
            .collect()
    }
}

/// Body of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document.
    Json(Value),
    /// Multipart form (uploads).
    Multipart(MultipartForm),
    /// A JSON body that failed to serialize. Sending it fails with
    /// [`ApiError::Encode`] before anything goes out.
    Invalid(String),
}

/// Description of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API root.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Bearer token to send instead of the stored access token.
    pub bearer: Option<String>,
    /// Set once the refresh-and-retry cycle has been used.
    pub retried: bool,
}

impl RequestContext {
    /// Create a context for `method` on `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            retried: false,
        }
    }

    /// `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// `PATCH` request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present.
    #[must_use]
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Append the `_t` cache-buster with the current time in milliseconds.
    #[must_use]
    pub fn cache_bust(self) -> Self {
        self.query("_t", chrono::Utc::now().timestamp_millis())
    }

    /// Set a JSON body.
    ///
    /// A value that fails to serialize is kept as [`RequestBody::Invalid`]
    /// and the send reports the error. Use [`try_json`](Self::try_json) to
    /// see it here instead.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(match serde_json::to_value(body) {
            Ok(value) => RequestBody::Json(value),
            Err(e) => RequestBody::Invalid(e.to_string()),
        });
        self
    }

    /// Set a JSON body, failing if it does not serialize.
    pub fn try_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::encode(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Set a multipart body.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// Authenticate with `token` instead of the stored access token.
    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Record that the refresh-and-retry cycle was used.
    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let ctx = RequestContext::get("/properties/")
            .query("city", "Sangrur")
            .query_opt("price__lte", Some(5_000_000u64))
            .query_opt::<u64>("price__gte", None);

        assert_eq!(ctx.method, Method::Get);
        assert_eq!(ctx.path, "/properties/");
        assert_eq!(
            ctx.query,
            vec![
                ("city".to_string(), "Sangrur".to_string()),
                ("price__lte".to_string(), "5000000".to_string()),
            ]
        );
        assert!(!ctx.retried);
        assert!(ctx.bearer.is_none());
    }

    #[test]
    fn test_json_body() {
        let ctx = RequestContext::post("/inquiries/").json(&json!({"property": 7}));
        assert_eq!(ctx.body, Some(RequestBody::Json(json!({"property": 7}))));
    }

    #[test]
    fn test_unserializable_json_body() {
        use std::collections::HashMap;

        let bad: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);

        let ctx = RequestContext::post("/properties/").json(&bad);
        assert!(matches!(ctx.body, Some(RequestBody::Invalid(ref msg)) if msg.contains("key")));

        let err = RequestContext::post("/properties/").try_json(&bad).unwrap_err();
        assert!(matches!(err, ApiError::Encode(_)));

        let ok = RequestContext::post("/inquiries/")
            .try_json(&json!({"property": 7}))
            .unwrap();
        assert_eq!(ok.body, Some(RequestBody::Json(json!({"property": 7}))));
    }

    #[test]
    fn test_cache_bust_adds_millis() {
        let ctx = RequestContext::get("/properties/favorites/").cache_bust();
        let (key, value) = &ctx.query[0];
        assert_eq!(key, "_t");
        assert!(value.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_mark_retried() {
        let mut ctx = RequestContext::delete("/properties/3/");
        ctx.mark_retried();
        assert!(ctx.retried);
    }

    #[test]
    fn test_multipart_form() {
        let form = MultipartForm::new()
            .text("amenities", "1")
            .text("amenities", "4")
            .file("uploaded_images", FilePart::new("front.JPG", vec![1u8, 2, 3]));

        assert_eq!(form.len(), 3);
        assert_eq!(form.texts("amenities"), vec!["1", "4"]);
        match &form.fields[2].1 {
            FormValue::File(part) => assert_eq!(part.mime, mime::IMAGE_JPEG),
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let part = FilePart::new("blob", Bytes::from_static(b"x"));
        assert_eq!(part.mime, mime::APPLICATION_OCTET_STREAM);
    }
}
