use std::collections::{BTreeMap, VecDeque};

use axum::http::{HeaderMap, Method, Uri};
use serde::Serialize;
use serde_json::Value;

/// An inbound `/update` request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lower-cased; repeated headers are joined with `", "`.
    pub headers: BTreeMap<String, String>,
}

impl RecordedRequest {
    pub(crate) fn capture(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let mut recorded: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            recorded
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self {
            method: method.as_str().to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: recorded,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A JSON body together with the `expo-signature` header value that signs it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedPart {
    pub body: String,
    pub signature: String,
}

/// Parts staged for the next `/update` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedMultipart {
    pub manifest: Option<SignedPart>,
    pub directive: Option<SignedPart>,
}

impl StagedMultipart {
    pub fn is_empty(&self) -> bool {
        self.manifest.is_none() && self.directive.is_none()
    }
}

/// Everything the server records or serves. Cleared wholesale on stop.
#[derive(Debug, Default)]
pub(crate) struct FixtureState {
    pub messages: VecDeque<Value>,
    pub log_entries: Vec<Value>,
    pub responses_to_serve: VecDeque<Value>,
    pub update_request: Option<RecordedRequest>,
    pub multipart: StagedMultipart,
    pub requested_static_files: Vec<String>,
}

impl FixtureState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
