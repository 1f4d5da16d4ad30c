use crate::error::Result;
use crate::json::{JsonObject, JsonObjectExt};
use crate::legacy::BaseLegacyManifest;
use crate::manifest::Manifest;
use serde_json::Value;

/// Manifest embedded in a bare (self-hosted native) application build.
#[derive(Debug, Clone, PartialEq)]
pub struct BareManifest {
    base: BaseLegacyManifest,
}

impl BareManifest {
    pub fn new(raw: JsonObject) -> Self {
        Self {
            base: BaseLegacyManifest::new(raw),
        }
    }

    pub fn base(&self) -> &BaseLegacyManifest {
        &self.base
    }

    pub fn raw_id(&self) -> Result<&str> {
        self.raw_manifest_json().required("id")
    }

    /// Commit time in milliseconds since the Unix epoch.
    pub fn commit_time_number(&self) -> Result<i64> {
        self.raw_manifest_json().required("commitTime")
    }

    pub fn metadata(&self) -> Result<Option<&JsonObject>> {
        self.raw_manifest_json().optional("metadata")
    }

    pub fn assets(&self) -> Result<Option<&[Value]>> {
        self.base.assets()
    }

    pub(crate) fn into_raw(self) -> JsonObject {
        self.base.into_raw()
    }
}

impl From<JsonObject> for BareManifest {
    fn from(raw: JsonObject) -> Self {
        Self::new(raw)
    }
}

impl Manifest for BareManifest {
    fn raw_manifest_json(&self) -> &JsonObject {
        self.base.raw_manifest_json()
    }

    fn stable_legacy_id(&self) -> Result<&str> {
        self.raw_id()
    }

    fn scope_key(&self) -> Result<&str> {
        self.base.scope_key_or(|| self.stable_legacy_id())
    }

    // Bare builds are not tied to a hosted project or an SDK release.
    fn eas_project_id(&self) -> Result<Option<&str>> {
        Ok(None)
    }

    fn sdk_version(&self) -> Result<Option<&str>> {
        Ok(None)
    }

    fn bundle_url(&self) -> Result<&str> {
        self.base.bundle_url()
    }

    fn expo_client_config_root_object(&self) -> Result<Option<&JsonObject>> {
        self.base.expo_client_config_root_object()
    }

    fn expo_go_config_root_object(&self) -> Result<Option<&JsonObject>> {
        self.base.expo_go_config_root_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bare(value: Value) -> BareManifest {
        match value {
            Value::Object(raw) => BareManifest::new(raw),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn reads_bare_identity_fields() {
        let manifest = bare(json!({
            "id": "0eef8214-4833-4089-9dff-b4138a14f196",
            "commitTime": 1609975977832_i64,
        }));

        assert_eq!(manifest.raw_id().unwrap(), "0eef8214-4833-4089-9dff-b4138a14f196");
        assert_eq!(manifest.commit_time_number().unwrap(), 1609975977832);
        assert!(manifest.metadata().unwrap().is_none());
        assert_eq!(manifest.stable_legacy_id().unwrap(), manifest.raw_id().unwrap());
        assert_eq!(manifest.scope_key().unwrap(), manifest.raw_id().unwrap());
        assert!(manifest.eas_project_id().unwrap().is_none());
        assert!(manifest.sdk_version().unwrap().is_none());
        assert_eq!(manifest.js_engine().unwrap(), "hermes");
    }

    #[test]
    fn bundle_url_is_a_required_field() {
        let manifest = bare(json!({ "id": "0eef8214-4833-4089-9dff-b4138a14f196" }));
        assert!(manifest.bundle_url().unwrap_err().is_missing_field());
        assert!(manifest.commit_time_number().unwrap_err().is_missing_field());
    }

    #[test]
    fn commit_time_must_be_an_integer() {
        let manifest = bare(json!({
            "id": "0eef8214-4833-4089-9dff-b4138a14f196",
            "commitTime": "2021-01-06T23:32:57.832Z",
            "scopeKey": "@bare/app",
        }));
        assert!(manifest.commit_time_number().unwrap_err().is_incorrect_type());
        assert_eq!(manifest.scope_key().unwrap(), "@bare/app");
    }
}
