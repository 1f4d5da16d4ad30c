use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::bare::BareManifest;
use crate::error::{ManifestError, Result};
use crate::json::JsonObject;
use crate::legacy::LegacyManifest;
use crate::manifest::Manifest;
use crate::new::NewManifest;

/// The document shapes a manifest can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Bare,
    Legacy,
    New,
}

impl ManifestKind {
    /// Guess the shape from the keys present in the document.
    pub fn detect(raw: &JsonObject) -> Self {
        if raw.contains_key("launchAsset") {
            ManifestKind::New
        } else if raw.contains_key("releaseId") {
            ManifestKind::Legacy
        } else {
            ManifestKind::Bare
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::Bare => "bare",
            ManifestKind::Legacy => "legacy",
            ManifestKind::New => "new",
        }
    }
}

/// Any of the concrete manifest shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyManifest {
    Bare(BareManifest),
    Legacy(LegacyManifest),
    New(NewManifest),
}

impl AnyManifest {
    /// Wrap `raw` as the given shape without inspecting it.
    pub fn with_kind(kind: ManifestKind, raw: JsonObject) -> Self {
        match kind {
            ManifestKind::Bare => AnyManifest::Bare(BareManifest::new(raw)),
            ManifestKind::Legacy => AnyManifest::Legacy(LegacyManifest::new(raw)),
            ManifestKind::New => AnyManifest::New(NewManifest::new(raw)),
        }
    }

    /// Wrap a parsed JSON document, detecting its shape.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(raw) = value else {
            return Err(ManifestError::NotAnObject);
        };
        let kind = ManifestKind::detect(&raw);
        debug!(target: "manifests", kind = kind.as_str(), "detected manifest shape");
        Ok(Self::with_kind(kind, raw))
    }

    /// Decode a UTF-8 JSON document and wrap it, detecting its shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_json(serde_json::from_slice(bytes)?)
    }

    pub fn kind(&self) -> ManifestKind {
        match self {
            AnyManifest::Bare(_) => ManifestKind::Bare,
            AnyManifest::Legacy(_) => ManifestKind::Legacy,
            AnyManifest::New(_) => ManifestKind::New,
        }
    }

    pub fn as_manifest(&self) -> &dyn Manifest {
        match self {
            AnyManifest::Bare(manifest) => manifest,
            AnyManifest::Legacy(manifest) => manifest,
            AnyManifest::New(manifest) => manifest,
        }
    }

    /// Give back the wrapped document.
    pub fn into_raw(self) -> JsonObject {
        match self {
            AnyManifest::Bare(manifest) => manifest.into_raw(),
            AnyManifest::Legacy(manifest) => manifest.into_raw(),
            AnyManifest::New(manifest) => manifest.into_raw(),
        }
    }
}

impl From<BareManifest> for AnyManifest {
    fn from(manifest: BareManifest) -> Self {
        AnyManifest::Bare(manifest)
    }
}

impl From<LegacyManifest> for AnyManifest {
    fn from(manifest: LegacyManifest) -> Self {
        AnyManifest::Legacy(manifest)
    }
}

impl From<NewManifest> for AnyManifest {
    fn from(manifest: NewManifest) -> Self {
        AnyManifest::New(manifest)
    }
}

impl TryFrom<Value> for AnyManifest {
    type Error = ManifestError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(value)
    }
}

impl Manifest for AnyManifest {
    fn raw_manifest_json(&self) -> &JsonObject {
        self.as_manifest().raw_manifest_json()
    }

    fn stable_legacy_id(&self) -> Result<&str> {
        self.as_manifest().stable_legacy_id()
    }

    fn scope_key(&self) -> Result<&str> {
        self.as_manifest().scope_key()
    }

    fn eas_project_id(&self) -> Result<Option<&str>> {
        self.as_manifest().eas_project_id()
    }

    fn sdk_version(&self) -> Result<Option<&str>> {
        self.as_manifest().sdk_version()
    }

    fn bundle_url(&self) -> Result<&str> {
        self.as_manifest().bundle_url()
    }

    fn expo_client_config_root_object(&self) -> Result<Option<&JsonObject>> {
        self.as_manifest().expo_client_config_root_object()
    }

    fn expo_go_config_root_object(&self) -> Result<Option<&JsonObject>> {
        self.as_manifest().expo_go_config_root_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_shape_from_keys() {
        let new = AnyManifest::from_json(json!({
            "id": "0eef8214-4833-4089-9dff-b4138a14f196",
            "runtimeVersion": "1",
            "launchAsset": { "url": "https://example.com/bundle.js" },
        }))
        .unwrap();
        assert_eq!(new.kind(), ManifestKind::New);
        assert_eq!(new.bundle_url().unwrap(), "https://example.com/bundle.js");

        let legacy = AnyManifest::from_json(json!({
            "id": "@owner/app",
            "releaseId": "0eef8214-4833-4089-9dff-b4138a14f196",
        }))
        .unwrap();
        assert_eq!(legacy.kind(), ManifestKind::Legacy);

        let bare = AnyManifest::from_json(json!({ "id": "x", "commitTime": 1 })).unwrap();
        assert_eq!(bare.kind(), ManifestKind::Bare);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(matches!(
            AnyManifest::from_json(json!(["not", "an", "object"])),
            Err(ManifestError::NotAnObject)
        ));
        assert!(matches!(
            AnyManifest::from_slice(b"{not json"),
            Err(ManifestError::Decode(_))
        ));
    }

    #[test]
    fn into_raw_returns_the_original_document() {
        let document = json!({ "id": "x", "commitTime": 1, "metadata": { "branch": "main" } });
        let manifest = AnyManifest::try_from(document.clone()).unwrap();
        assert_eq!(Value::Object(manifest.into_raw()), document);
    }
}
