use serde_json::Value;

use crate::error::Result;
use crate::json::{JsonObject, JsonObjectExt};
use crate::manifest::Manifest;

/// Shared behavior of the document shapes whose client config lives at the
/// document root (bare and legacy manifests).
#[derive(Debug, Clone, PartialEq)]
pub struct BaseLegacyManifest {
    raw: JsonObject,
}

impl BaseLegacyManifest {
    pub fn new(raw: JsonObject) -> Self {
        Self { raw }
    }

    pub fn assets(&self) -> Result<Option<&[Value]>> {
        self.raw.optional("assets")
    }

    /// Document `scopeKey`, or `fallback` when the document does not carry one.
    pub(crate) fn scope_key_or<'a>(
        &'a self,
        fallback: impl FnOnce() -> Result<&'a str>,
    ) -> Result<&'a str> {
        match self.raw.optional("scopeKey")? {
            Some(scope_key) => Ok(scope_key),
            None => fallback(),
        }
    }

    pub(crate) fn into_raw(self) -> JsonObject {
        self.raw
    }
}

impl From<JsonObject> for BaseLegacyManifest {
    fn from(raw: JsonObject) -> Self {
        Self::new(raw)
    }
}

impl Manifest for BaseLegacyManifest {
    fn raw_manifest_json(&self) -> &JsonObject {
        &self.raw
    }

    fn stable_legacy_id(&self) -> Result<&str> {
        match self.raw.optional("originalFullName")? {
            Some(full_name) => Ok(full_name),
            None => self.legacy_id(),
        }
    }

    fn scope_key(&self) -> Result<&str> {
        self.scope_key_or(|| self.stable_legacy_id())
    }

    fn eas_project_id(&self) -> Result<Option<&str>> {
        self.raw.optional("projectId")
    }

    fn sdk_version(&self) -> Result<Option<&str>> {
        self.raw.optional("sdkVersion")
    }

    fn bundle_url(&self) -> Result<&str> {
        self.raw.required("bundleUrl")
    }

    fn expo_client_config_root_object(&self) -> Result<Option<&JsonObject>> {
        Ok(Some(&self.raw))
    }

    fn expo_go_config_root_object(&self) -> Result<Option<&JsonObject>> {
        Ok(Some(&self.raw))
    }
}

/// Manifest served by the classic (pre-EAS) update service.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyManifest {
    base: BaseLegacyManifest,
}

impl LegacyManifest {
    pub fn new(raw: JsonObject) -> Self {
        Self {
            base: BaseLegacyManifest::new(raw),
        }
    }

    pub fn base(&self) -> &BaseLegacyManifest {
        &self.base
    }

    pub fn release_id(&self) -> Result<&str> {
        self.base.raw.required("releaseId")
    }

    /// Commit time as the ISO-8601 string the service publishes.
    pub fn commit_time(&self) -> Result<&str> {
        self.base.raw.required("commitTime")
    }

    pub fn bundled_assets(&self) -> Result<Option<&[Value]>> {
        self.base.raw.optional("bundledAssets")
    }

    /// Untyped: legacy documents carry either a string or a policy object here.
    pub fn runtime_version(&self) -> Option<&Value> {
        self.base.raw.get("runtimeVersion").filter(|value| !value.is_null())
    }

    pub fn bundle_key(&self) -> Result<Option<&str>> {
        self.base.raw.optional("bundleKey")
    }

    pub fn asset_url_override(&self) -> Result<Option<&str>> {
        self.base.raw.optional("assetUrlOverride")
    }

    pub fn assets(&self) -> Result<Option<&[Value]>> {
        self.base.assets()
    }

    pub(crate) fn into_raw(self) -> JsonObject {
        self.base.into_raw()
    }
}

impl From<JsonObject> for LegacyManifest {
    fn from(raw: JsonObject) -> Self {
        Self::new(raw)
    }
}

impl Manifest for LegacyManifest {
    fn raw_manifest_json(&self) -> &JsonObject {
        self.base.raw_manifest_json()
    }

    fn stable_legacy_id(&self) -> Result<&str> {
        self.base.stable_legacy_id()
    }

    fn scope_key(&self) -> Result<&str> {
        self.base.scope_key()
    }

    fn eas_project_id(&self) -> Result<Option<&str>> {
        self.base.eas_project_id()
    }

    fn sdk_version(&self) -> Result<Option<&str>> {
        self.base.sdk_version()
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
