use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ManifestError, Result};
use crate::json::{optional_in, JsonObject, JsonObjectExt};
use crate::manifest::Manifest;

const UNVERSIONED_RUNTIME: &str = "exposdk:UNVERSIONED";
const UNVERSIONED_SDK: &str = "UNVERSIONED";

static SDK_RUNTIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^exposdk:(\d+\.\d+\.\d+)$").expect("sdk runtime version pattern is valid")
});

/// Manifest in the modern updates protocol shape.
///
/// Client and Expo Go configuration live under `extra.expoClient` and
/// `extra.expoGo` instead of at the document root.
#[derive(Debug, Clone, PartialEq)]
pub struct NewManifest {
    raw: JsonObject,
}

impl NewManifest {
    pub fn new(raw: JsonObject) -> Self {
        Self { raw }
    }

    pub fn raw_id(&self) -> Result<&str> {
        self.raw.required("id")
    }

    pub fn created_at(&self) -> Result<&str> {
        self.raw.required("createdAt")
    }

    pub fn runtime_version(&self) -> Result<&str> {
        self.raw.required("runtimeVersion")
    }

    pub fn launch_asset(&self) -> Result<&JsonObject> {
        self.raw.required("launchAsset")
    }

    /// Asset descriptors; every element must be an object.
    pub fn assets(&self) -> Result<Option<Vec<&JsonObject>>> {
        let Some(assets) = self.raw.optional::<&[Value]>("assets")? else {
            return Ok(None);
        };
        assets
            .iter()
            .map(|asset| {
                asset
                    .as_object()
                    .ok_or_else(|| ManifestError::incorrect_type("assets", "array of objects"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn extra(&self) -> Result<Option<&JsonObject>> {
        self.raw.optional("extra")
    }

    pub(crate) fn into_raw(self) -> JsonObject {
        self.raw
    }
}

impl From<JsonObject> for NewManifest {
    fn from(raw: JsonObject) -> Self {
        Self::new(raw)
    }
}

impl Manifest for NewManifest {
    fn raw_manifest_json(&self) -> &JsonObject {
        &self.raw
    }

    fn stable_legacy_id(&self) -> Result<&str> {
        self.raw_id()
    }

    fn scope_key(&self) -> Result<&str> {
        let extra: &JsonObject = self.raw.required("extra")?;
        extra.required("scopeKey")
    }

    fn eas_project_id(&self) -> Result<Option<&str>> {
        let eas: Option<&JsonObject> = optional_in(self.extra()?, "eas")?;
        optional_in(eas, "projectId")
    }

    /// SDK version encoded in an `exposdk:x.y.z` runtime version, if any.
    fn sdk_version(&self) -> Result<Option<&str>> {
        let runtime_version = self.runtime_version()?;
        if runtime_version == UNVERSIONED_RUNTIME {
            return Ok(Some(UNVERSIONED_SDK));
        }
        Ok(SDK_RUNTIME_PATTERN
            .captures(runtime_version)
            .and_then(|captures| captures.get(1))
            .map(|version| version.as_str()))
    }

    fn bundle_url(&self) -> Result<&str> {
        self.launch_asset()?.required("url")
    }

    fn expo_client_config_root_object(&self) -> Result<Option<&JsonObject>> {
        optional_in(self.extra()?, "expoClient")
    }

    fn expo_go_config_root_object(&self) -> Result<Option<&JsonObject>> {
        optional_in(self.extra()?, "expoGo")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DeviceIdiom;
    use serde_json::json;

    const BUNDLE_URL: &str = "https://classic-assets.eascdn.net/%40esamelson%2Fnative-component-list%2F39.0.0%2F01c86fd863cfee878068eebd40f165df-39.0.0-ios.js";

    fn new_manifest(value: Value) -> NewManifest {
        match value {
            Value::Object(raw) => NewManifest::new(raw),
            other => panic!("expected object, got {other}"),
        }
    }

    fn with_runtime_version(runtime_version: &str) -> NewManifest {
        new_manifest(json!({ "runtimeVersion": runtime_version }))
    }

    #[test]
    fn reads_new_manifest_fields() {
        let manifest = new_manifest(json!({
            "runtimeVersion": "1",
            "id": "0eef8214-4833-4089-9dff-b4138a14f196",
            "createdAt": "2020-11-11T00:17:54.797Z",
            "launchAsset": { "url": BUNDLE_URL, "contentType": "application/javascript" },
        }));

        assert_eq!(manifest.raw_id().unwrap(), "0eef8214-4833-4089-9dff-b4138a14f196");
        assert_eq!(manifest.created_at().unwrap(), "2020-11-11T00:17:54.797Z");
        assert_eq!(manifest.runtime_version().unwrap(), "1");
        assert_eq!(
            Value::Object(manifest.launch_asset().unwrap().clone()),
            json!({ "url": BUNDLE_URL, "contentType": "application/javascript" })
        );
        assert!(manifest.assets().unwrap().is_none());
        assert_eq!(manifest.bundle_url().unwrap(), BUNDLE_URL);
        assert_eq!(manifest.legacy_id().unwrap(), "0eef8214-4833-4089-9dff-b4138a14f196");
        assert_eq!(manifest.stable_legacy_id().unwrap(), "0eef8214-4833-4089-9dff-b4138a14f196");
        assert!(manifest.sdk_version().unwrap().is_none());
        assert!(manifest.scope_key().unwrap_err().is_missing_field());
        assert_eq!(manifest.js_engine().unwrap(), "hermes");
    }

    #[test]
    fn sdk_version_from_numeric_runtime_version() {
        assert_eq!(with_runtime_version("exposdk:39.0.0").sdk_version().unwrap(), Some("39.0.0"));
    }

    #[test]
    fn sdk_version_from_unversioned_runtime_version() {
        assert_eq!(
            with_runtime_version("exposdk:UNVERSIONED").sdk_version().unwrap(),
            Some("UNVERSIONED")
        );
    }

    #[test]
    fn sdk_version_absent_for_non_sdk_runtime_versions() {
        for runtime_version in [
            "exposdk:123",
            "exposdkd:39.0.0",
            "exposdk:hello",
            "bexposdk:39.0.0",
            "exposdk:39.0.0-beta.0",
            "exposdk:39.0.0-alpha.256",
        ] {
            assert_eq!(
                with_runtime_version(runtime_version).sdk_version().unwrap(),
                None,
                "{runtime_version}"
            );
        }
    }

    #[test]
    fn config_roots_live_under_extra() {
        let manifest = new_manifest(json!({
            "id": "0eef8214-4833-4089-9dff-b4138a14f196",
            "runtimeVersion": "exposdk:45.0.0",
            "launchAsset": { "url": BUNDLE_URL },
            "name": "ignored at the document root",
            "extra": {
                "scopeKey": "@owner/app",
                "eas": { "projectId": "6a3c3d4f-2b59-4b1f-9e86-1f3b0f7ab7c2" },
                "expoClient": {
                    "name": "Native Component List",
                    "ios": { "jsEngine": "hermes", "splash": { "imageUrl": "https://example.com/s.png" } },
                    "facebookAutoInitEnabled": true,
                },
                "expoGo": {
                    "developer": { "tool": "expo-cli" },
                    "packagerOpts": { "dev": false },
                    "developmentClient": { "silentLaunch": true },
                    "logUrl": "http://localhost:8081/logs",
                },
            },
        }));

        assert_eq!(manifest.scope_key().unwrap(), "@owner/app");
        assert_eq!(
            manifest.eas_project_id().unwrap(),
            Some("6a3c3d4f-2b59-4b1f-9e86-1f3b0f7ab7c2")
        );
        assert_eq!(manifest.sdk_version().unwrap(), Some("45.0.0"));
        assert_eq!(manifest.name().unwrap(), Some("Native Component List"));
        assert_eq!(manifest.js_engine().unwrap(), "hermes");
        assert_eq!(
            manifest.ios_splash_image_url(DeviceIdiom::Tablet).unwrap(),
            Some("https://example.com/s.png")
        );
        assert!(manifest.facebook_auto_init_enabled().unwrap());
        assert!(!manifest.is_development_mode().unwrap());
        assert!(manifest.is_development_silent_launch().unwrap());
        assert!(manifest.is_using_developer_tool().unwrap());
        assert_eq!(manifest.log_url().unwrap(), Some("http://localhost:8081/logs"));
    }

    #[test]
    fn sdk_version_below_48_defaults_to_jsc() {
        let manifest = new_manifest(json!({
            "runtimeVersion": "exposdk:47.0.0",
            "extra": { "expoClient": { "name": "app" } },
        }));
        assert_eq!(manifest.js_engine().unwrap(), "jsc");
    }

    #[test]
    fn assets_must_be_objects() {
        let manifest = new_manifest(json!({
            "runtimeVersion": "1",
            "assets": [{ "key": "a" }, "not-an-object"],
        }));
        assert!(manifest.assets().unwrap_err().is_incorrect_type());
    }
}
