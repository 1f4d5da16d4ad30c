use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::json::{optional_in, string_at_paths, JsonObject, JsonObjectExt};

/// SDK versions below this major version default to the JSC engine.
const HERMES_DEFAULT_SDK_MAJOR: i64 = 48;

/// Device class used to pick between phone and tablet splash assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceIdiom {
    #[default]
    Phone,
    Tablet,
}

/// Read-only view over a manifest document.
///
/// Implementors only decide where identity fields live and which objects act
/// as the client-config and Expo Go config roots; every other accessor is
/// derived from those two roots.
pub trait Manifest {
    /// The document this manifest was constructed from.
    fn raw_manifest_json(&self) -> &JsonObject;

    /// A best-effort immutable legacy id, stable through project transfers.
    fn stable_legacy_id(&self) -> Result<&str>;

    /// Stable key used to scope client-side storage for this experience.
    fn scope_key(&self) -> Result<&str>;

    /// Stable UUID identifying the project on the hosting service.
    fn eas_project_id(&self) -> Result<Option<&str>>;

    fn sdk_version(&self) -> Result<Option<&str>>;

    /// URL of the JavaScript bundle to launch.
    fn bundle_url(&self) -> Result<&str>;

    fn expo_client_config_root_object(&self) -> Result<Option<&JsonObject>>;

    fn expo_go_config_root_object(&self) -> Result<Option<&JsonObject>>;

    /// The `id` of the document.
    ///
    /// Formatted as a UUID for bare and new manifests and as `@owner/slug` for
    /// legacy manifests, where it does not survive project transfers. Prefer
    /// [`Manifest::scope_key`] or [`Manifest::eas_project_id`] when a stable key
    /// is needed.
    fn legacy_id(&self) -> Result<&str> {
        self.raw_manifest_json().required("id")
    }

    fn revision_id(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "revisionId")
    }

    fn slug(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "slug")
    }

    fn app_key(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "appKey")
    }

    fn name(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "name")
    }

    fn version(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "version")
    }

    fn notification_preferences(&self) -> Result<Option<&JsonObject>> {
        optional_in(self.expo_client_config_root_object()?, "notification")
    }

    fn updates_info(&self) -> Result<Option<&JsonObject>> {
        optional_in(self.expo_client_config_root_object()?, "updates")
    }

    fn ios_config(&self) -> Result<Option<&JsonObject>> {
        optional_in(self.expo_client_config_root_object()?, "ios")
    }

    fn host_uri(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "hostUri")
    }

    fn orientation(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "orientation")
    }

    fn experiments(&self) -> Result<Option<&JsonObject>> {
        optional_in(self.expo_client_config_root_object()?, "experiments")
    }

    fn developer(&self) -> Result<Option<&JsonObject>> {
        optional_in(self.expo_go_config_root_object()?, "developer")
    }

    fn log_url(&self) -> Result<Option<&str>> {
        optional_in(self.expo_go_config_root_object()?, "logUrl")
    }

    fn facebook_app_id(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "facebookAppId")
    }

    fn facebook_application_name(&self) -> Result<Option<&str>> {
        optional_in(self.expo_client_config_root_object()?, "facebookDisplayName")
    }

    fn facebook_auto_init_enabled(&self) -> Result<bool> {
        Ok(
            optional_in(self.expo_client_config_root_object()?, "facebookAutoInitEnabled")?
                .unwrap_or(false),
        )
    }

    /// True only when a `developer` object exists and `packagerOpts.dev` is `true`.
    fn is_development_mode(&self) -> Result<bool> {
        let Some(root) = self.expo_go_config_root_object()? else {
            return Ok(false);
        };
        let Some(packager_opts) = root.optional::<&JsonObject>("packagerOpts")? else {
            return Ok(false);
        };
        let Some(dev) = packager_opts.get("dev") else {
            return Ok(false);
        };
        if self.developer()?.is_none() {
            return Ok(false);
        }
        Ok(dev.as_bool().unwrap_or(false))
    }

    fn is_development_silent_launch(&self) -> Result<bool> {
        let Some(root) = self.expo_go_config_root_object()? else {
            return Ok(false);
        };
        let Some(settings) = root.optional::<&JsonObject>("developmentClient")? else {
            return Ok(false);
        };
        Ok(settings
            .get("silentLaunch")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    fn is_using_developer_tool(&self) -> Result<bool> {
        Ok(self
            .developer()?
            .and_then(|developer| developer.get("tool"))
            .is_some_and(|tool| !tool.is_null()))
    }

    fn user_interface_style(&self) -> Result<Option<&str>> {
        ios_or_root(self, "userInterfaceStyle")
    }

    fn ios_or_root_background_color(&self) -> Result<Option<&str>> {
        ios_or_root(self, "backgroundColor")
    }

    fn ios_splash_background_color(&self) -> Result<Option<&str>> {
        Ok(self.expo_client_config_root_object()?.and_then(|root| {
            string_at_paths(
                root,
                &[&["ios", "splash", "backgroundColor"], &["splash", "backgroundColor"]],
            )
        }))
    }

    /// Splash image URL; tablets prefer `ios.splash.tabletImageUrl` when present.
    fn ios_splash_image_url(&self, idiom: DeviceIdiom) -> Result<Option<&str>> {
        let tablet_path: &[&str] = match idiom {
            DeviceIdiom::Tablet => &["ios", "splash", "tabletImageUrl"],
            DeviceIdiom::Phone => &[],
        };
        Ok(self.expo_client_config_root_object()?.and_then(|root| {
            string_at_paths(
                root,
                &[tablet_path, &["ios", "splash", "imageUrl"], &["splash", "imageUrl"]],
            )
        }))
    }

    fn ios_splash_image_resize_mode(&self) -> Result<Option<&str>> {
        Ok(self.expo_client_config_root_object()?.and_then(|root| {
            string_at_paths(
                root,
                &[&["ios", "splash", "resizeMode"], &["splash", "resizeMode"]],
            )
        }))
    }

    fn ios_google_services_file(&self) -> Result<Option<&str>> {
        optional_in(self.ios_config()?, "googleServicesFile")
    }

    fn supports_rtl(&self) -> Result<bool> {
        let extra: Option<&JsonObject> =
            optional_in(self.expo_client_config_root_object()?, "extra")?;
        Ok(optional_in(extra, "supportsRTL")?.unwrap_or(false))
    }

    /// Configured JS engine, falling back to a default derived from the SDK version.
    fn js_engine(&self) -> Result<&str> {
        let configured = self
            .expo_client_config_root_object()?
            .and_then(|root| string_at_paths(root, &[&["ios", "jsEngine"], &["jsEngine"]]));
        if let Some(engine) = configured {
            return Ok(engine);
        }

        let major = sdk_major_version(self.sdk_version()?);
        let engine = if major > 0 && major < HERMES_DEFAULT_SDK_MAJOR {
            "jsc"
        } else {
            "hermes"
        };
        debug!(target: "manifests", sdk_major = major, engine, "js engine not configured; using default");
        Ok(engine)
    }
}

fn ios_or_root<'a, M: Manifest + ?Sized>(manifest: &'a M, key: &str) -> Result<Option<&'a str>> {
    if let Some(value) = optional_in(manifest.ios_config()?, key)? {
        return Ok(Some(value));
    }
    optional_in(manifest.expo_client_config_root_object()?, key)
}

/// Major component of an `x.y.z` SDK version; anything else counts as 0.
fn sdk_major_version(sdk_version: Option<&str>) -> i64 {
    let Some(sdk_version) = sdk_version else {
        return 0;
    };
    let components: Vec<&str> = sdk_version.split('.').collect();
    if components.len() != 3 {
        return 0;
    }
    components[0].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::sdk_major_version;

    #[test]
    fn sdk_major_version_requires_three_components() {
        assert_eq!(sdk_major_version(Some("39.0.0")), 39);
        assert_eq!(sdk_major_version(Some("48.1.0")), 48);
        assert_eq!(sdk_major_version(Some("39.0")), 0);
        assert_eq!(sdk_major_version(Some("UNVERSIONED")), 0);
        assert_eq!(sdk_major_version(Some("x.0.0")), 0);
        assert_eq!(sdk_major_version(None), 0);
    }
}
