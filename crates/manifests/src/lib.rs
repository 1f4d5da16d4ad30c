//! Read-only, typed views over update manifest documents.
//!
//! A manifest arrives as a JSON object in one of three shapes: bare (embedded
//! in a self-hosted build), legacy (classic update service) or new (modern
//! updates protocol). Each shape implements [`Manifest`], which exposes the
//! same client-config derived fields regardless of where the shape keeps that
//! configuration. Accessors never mutate the document and report malformed
//! input through [`ManifestError`] instead of panicking.
//!
//! ```ignore
//! use manifests::{AnyManifest, DeviceIdiom, Manifest};
//!
//! # fn demo(bytes: &[u8]) -> manifests::Result<()> {
//! let manifest = AnyManifest::from_slice(bytes)?;
//! println!("{} -> {}", manifest.scope_key()?, manifest.bundle_url()?);
//! if let Some(splash) = manifest.ios_splash_image_url(DeviceIdiom::Phone)? {
//!     println!("splash image at {splash}");
//! }
//! # Ok(())
//! # }
//! ```

mod bare;
mod error;
mod factory;
mod json;
mod legacy;
mod manifest;
mod new;

pub use bare::BareManifest;
pub use error::{ManifestError, Result};
pub use factory::{AnyManifest, ManifestKind};
pub use json::{string_at_paths, JsonField, JsonObject, JsonObjectExt};
pub use legacy::{BaseLegacyManifest, LegacyManifest};
pub use manifest::{DeviceIdiom, Manifest};
pub use new::NewManifest;
