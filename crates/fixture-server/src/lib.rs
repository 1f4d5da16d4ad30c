//! HTTP test double for an update-distribution endpoint.
//!
//! The server records whatever clients send to its `/notify`, `/post` and
//! `/log` endpoints, tracks files fetched from `/static`, and answers `/update`
//! with a `multipart/mixed` body holding an RSA-SHA256 signed manifest and/or
//! directive staged by the test driver. Waits are cooperative polls that fail
//! with a timeout or, if the server is stopped underneath them, with a distinct
//! stopped error.
//!
//! ```ignore
//! use std::time::Duration;
//! use fixture_server::{FixtureServer, FixtureServerConfig};
//! use serde_json::json;
//!
//! # async fn demo(project_dir: &std::path::Path) -> fixture_server::Result<()> {
//! let server = FixtureServer::new(FixtureServerConfig::default());
//! let addr = server.start(0).await?;
//! server
//!     .serve_signed_manifest(&json!({ "id": "update-1" }), project_dir)
//!     .await?;
//!
//! // ... point the client at http://{addr}/update ...
//! let request = server.wait_for_update_request(Duration::from_secs(5)).await?;
//! println!("client sent {:?}", request.header("expo-runtime-version"));
//! server.stop().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod multipart;
mod server;
mod signing;
mod state;
mod structured_field;

pub use config::FixtureServerConfig;
pub use error::{FixtureServerError, Result};
pub use multipart::{render as render_multipart, MultipartBody};
pub use server::FixtureServer;
pub use signing::{
    load_private_key, parse_private_key, private_key_path, sign_payload, sign_rsa_sha256,
    signature_header, KEY_ID,
};
pub use state::{RecordedRequest, SignedPart, StagedMultipart};
pub use structured_field::StringDictionary;
