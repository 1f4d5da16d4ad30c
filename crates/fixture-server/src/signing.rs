//! Detached RSA-SHA256 signatures for staged update payloads.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{FixtureServerError, Result};
use crate::state::SignedPart;
use crate::structured_field::StringDictionary;

/// Key identifier advertised next to every signature.
pub const KEY_ID: &str = "main";

/// Where the signing key lives relative to a project directory.
pub fn private_key_path(key_dir: &Path) -> PathBuf {
    key_dir.join("keys").join("private-key.pem")
}

/// Read the PEM encoded private key stored under `key_dir`.
pub async fn load_private_key(key_dir: &Path) -> Result<RsaPrivateKey> {
    let path = private_key_path(key_dir);
    let pem = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| FixtureServerError::KeyRead { path, source })?;
    parse_private_key(&pem)
}

/// Accepts both PKCS#8 (`PRIVATE KEY`) and PKCS#1 (`RSA PRIVATE KEY`) PEM.
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    if pem.contains("BEGIN RSA PRIVATE KEY") {
        RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|err| FixtureServerError::KeyParse(err.to_string()))
    } else {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|err| FixtureServerError::KeyParse(err.to_string()))
    }
}

/// PKCS#1 v1.5 signature over the SHA-256 digest of `data`, base64 encoded.
pub fn sign_rsa_sha256(data: &[u8], key: &RsaPrivateKey) -> Result<String> {
    let digest = Sha256::digest(data);
    let signature = key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)?;
    Ok(general_purpose::STANDARD.encode(signature))
}

/// `expo-signature` header value carrying `signature` and the key id.
pub fn signature_header(signature: &str) -> Result<String> {
    StringDictionary::new()
        .insert("sig", signature)
        .insert("keyid", KEY_ID)
        .serialize()
}

/// Render `payload` to its JSON string form and sign exactly those bytes.
pub fn sign_payload(payload: &Value, key: &RsaPrivateKey) -> Result<SignedPart> {
    let body = serde_json::to_string(payload)?;
    let signature = sign_rsa_sha256(body.as_bytes(), key)?;
    Ok(SignedPart {
        signature: signature_header(&signature)?,
        body,
    })
}
