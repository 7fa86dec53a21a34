//! PEM certificate bundles → thumbprints.
//!
//! A thumbprint is the SHA-1 digest of a certificate's DER bytes, rendered
//! as uppercase hex. Only `CERTIFICATE` blocks are considered; any other PEM
//! block (keys, CRLs) in the bundle is skipped.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha1::{Digest, Sha1};

use crate::error::FetchError;

const BEGIN_CERT: &str = "-----BEGIN CERTIFICATE-----";
const END_CERT: &str = "-----END CERTIFICATE-----";

/// Uppercase hex SHA-1 of `der`, the form certificate stores display.
pub fn thumbprint(der: &[u8]) -> String {
    let mut h = Sha1::new();
    h.update(der);
    hex::encode_upper(h.finalize())
}

/// Decode every certificate block in `pem` and return its DER bytes.
pub fn certificates_from_pem(pem: &str) -> Result<Vec<Vec<u8>>, FetchError> {
    let mut certs = Vec::new();
    let mut body: Option<String> = None;

    for (idx, raw) in pem.lines().enumerate() {
        let line = raw.trim();
        if line == BEGIN_CERT {
            if body.is_some() {
                return Err(FetchError::Pem(format!(
                    "line {}: certificate block opened inside another",
                    idx + 1
                )));
            }
            body = Some(String::new());
            continue;
        }
        if line == END_CERT {
            if let Some(acc) = body.take() {
                let der = STANDARD.decode(acc.as_bytes()).map_err(|e| {
                    FetchError::Pem(format!("line {}: invalid base64: {e}", idx + 1))
                })?;
                certs.push(der);
            }
            continue;
        }
        if let Some(acc) = body.as_mut() {
            acc.push_str(line);
        }
    }

    if body.is_some() {
        return Err(FetchError::Pem("unterminated certificate block".to_string()));
    }
    Ok(certs)
}

/// Thumbprints of all certificates in `pem`, de-duplicated, in bundle order.
pub fn thumbprints_from_pem(pem: &str) -> Result<Vec<String>, FetchError> {
    let mut out: Vec<String> = Vec::new();
    for der in certificates_from_pem(pem)? {
        let tp = thumbprint(&der);
        if !out.contains(&tp) {
            out.push(tp);
        }
    }
    Ok(out)
}
