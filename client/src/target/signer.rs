//! API key request signing
//!
//! The controller authenticates API key requests by an ECDSA P-256 signature
//! over the method, URL, timestamp and content hash of the request.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use jsonwebtoken::{Algorithm, EncodingKey};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Request;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::errors::DeployError;

/// DER prefix of a P-256 `SubjectPublicKeyInfo`, up to the uncompressed point
const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08, 0x2a,
    0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

/// Signs requests with an API key
pub struct RequestSigner {
    private_key_pem: SecretString,
    public_key_pem: String,
}

impl RequestSigner {
    /// Create a signer from a PKCS#8 PEM encoded EC private key.
    ///
    /// The public key sent along with each request is taken from the private key.
    pub fn new(private_key_pem: SecretString) -> Result<Self, DeployError> {
        encoding_key(&private_key_pem)?;
        let public_key_pem = public_key_pem(&private_key_pem)?;
        Ok(Self {
            private_key_pem,
            public_key_pem,
        })
    }

    /// PEM encoded public half of the API key
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    /// Sign the request with the given key id
    pub fn sign(&self, request: &mut Request, key_id: &str) -> Result<(), DeployError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.sign_at(request, key_id, &timestamp)
    }

    pub(crate) fn sign_at(&self, request: &mut Request, key_id: &str, timestamp: &str) -> Result<(), DeployError> {
        let body: &[u8] = match request.body() {
            None => &[],
            Some(body) => body.as_bytes().ok_or_else(|| {
                DeployError::Signing("cannot sign a streaming request body".to_string())
            })?,
        };
        let content_hash = STANDARD.encode(Sha256::digest(body));
        let message = format!(
            "{}\n{}\n{}\n{}",
            request.method(),
            request.url(),
            timestamp,
            content_hash
        );

        let key = encoding_key(&self.private_key_pem)?;
        let jws_signature = jsonwebtoken::crypto::sign(message.as_bytes(), &key, Algorithm::ES256)
            .map_err(|e| DeployError::Signing(e.to_string()))?;
        let raw_signature = URL_SAFE_NO_PAD
            .decode(jws_signature)
            .map_err(|e| DeployError::Signing(e.to_string()))?;
        let signature = STANDARD.encode(der_signature(&raw_signature)?);

        let headers = request.headers_mut();
        insert_header(headers, "X-Timestamp", timestamp)?;
        insert_header(headers, "X-Content-Hash", &content_hash)?;
        insert_header(headers, "X-Key-Id", key_id)?;
        insert_header(headers, "X-Key", &STANDARD.encode(&self.public_key_pem))?;
        insert_header(headers, "X-Authorization", &signature)?;
        Ok(())
    }
}

fn encoding_key(pem: &SecretString) -> Result<EncodingKey, DeployError> {
    EncodingKey::from_ec_pem(pem.expose_secret().as_bytes())
        .map_err(|e| DeployError::Signing(format!("invalid API key: {}", e)))
}

/// Derive the public key PEM from the point embedded in a PKCS#8 EC private key
fn public_key_pem(private_key_pem: &SecretString) -> Result<String, DeployError> {
    let body: String = private_key_pem
        .expose_secret()
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .map(str::trim)
        .collect();
    let pkcs8 = STANDARD
        .decode(body)
        .map_err(|e| DeployError::Signing(format!("invalid API key: {}", e)))?;
    let point = embedded_public_point(&pkcs8).ok_or_else(|| {
        DeployError::Signing("invalid API key: no public key embedded in private key".to_string())
    })?;

    let mut spki = P256_SPKI_PREFIX.to_vec();
    spki.extend_from_slice(point);
    let encoded = STANDARD.encode(spki);

    let mut pem = String::from("-----BEGIN PUBLIC KEY-----\n");
    for line in encoded.as_bytes().chunks(64) {
        pem.push_str(&String::from_utf8_lossy(line));
        pem.push('\n');
    }
    pem.push_str("-----END PUBLIC KEY-----\n");
    Ok(pem)
}

/// Uncompressed P-256 point from the `publicKey` field of the inner `ECPrivateKey`
fn embedded_public_point(pkcs8: &[u8]) -> Option<&[u8]> {
    // PrivateKeyInfo: SEQUENCE { version, algorithm, privateKey OCTET STRING }
    let (_, info, _) = der_element(pkcs8)?;
    let (_, _, rest) = der_element(info)?;
    let (_, _, rest) = der_element(rest)?;
    let (tag, private_key, _) = der_element(rest)?;
    if tag != 0x04 {
        return None;
    }

    // ECPrivateKey: SEQUENCE { version, privateKey, [0] parameters, [1] publicKey }
    let (_, mut fields, _) = der_element(private_key)?;
    while !fields.is_empty() {
        let (tag, contents, rest) = der_element(fields)?;
        if tag == 0xa1 {
            let (tag, bits, _) = der_element(contents)?;
            return match bits {
                [0x00, point @ ..] if tag == 0x03 && point.len() == 65 && point[0] == 0x04 => Some(point),
                _ => None,
            };
        }
        fields = rest;
    }
    None
}

/// Split one DER element into its tag, contents and the bytes following it
fn der_element(data: &[u8]) -> Option<(u8, &[u8], &[u8])> {
    let tag = *data.first()?;
    let first = *data.get(1)? as usize;
    let (len, header) = if first < 0x80 {
        (first, 2)
    } else {
        let octets = first & 0x7f;
        if octets == 0 || octets > 2 {
            return None;
        }
        let len = data
            .get(2..2 + octets)?
            .iter()
            .fold(0usize, |len, &b| len << 8 | b as usize);
        (len, 2 + octets)
    };
    let contents = data.get(header..header + len)?;
    Some((tag, contents, &data[header + len..]))
}

fn insert_header(
    headers: &mut reqwest::header::HeaderMap,
    name: &'static str,
    value: &str,
) -> Result<(), DeployError> {
    let invalid = |e: &dyn std::fmt::Display| DeployError::Signing(format!("invalid {} header: {}", name, e));
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(&e))?;
    let value = HeaderValue::from_str(value).map_err(|e| invalid(&e))?;
    headers.insert(header_name, value);
    Ok(())
}

/// Convert a fixed size `r || s` signature to ASN.1 DER
pub(crate) fn der_signature(raw: &[u8]) -> Result<Vec<u8>, DeployError> {
    if raw.len() != 64 {
        return Err(DeployError::Signing(format!(
            "unexpected signature length {}",
            raw.len()
        )));
    }
    let (r, s) = raw.split_at(32);
    let r = der_integer(r);
    let s = der_integer(s);

    let mut der = Vec::with_capacity(2 + r.len() + s.len());
    der.push(0x30);
    der.push((r.len() + s.len()) as u8);
    der.extend_from_slice(&r);
    der.extend_from_slice(&s);
    Ok(der)
}

fn der_integer(bytes: &[u8]) -> Vec<u8> {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let bytes = &bytes[first..];
    let pad = bytes[0] & 0x80 != 0;

    let mut out = Vec::with_capacity(bytes.len() + 3);
    out.push(0x02);
    out.push((bytes.len() + pad as usize) as u8);
    if pad {
        out.push(0x00);
    }
    out.extend_from_slice(bytes);
    out
}
