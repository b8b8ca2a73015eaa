//! Attestation service client and response types.
//!
//! After a burn reaches finality on its source chain, Circle's attestation
//! service signs the message hash. The relay pipeline polls this API until
//! the signature is available.

use alloy_primitives::{hex, hex::FromHex, Bytes, FixedBytes};
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument, trace};

use crate::error::{PathwayError, Result};
use crate::spans;

/// Represents the response from the attestation service.
///
/// **API Quirk**: the service sometimes returns the string `"PENDING"` for
/// the attestation field instead of `null` when the attestation is not yet
/// ready. The deserializer treats that case as `None`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    pub status: AttestationStatus,
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

/// Represents the status of the attestation.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}

/// Custom deserializer for the attestation field.
///
/// Handles the following cases:
/// - Valid hex string (with or without "0x") → `Some(Bytes)`
/// - "PENDING" or "pending" → `None`
/// - null, missing field, or empty string → `None`
/// - Invalid hex → error
fn deserialize_optional_bytes_or_pending<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

/// HTTP client for Circle's attestation service.
#[derive(Debug, Clone)]
pub struct AttestationClient {
    base_url: String,
    client: reqwest::Client,
}

impl AttestationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Client for the production environment.
    pub fn production() -> Self {
        Self::new("https://iris-api.circle.com")
    }

    /// Client for the sandbox (testnet) environment.
    pub fn sandbox() -> Self {
        Self::new("https://iris-api-sandbox.circle.com")
    }

    fn attestation_url(&self, message_hash: FixedBytes<32>) -> String {
        format!(
            "{}/v1/attestations/0x{}",
            self.base_url,
            hex::encode(message_hash)
        )
    }

    /// Fetch the attestation for a message hash.
    ///
    /// Returns [`PathwayError::AttestationNotReady`] while the service has
    /// not signed yet (404 or a pending status), and
    /// [`PathwayError::RateLimited`] on 429 so callers can back off.
    #[instrument(skip(self), fields(message_hash = %hex::encode(message_hash)))]
    pub async fn attestation(&self, message_hash: FixedBytes<32>) -> Result<Bytes> {
        let url = self.attestation_url(message_hash);
        trace!(url = %url, "Requesting attestation");

        let request_span = spans::attestation_request(&url);
        let request_guard = request_span.enter();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(PathwayError::Network)?;
        drop(request_guard);

        let status_code = response.status();
        trace!(status_code = %status_code, "Received attestation service response");

        if status_code == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(300);

            debug!(retry_after_seconds = retry_after, "Rate limit exceeded");
            return Err(PathwayError::RateLimited {
                retry_after_seconds: retry_after,
            });
        }

        // 404 means the service has not seen the message hash yet.
        if status_code == reqwest::StatusCode::NOT_FOUND {
            debug!("Attestation not found");
            return Err(PathwayError::AttestationNotReady);
        }

        response.error_for_status_ref()?;

        let parsed: AttestationResponse = response.json().await.map_err(PathwayError::Network)?;
        debug!(status = ?parsed.status, "Attestation response parsed");

        match (parsed.status, parsed.attestation) {
            (AttestationStatus::Complete, Some(attestation)) => Ok(attestation),
            (AttestationStatus::Complete, None) => {
                spans::record_error_with_context(
                    "AttestationFailed",
                    "complete status with empty attestation",
                    None,
                );
                Err(PathwayError::AttestationFailed {
                    reason: "service reported complete but returned no attestation".to_string(),
                })
            }
            (AttestationStatus::Failed, _) => Err(PathwayError::AttestationFailed {
                reason: "service reported failed status".to_string(),
            }),
            (AttestationStatus::Pending | AttestationStatus::PendingConfirmations, _) => {
                Err(PathwayError::AttestationNotReady)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_attestation_with_valid_hex() {
        let json = r#"{"status":"complete","attestation":"0x1234abcd"}"#;
        let response: AttestationResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.status, AttestationStatus::Complete);
        assert_eq!(
            response.attestation.unwrap().to_vec(),
            vec![0x12, 0x34, 0xab, 0xcd]
        );
    }

    #[test]
    fn deserialize_attestation_with_pending_string() {
        let json = r#"{"status":"pending","attestation":"PENDING"}"#;
        let response: AttestationResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.status, AttestationStatus::Pending);
        assert!(response.attestation.is_none());
    }

    #[test]
    fn deserialize_attestation_with_null_or_missing() {
        for json in [
            r#"{"status":"pending","attestation":null}"#,
            r#"{"status":"pending"}"#,
            r#"{"status":"pending","attestation":""}"#,
        ] {
            let response: AttestationResponse = serde_json::from_str(json).unwrap();
            assert!(response.attestation.is_none());
        }
    }

    #[test]
    fn deserialize_attestation_with_invalid_hex_fails() {
        let json = r#"{"status":"complete","attestation":"not_valid_hex"}"#;
        assert!(serde_json::from_str::<AttestationResponse>(json).is_err());
    }

    #[test]
    fn deserialize_all_status_variants() {
        for (json, expected) in [
            (r#"{"status":"complete"}"#, AttestationStatus::Complete),
            (r#"{"status":"pending"}"#, AttestationStatus::Pending),
            (
                r#"{"status":"pending_confirmations"}"#,
                AttestationStatus::PendingConfirmations,
            ),
            (r#"{"status":"failed"}"#, AttestationStatus::Failed),
        ] {
            assert_eq!(
                serde_json::from_str::<AttestationResponse>(json)
                    .unwrap()
                    .status,
                expected
            );
        }
    }

    #[test]
    fn attestation_url_has_hex_prefix() {
        let client = AttestationClient::sandbox();
        let url = client.attestation_url(FixedBytes::from([0xabu8; 32]));
        assert_eq!(
            url,
            format!(
                "https://iris-api-sandbox.circle.com/v1/attestations/0x{}",
                "ab".repeat(32)
            )
        );
    }
}
