//! Downloader (§4.5, first half): streaming fetch + integrity verification.

use futures::StreamExt;

use crate::error::{IntegrityError, NetworkError};

const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Fetch `download_url`, verifying the received bytes against `expected`
/// integrity before returning them. Never returns partial bytes on
/// mismatch — the caller must not write anything to the extraction
/// directory until this succeeds.
pub async fn fetch_and_verify(
    client: &reqwest::Client,
    name: &str,
    download_url: &str,
    expected_integrity: &str,
) -> Result<Vec<u8>, DownloadError> {
    let response = client
        .get(download_url)
        .timeout(std::time::Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|source| {
            DownloadError::Network(NetworkError::Request {
                url: download_url.to_string(),
                source,
            })
        })?;

    if !response.status().is_success() {
        return Err(DownloadError::BadStatus(response.status().as_u16()));
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| {
            DownloadError::Network(NetworkError::Request {
                url: download_url.to_string(),
                source,
            })
        })?;
        bytes.extend_from_slice(&chunk);
    }

    crate::integrity::verify(name, expected_integrity, &bytes)
        .map_err(DownloadError::Integrity)?;

    Ok(bytes)
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("download returned unexpected status {0}")]
    BadStatus(u16),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_mismatch_is_fatal() {
        let bytes = b"not the real tarball";
        let err = crate::integrity::verify("pkg", "sha512-bogus", bytes).unwrap_err();
        assert!(matches!(err, IntegrityError::Mismatch { .. }));
    }
}
