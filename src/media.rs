//! Capture-image storage collaborator.
//!
//! The engine's only contract with media capture is "bytes + kind in,
//! stable reference out". References are paths relative to the media root,
//! served read-only under `/captures`.

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::warn;
use uuid::Uuid;

use crate::config;
use crate::db::CaptureKind;
use crate::modules::reservations::ReservationError;

/// Decodes an inline base64 image payload, tolerating a `data:` URL prefix.
pub fn decode_image(payload: &str) -> Result<Vec<u8>, ReservationError> {
    let raw = match payload.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => payload,
    };
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|_| ReservationError::Validation("Image payload is not valid base64".to_string()))?;
    if bytes.is_empty() {
        return Err(ReservationError::Validation(
            "Image payload is empty".to_string(),
        ));
    }
    Ok(bytes)
}

/// Writes the image under the media root and returns its reference.
pub async fn store_capture(
    guest_id: Uuid,
    kind: CaptureKind,
    bytes: &[u8],
) -> std::io::Result<String> {
    let reference = format!("{}/{}-{}.jpg", guest_id, kind.as_str(), Uuid::now_v7());
    let path = config::get().media.dir.join(&reference);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, bytes).await?;
    Ok(reference)
}

/// Best-effort removal of a superseded or orphaned image. The database row
/// is already gone; a leftover file is only disk noise, so failures are
/// logged and swallowed.
pub async fn remove_capture(reference: &str) {
    let path = config::get().media.dir.join(reference);
    if let Err(err) = tokio::fs::remove_file(&path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(reference, error = %err, "Failed to remove capture image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_plain_and_data_url_payloads() {
        let encoded = STANDARD.encode(b"fake-jpeg");
        assert_eq!(decode_image(&encoded).unwrap(), b"fake-jpeg");

        let data_url = format!("data:image/jpeg;base64,{encoded}");
        assert_eq!(decode_image(&data_url).unwrap(), b"fake-jpeg");
    }

    #[test]
    fn decode_rejects_garbage_and_empty_payloads() {
        assert!(decode_image("not base64!!!").is_err());
        assert!(decode_image("").is_err());
    }
}
