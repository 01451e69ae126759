//! Orientation-partitioned object key generation.
//!
//! Key format: `{orientation}/{token}.{extension}` — the orientation prefix
//! partitions storage, the token carries 32 bytes of CSPRNG entropy encoded
//! base64 URL-safe without padding, and the extension is derived from the
//! media type's subtype.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::traits::{StorageError, StorageResult};
use reelvault_core::models::Orientation;

/// The single accepted container/codec combination.
pub const ACCEPTED_MEDIA_TYPE: &str = "video/mp4";

const TOKEN_BYTES: usize = 32;

/// Generate a storage key for an uploaded video.
///
/// Keys are not idempotent by design: each call produces a distinct random
/// token, so re-uploads never overwrite a previously stored object.
pub fn video_object_key(media_type: &str, orientation: Orientation) -> StorageResult<String> {
    if media_type != ACCEPTED_MEDIA_TYPE {
        return Err(StorageError::UnsupportedMediaType(media_type.to_string()));
    }
    let extension = media_type
        .split('/')
        .nth(1)
        .ok_or_else(|| StorageError::UnsupportedMediaType(media_type.to_string()))?;

    let mut raw = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut raw)
        .map_err(|e| StorageError::BackendError(format!("CSPRNG failure: {}", e)))?;
    let token = URL_SAFE_NO_PAD.encode(raw);

    Ok(format!("{}/{}.{}", orientation, token, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let key = video_object_key("video/mp4", Orientation::Landscape).unwrap();
        let (prefix, rest) = key.split_once('/').unwrap();
        assert_eq!(prefix, "landscape");
        let (token, extension) = rest.rsplit_once('.').unwrap();
        assert_eq!(extension, "mp4");
        // 32 bytes -> 43 base64 chars without padding.
        assert_eq!(token.len(), 43);
        assert!(!token.contains('='));
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_keys_are_partitioned_by_orientation() {
        for (orientation, prefix) in [
            (Orientation::Landscape, "landscape/"),
            (Orientation::Portrait, "portrait/"),
            (Orientation::Other, "other/"),
        ] {
            let key = video_object_key("video/mp4", orientation).unwrap();
            assert!(key.starts_with(prefix));
        }
    }

    #[test]
    fn test_keys_are_not_idempotent() {
        let a = video_object_key("video/mp4", Orientation::Other).unwrap();
        let b = video_object_key("video/mp4", Orientation::Other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_everything_but_mp4() {
        for media_type in [
            "video/webm",
            "video/quicktime",
            "image/png",
            "application/octet-stream",
            "video/mp4; codecs=avc1",
            "VIDEO/MP4",
            "",
        ] {
            let err = video_object_key(media_type, Orientation::Landscape).unwrap_err();
            assert!(
                matches!(err, StorageError::UnsupportedMediaType(_)),
                "expected UnsupportedMediaType for {:?}",
                media_type
            );
        }
    }
}
