//! Stored video reference encoding.
//!
//! A committed upload is recorded as a single opaque string composed of two
//! comma-separated parts, `<bucket>,<key>`. The structured two-field record
//! below is the in-process representation; the wire/at-rest format stays
//! byte-compatible with existing stored data.

use crate::error::AppError;

/// Structured (bucket, key) pair behind the `bucket,key` encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVideoReference {
    pub bucket: String,
    pub key: String,
}

impl StoredVideoReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        StoredVideoReference {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse the `bucket,key` wire format.
    ///
    /// Anything other than exactly two non-empty comma-separated parts is
    /// rejected; a malformed reference must fail here rather than produce a
    /// malformed signed URL downstream.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut parts = raw.splitn(3, ',');
        let bucket = parts.next().unwrap_or_default();
        let key = parts.next().ok_or_else(|| {
            AppError::InvalidReference(format!("missing comma separator: {}", raw))
        })?;
        if parts.next().is_some() {
            return Err(AppError::InvalidReference(format!(
                "more than two comma-separated parts: {}",
                raw
            )));
        }
        if bucket.is_empty() || key.is_empty() {
            return Err(AppError::InvalidReference(format!(
                "empty bucket or key: {}",
                raw
            )));
        }
        Ok(StoredVideoReference::new(bucket, key))
    }

    /// Encode to the `bucket,key` wire format.
    pub fn encode(&self) -> String {
        format!("{},{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_reference() {
        let r = StoredVideoReference::parse("reelvault-media,landscape/abc123.mp4").unwrap();
        assert_eq!(r.bucket, "reelvault-media");
        assert_eq!(r.key, "landscape/abc123.mp4");
    }

    #[test]
    fn test_encode_round_trip() {
        let r = StoredVideoReference::new("bucket", "portrait/xyz.mp4");
        assert_eq!(
            StoredVideoReference::parse(&r.encode()).unwrap(),
            r
        );
    }

    #[test]
    fn test_parse_rejects_missing_comma() {
        let err = StoredVideoReference::parse("no-comma-here").unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));
    }

    #[test]
    fn test_parse_rejects_extra_parts() {
        let err = StoredVideoReference::parse("bucket,key,extra").unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(StoredVideoReference::parse(",key").is_err());
        assert!(StoredVideoReference::parse("bucket,").is_err());
        assert!(StoredVideoReference::parse(",").is_err());
        assert!(StoredVideoReference::parse("").is_err());
    }
}
