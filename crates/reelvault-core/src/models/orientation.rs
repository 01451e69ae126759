use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

// Reference ratios under truncating integer division: 16/9 == 1, 9/16 == 0.
const WIDE_RATIO: u32 = 16 / 9;
const TALL_RATIO: u32 = 9 / 16;

/// Frame orientation derived from decoded stream geometry.
///
/// Never trusted from client-supplied metadata; always computed from the
/// width/height the probe tool reports. Used as the storage key prefix so
/// objects are partitioned by orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify from stream geometry using truncating integer division.
    ///
    /// The truncated ratio `width / height` is compared against 16:9 and
    /// 9:16 computed with the same truncating arithmetic, so 4:3 and other
    /// moderately wide geometries collapse into `Landscape` and every
    /// taller-than-wide geometry, no matter how tall, truncates to 0 and
    /// classifies as `Portrait`. Square and degenerate frames are `Other`.
    pub fn classify(width: u32, height: u32) -> Orientation {
        if width == 0 || height == 0 || width == height {
            return Orientation::Other;
        }
        match width / height {
            WIDE_RATIO => Orientation::Landscape,
            TALL_RATIO => Orientation::Portrait,
            _ => Orientation::Other,
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Orientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            "other" => Ok(Orientation::Other),
            _ => Err(anyhow::anyhow!("Invalid orientation: {}", s)),
        }
    }
}
