use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Closed set of thumbnail widths generated for every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThumbnailSize {
    W500,
    W250,
    W100,
}

impl ThumbnailSize {
    pub const ALL: [ThumbnailSize; 3] = [
        ThumbnailSize::W500,
        ThumbnailSize::W250,
        ThumbnailSize::W100,
    ];

    pub fn width(self) -> u32 {
        match self {
            ThumbnailSize::W500 => 500,
            ThumbnailSize::W250 => 250,
            ThumbnailSize::W100 => 100,
        }
    }

    /// Maps a `?size=` query value to a known size. Anything else is `None`.
    pub fn from_query(value: &str) -> Option<Self> {
        match value.trim() {
            "500" => Some(ThumbnailSize::W500),
            "250" => Some(ThumbnailSize::W250),
            "100" => Some(ThumbnailSize::W100),
            _ => None,
        }
    }
}

impl Display for ThumbnailSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.width())
    }
}
