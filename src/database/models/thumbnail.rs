//! Thumbnail binary document.

use mongodb::bson::Binary;
use mongodb::bson::spec::BinarySubtype;
use serde::{Deserialize, Serialize};

/// The remote copy of the canonical thumbnail, keyed `"main_thumbnail"`
/// in the `thumbnails` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailDoc {
    /// Normalized JPEG bytes.
    pub data: Binary,
}

impl ThumbnailDoc {
    /// Wrap already-normalized JPEG bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            },
        }
    }
}
