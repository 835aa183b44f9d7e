//! Thumbnail asset store.
//!
//! One canonical thumbnail image. The local file is the fast path for
//! reads during normal operation; the remote copy is authoritative for
//! restoration after a redeploy. The two may transiently diverge (a remote
//! push can fail after a successful local write) - reconciliation happens
//! at `restore_on_startup`, not continuously.

use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageOutputFormat};
use tracing::{info, warn};

use crate::database::RemoteStore;
use crate::database::models::ThumbnailDoc;

const THUMBNAILS_COLLECTION: &str = "thumbnails";
const THUMBNAIL_KEY: &str = "main_thumbnail";
const THUMBNAIL_FILE: &str = "default_thumb.jpg";

/// Telegram's thumbnail bounding box.
const BOUNDING_BOX: u32 = 320;
const JPEG_QUALITY: u8 = 85;

/// Failure to materialize a thumbnail locally.
///
/// Remote failures never show up here - the local file is the operation's
/// success criterion and the remote copy is best-effort.
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    /// The submitted bytes did not decode as an image.
    #[error("could not decode thumbnail image")]
    Decode(#[from] image::ImageError),

    /// The local file could not be written or removed.
    #[error("could not write thumbnail to disk")]
    Io(#[from] std::io::Error),
}

/// Store for the canonical thumbnail image.
pub struct ThumbnailStore {
    remote: RemoteStore,
    dir: PathBuf,
}

impl ThumbnailStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(remote: RemoteStore, dir: impl Into<PathBuf>) -> Self {
        Self {
            remote,
            dir: dir.into(),
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(THUMBNAIL_FILE)
    }

    /// Normalize `bytes` and persist the result.
    ///
    /// The image is converted to RGB, bounded to 320x320 and re-encoded as
    /// JPEG. The local file write decides the outcome; the remote push is
    /// best-effort and only logged on failure.
    pub async fn store(&self, bytes: &[u8]) -> Result<(), ThumbnailError> {
        let encoded = normalize(bytes)?;

        fs_err::create_dir_all(&self.dir)?;
        fs_err::write(self.path(), &encoded)?;

        let document = ThumbnailDoc::new(encoded);
        if !self
            .remote
            .replace(THUMBNAILS_COLLECTION, THUMBNAIL_KEY, &document)
            .await
        {
            warn!("Thumbnail saved locally but not propagated to remote store");
        }

        Ok(())
    }

    /// Local file path if a thumbnail exists. Never touches the network.
    pub fn retrieve_path(&self) -> Option<PathBuf> {
        let path = self.path();
        path.exists().then_some(path)
    }

    /// Materialize the local file from the remote copy after a redeploy.
    ///
    /// No local file plus no remote copy simply means no thumbnail - the
    /// asset is optional.
    pub async fn restore_on_startup(&self) {
        if self.path().exists() {
            return;
        }

        let Some(document) = self
            .remote
            .get::<ThumbnailDoc>(THUMBNAILS_COLLECTION, THUMBNAIL_KEY)
            .await
        else {
            return;
        };

        let written = fs_err::create_dir_all(&self.dir)
            .and_then(|()| fs_err::write(self.path(), document.data.bytes));
        match written {
            Ok(()) => info!("Restored thumbnail from remote store"),
            Err(e) => warn!("Could not restore thumbnail from remote store: {e}"),
        }
    }

    /// Remove the local file and issue a remote delete.
    ///
    /// Returns whether the local removal succeeded; removing an absent
    /// thumbnail is success, and the remote outcome is ignored.
    pub async fn delete(&self) -> bool {
        let path = self.path();
        if path.exists() {
            if let Err(e) = fs_err::remove_file(&path) {
                warn!("Could not delete thumbnail file: {e}");
                return false;
            }
        }

        self.remote.delete(THUMBNAILS_COLLECTION, THUMBNAIL_KEY).await;
        true
    }
}

/// Convert to RGB, bound to the Telegram box, re-encode as JPEG.
fn normalize(bytes: &[u8]) -> Result<Vec<u8>, ThumbnailError> {
    let image = image::load_from_memory(bytes)?;
    let image = DynamicImage::ImageRgb8(image.thumbnail(BOUNDING_BOX, BOUNDING_BOX).to_rgb8());

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageOutputFormat::Jpeg(JPEG_QUALITY))?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([200, 30, 30]),
        ));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    fn offline_store(dir: &std::path::Path) -> ThumbnailStore {
        ThumbnailStore::new(RemoteStore::disconnected(), dir)
    }

    #[tokio::test]
    async fn store_bounds_the_image_and_writes_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = offline_store(tmp.path());

        store.store(&sample_png(600, 400)).await.unwrap();

        let path = store.retrieve_path().expect("thumbnail file should exist");
        let (width, height) = image::open(&path).unwrap().dimensions();
        assert!(width <= 320);
        assert!(height <= 320);
        // Aspect ratio preserved: 600x400 scales to 320x213
        assert_eq!(width, 320);
    }

    #[tokio::test]
    async fn retrieve_path_is_absent_before_any_store() {
        let tmp = tempfile::tempdir().unwrap();
        let store = offline_store(tmp.path());

        assert_eq!(store.retrieve_path(), None);
    }

    #[tokio::test]
    async fn garbage_bytes_are_a_decode_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = offline_store(tmp.path());

        let result = store.store(b"not an image").await;
        assert!(matches!(result, Err(ThumbnailError::Decode(_))));
        assert_eq!(store.retrieve_path(), None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = offline_store(tmp.path());

        // Nothing stored yet: still success
        assert!(store.delete().await);

        store.store(&sample_png(100, 100)).await.unwrap();
        assert!(store.delete().await);
        assert_eq!(store.retrieve_path(), None);
        assert!(store.delete().await);
    }

    #[tokio::test]
    async fn restore_is_a_no_op_without_remote_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let store = offline_store(tmp.path());

        store.restore_on_startup().await;

        assert_eq!(store.retrieve_path(), None);
    }

    #[tokio::test]
    async fn small_images_stay_within_bounds() {
        let tmp = tempfile::tempdir().unwrap();
        let store = offline_store(tmp.path());

        store.store(&sample_png(64, 48)).await.unwrap();

        let (width, height) = image::open(store.retrieve_path().unwrap())
            .unwrap()
            .dimensions();
        assert!(width <= 320 && height <= 320);
    }
}
