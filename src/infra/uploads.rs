//! Filesystem storage for uploaded files, partitioned by bucket.

use std::error::Error as StdError;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::{StreamExt, pin_mut, stream};
use sha2::{Digest, Sha256};
use slug::slugify;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::domain::types::FileBucket;

#[derive(Debug, Error)]
pub enum UploadStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("uploaded file stream failed")]
    PayloadStream {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("uploaded file is empty")]
    EmptyPayload,
    #[error("uploaded file size exceeds supported range")]
    SizeOverflow,
}

/// Metadata of a payload written to disk.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub bucket: FileBucket,
    pub stored_path: String,
    pub content_type: String,
    pub checksum: String,
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

#[derive(Debug)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Root the storage at `root`, creating it and one directory per bucket.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        for bucket in [FileBucket::ProductImages, FileBucket::Public] {
            std::fs::create_dir_all(root.join(bucket.as_str()))?;
        }
        Ok(Self { root })
    }

    /// Stream a payload into `bucket` under a folder named after `scope`
    /// (a brand id, or the uploader when no brand is given).
    pub async fn store_stream<S>(
        &self,
        bucket: FileBucket,
        scope: Uuid,
        original_name: &str,
        stream: S,
    ) -> Result<StoredUpload, UploadStorageError>
    where
        S: futures::Stream<Item = Result<Bytes, UploadStorageError>>,
    {
        let stored_path = build_stored_path(bucket, scope, original_name);
        let absolute = self.resolve(&stored_path)?;

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        let mut hasher = Sha256::new();
        let mut head: Vec<u8> = Vec::new();
        let mut total_bytes: u64 = 0;

        pin_mut!(stream);
        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(err) => {
                    drop(file);
                    let _ = fs::remove_file(&absolute).await;
                    return Err(err);
                }
            };
            if chunk.is_empty() {
                continue;
            }

            total_bytes = total_bytes
                .checked_add(chunk.len() as u64)
                .ok_or(UploadStorageError::SizeOverflow)?;
            if head.len() < PROBE_BYTES {
                let take = (PROBE_BYTES - head.len()).min(chunk.len());
                head.extend_from_slice(&chunk[..take]);
            }
            file.write_all(&chunk).await?;
            hasher.update(&chunk);
        }

        file.flush().await?;

        if total_bytes == 0 {
            drop(file);
            let _ = fs::remove_file(&absolute).await;
            return Err(UploadStorageError::EmptyPayload);
        }

        let size_bytes =
            i64::try_from(total_bytes).map_err(|_| UploadStorageError::SizeOverflow)?;
        let content_type = mime_guess::from_path(&stored_path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let (width, height) = probe_dimensions(&content_type, &head);

        Ok(StoredUpload {
            bucket,
            stored_path,
            content_type,
            checksum: hex::encode(hasher.finalize()),
            size_bytes,
            width,
            height,
        })
    }

    pub async fn store(
        &self,
        bucket: FileBucket,
        scope: Uuid,
        original_name: &str,
        data: Bytes,
    ) -> Result<StoredUpload, UploadStorageError> {
        let stream = stream::once(async move { Ok::<_, UploadStorageError>(data) });
        self.store_stream(bucket, scope, original_name, stream).await
    }

    pub async fn read(&self, stored_path: &str) -> Result<Bytes, UploadStorageError> {
        let absolute = self.resolve(stored_path)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    /// Remove the stored payload. Missing files are treated as success.
    pub async fn delete(&self, stored_path: &str) -> Result<(), UploadStorageError> {
        let absolute = self.resolve(stored_path)?;
        match fs::remove_file(&absolute).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(UploadStorageError::Io(err)),
        }
    }

    fn resolve(&self, stored_path: &str) -> Result<PathBuf, UploadStorageError> {
        let relative = Path::new(stored_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(UploadStorageError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }
}

const PROBE_BYTES: usize = 64 * 1024;

fn build_stored_path(bucket: FileBucket, scope: Uuid, original_name: &str) -> String {
    let identifier = Uuid::new_v4();
    let filename = sanitize_filename(original_name);
    format!("{}/{scope}/{identifier}-{filename}", bucket.as_str())
}

fn probe_dimensions(content_type: &str, head: &[u8]) -> (Option<i32>, Option<i32>) {
    if !content_type.starts_with("image/") {
        return (None, None);
    }
    match imagesize::blob_size(head) {
        Ok(size) => (
            i32::try_from(size.width).ok(),
            i32::try_from(size.height).ok(),
        ),
        Err(_) => (None, None),
    }
}

fn sanitize_filename(original: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("upload");
    let mut base = slugify(stem);
    if base.is_empty() {
        base = "upload".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.trim_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty());

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG.
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
        0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
    ];

    #[tokio::test]
    async fn stores_under_bucket_and_scope() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");
        let scope = Uuid::new_v4();

        let stored = storage
            .store(FileBucket::ProductImages, scope, "Hero Shot.PNG", Bytes::from_static(PNG))
            .await
            .expect("store");

        assert!(
            stored
                .stored_path
                .starts_with(&format!("product-images/{scope}/"))
        );
        assert!(stored.stored_path.ends_with("-hero-shot.png"));
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.size_bytes, PNG.len() as i64);
        assert_eq!((stored.width, stored.height), (Some(1), Some(1)));
        assert_eq!(stored.checksum.len(), 64);

        let read = storage.read(&stored.stored_path).await.expect("read");
        assert_eq!(read.as_ref(), PNG);

        storage.delete(&stored.stored_path).await.expect("delete");
        storage
            .delete(&stored.stored_path)
            .await
            .expect("second delete is a no-op");
    }

    #[tokio::test]
    async fn rejects_empty_payload_and_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");

        let err = storage
            .store(FileBucket::Public, Uuid::new_v4(), "empty.txt", Bytes::new())
            .await
            .expect_err("empty payload");
        assert!(matches!(err, UploadStorageError::EmptyPayload));

        let err = storage.read("../secret").await.expect_err("traversal");
        assert!(matches!(err, UploadStorageError::InvalidPath));
    }
}
