use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::application::ResourceStore;
use crate::domain::{DomainError, GalleryImage, GalleryUpload, Upload, UploadProgress, UploadState};
use crate::ports::ResourceBackend;

/// Media library: the image collection plus per-upload progress.
pub struct GalleryStore {
    images: ResourceStore<GalleryImage>,
    uploads: RwLock<BTreeMap<String, UploadProgress>>,
    next_upload: AtomicU64,
}

impl GalleryStore {
    pub fn new(backend: Arc<dyn ResourceBackend<GalleryImage>>) -> Self {
        Self {
            images: ResourceStore::new(backend),
            uploads: RwLock::new(BTreeMap::new()),
            next_upload: AtomicU64::new(1),
        }
    }

    pub fn images(&self) -> &ResourceStore<GalleryImage> {
        &self.images
    }

    /// Uploads one file. The new image is placed first in the collection.
    ///
    /// Type and size are checked before anything is sent; a rejected file
    /// still gets a progress entry in the `error` state.
    pub async fn upload(&self, file: Upload, tags: Vec<String>) -> Result<GalleryImage, DomainError> {
        let upload_id = format!("upload-{}", self.next_upload.fetch_add(1, Ordering::SeqCst));
        self.set_progress(UploadProgress {
            id: upload_id.clone(),
            progress: 0,
            file_name: file.file_name.clone(),
            status: UploadState::Uploading,
            error: None,
        });

        let result = self.images.create(GalleryUpload { file, tags }).await;

        let mut uploads = self.uploads.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = uploads.get_mut(&upload_id) {
            match &result {
                Ok(_) => {
                    entry.progress = 100;
                    entry.status = UploadState::Completed;
                }
                Err(e) => {
                    entry.status = UploadState::Error;
                    entry.error = Some(e.to_string());
                }
            }
        }
        result
    }

    pub fn uploads(&self) -> Vec<UploadProgress> {
        self.uploads
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// Drops progress entries that are no longer uploading.
    pub fn clear_finished_uploads(&self) {
        self.uploads
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, p| p.status == UploadState::Uploading);
    }

    pub fn by_tag(&self, tag: &str) -> Vec<GalleryImage> {
        self.images.select(|img| img.tags.iter().any(|t| t == tag))
    }

    /// Every tag used by a loaded image, sorted and without duplicates.
    pub fn all_tags(&self) -> Vec<String> {
        self.images.with_items(|items| {
            items
                .iter()
                .flat_map(|img| img.tags.iter().cloned())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }

    fn set_progress(&self, progress: UploadProgress) {
        self.uploads
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(progress.id.clone(), progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Filter;
    use crate::infrastructure::adapters::memory::InMemoryBackend;

    fn png(name: &str, len: usize) -> Upload {
        Upload {
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![7; len],
        }
    }

    #[tokio::test]
    async fn test_upload_prepends_and_tracks_progress() {
        let gallery = GalleryStore::new(Arc::new(InMemoryBackend::<GalleryImage>::new()));
        gallery.upload(png("first.png", 10), vec!["menu".into()]).await.unwrap();
        let second = gallery.upload(png("second.png", 2048), vec![]).await.unwrap();

        let images = gallery.images().items();
        assert_eq!(images[0], second);
        assert_eq!(images[0].size, "2.0 KB");

        let uploads = gallery.uploads();
        assert_eq!(uploads.len(), 2);
        assert!(uploads.iter().all(|u| u.status == UploadState::Completed && u.progress == 100));

        gallery.clear_finished_uploads();
        assert!(gallery.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_upload_is_marked_failed() {
        let gallery = GalleryStore::new(Arc::new(InMemoryBackend::<GalleryImage>::new()));
        let mut bad = png("notes.txt", 10);
        bad.mime_type = "text/plain".into();

        assert!(gallery.upload(bad, vec![]).await.is_err());
        let uploads = gallery.uploads();
        assert_eq!(uploads[0].status, UploadState::Error);
        assert!(gallery.images().is_empty());
        assert!(gallery.images().status().error.is_some());
    }

    #[tokio::test]
    async fn test_tags() {
        let gallery = GalleryStore::new(Arc::new(InMemoryBackend::<GalleryImage>::new()));
        gallery.upload(png("a.png", 1), vec!["oven".into(), "kitchen".into()]).await.unwrap();
        gallery.upload(png("b.png", 1), vec!["kitchen".into()]).await.unwrap();
        gallery.images().fetch_all(&Filter::new()).await.unwrap();

        assert_eq!(gallery.all_tags(), vec!["kitchen".to_string(), "oven".to_string()]);
        assert_eq!(gallery.by_tag("oven").len(), 1);
    }
}
