use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{assets::store::normalize_rel_path, foundation::error::CarouselResult};

/// Where a finished slide ended up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub url: String,
    pub filename: String,
}

/// Destination for finished slide images and clips.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> CarouselResult<StoredObject>;
}

/// Writes objects into a directory served under `url_prefix`.
#[derive(Clone, Debug)]
pub struct LocalDirStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalDirStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalDirStore {
    #[tracing::instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> CarouselResult<StoredObject> {
        let filename = normalize_rel_path(filename)?;
        let path = self.root.join(&filename);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("write object '{}'", path.display()))?;
        Ok(StoredObject {
            url: format!("{}/{}", self.url_prefix, filename),
            filename,
        })
    }
}

/// `carousel_<brand>_<job>_s<n>_<suffix>.<ext>`
pub fn slide_filename(brand_id: &str, job_id: &str, slide_number: usize, ext: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "carousel_{brand_id}_{job_id}_s{slide_number}_{}.{ext}",
        &suffix[..8]
    )
}

#[cfg(test)]
#[path = "../tests/unit/storage.rs"]
mod tests;
