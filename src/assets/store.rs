use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    assets::decode::decode_data_uri,
    foundation::error::{CarouselError, CarouselResult},
};

/// Source of referenced bytes: screenshots, reference photos, brand icons and frames.
///
/// Identifiers are either relative paths or inline `data:` URIs.
#[async_trait::async_trait]
pub trait AssetResolver: Send + Sync {
    async fn load(&self, id: &str) -> CarouselResult<Vec<u8>>;

    /// Like [`AssetResolver::load`] but maps `NotFound` to `None`.
    async fn load_optional(&self, id: &str) -> CarouselResult<Option<Vec<u8>>> {
        match self.load(id).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(CarouselError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Resolves ids relative to a root directory.
#[derive(Clone, Debug)]
pub struct DirAssetResolver {
    root: PathBuf,
}

impl DirAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl AssetResolver for DirAssetResolver {
    async fn load(&self, id: &str) -> CarouselResult<Vec<u8>> {
        if id.starts_with("data:") {
            return decode_data_uri(id);
        }
        let norm = normalize_rel_path(id)?;
        let path = self.root.join(Path::new(&norm));
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CarouselError::not_found(format!("asset '{norm}'")))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read asset bytes from '{}'", path.display()))
                .into()),
        }
    }
}

/// Fixed in-memory asset table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, bytes: Vec<u8>) -> CarouselResult<()> {
        self.entries.insert(normalize_rel_path(id)?, bytes);
        Ok(())
    }

    pub fn with(mut self, id: &str, bytes: Vec<u8>) -> CarouselResult<Self> {
        self.insert(id, bytes)?;
        Ok(self)
    }
}

#[async_trait::async_trait]
impl AssetResolver for InMemoryAssets {
    async fn load(&self, id: &str) -> CarouselResult<Vec<u8>> {
        if id.starts_with("data:") {
            return decode_data_uri(id);
        }
        let norm = normalize_rel_path(id)?;
        self.entries
            .get(&norm)
            .cloned()
            .ok_or_else(|| CarouselError::not_found(format!("asset '{norm}'")))
    }
}

/// Load the first id that exists, in order.
pub async fn load_first(
    resolver: &dyn AssetResolver,
    ids: &[String],
) -> CarouselResult<Option<Vec<u8>>> {
    for id in ids {
        if let Some(bytes) = resolver.load_optional(id).await? {
            return Ok(Some(bytes));
        }
    }
    Ok(None)
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CarouselResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.starts_with('/') {
        return Err(CarouselError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CarouselError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CarouselError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CarouselError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
