//! [`BlobStore`] backed by any `object_store` implementation.
//!
//! Objects are stored flat under the prefix taken from `BLOB_STORE_URL`, named
//! `{uuid}.{ext}`. That object name is the asset's `public_id`; its public URL
//! is `{BLOB_PUBLIC_BASE_URL}/{public_id}`.

use std::sync::Arc;

use anyhow::Context as _;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use url::Url;
use uuid::Uuid;

use crate::domain::repository::BlobStore;
use crate::domain::types::{StoredAsset, UploadedFile};
use crate::error::MarketplaceError;

#[derive(Clone)]
pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
    prefix: Path,
    public_base_url: String,
}

impl std::fmt::Debug for ObjectBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBlobStore")
            .field("store", &self.store.to_string())
            .field("prefix", &self.prefix)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl ObjectBlobStore {
    /// Build from an object store URL such as `s3://bucket/uploads`,
    /// `file:///var/lib/commun/blobs` or `memory:///`.
    ///
    /// S3 credentials and region come from the standard `AWS_*` variables.
    pub fn from_url(store_url: &str, public_base_url: &str) -> anyhow::Result<Self> {
        let url =
            Url::parse(store_url).with_context(|| format!("parse blob store url {store_url}"))?;
        let (store, prefix) = object_store::parse_url_opts(&url, std::env::vars())
            .with_context(|| format!("build blob store for {store_url}"))?;
        Ok(Self {
            store: Arc::from(store),
            prefix,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn in_memory(public_base_url: &str) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            prefix: Path::default(),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Names of every stored object, sorted.
    pub async fn object_names(&self) -> anyhow::Result<Vec<String>> {
        let prefix = (!self.prefix.as_ref().is_empty()).then_some(&self.prefix);
        let listing = self
            .store
            .list_with_delimiter(prefix)
            .await
            .context("list blobs")?;
        let mut names: Vec<String> = listing
            .objects
            .into_iter()
            .filter_map(|meta| meta.location.filename().map(str::to_owned))
            .collect();
        names.sort();
        Ok(names)
    }

    fn location(&self, public_id: &str) -> Result<Path, MarketplaceError> {
        if public_id.is_empty() || public_id.contains('/') || public_id.starts_with('.') {
            return Err(MarketplaceError::AssetNotFound);
        }
        Ok(self.prefix.child(public_id))
    }
}

impl BlobStore for ObjectBlobStore {
    async fn upload(&self, file: &UploadedFile) -> Result<StoredAsset, MarketplaceError> {
        let public_id = format!("{}.{}", Uuid::now_v7(), file.extension());
        let location = self.location(&public_id)?;
        self.store
            .put(&location, PutPayload::from(file.bytes.clone()))
            .await
            .with_context(|| format!("upload {}", file.display_name()))
            .map_err(MarketplaceError::BlobStore)?;
        tracing::debug!(public_id = %public_id, size = file.bytes.len(), "blob uploaded");
        Ok(StoredAsset {
            url: format!("{}/{}", self.public_base_url, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MarketplaceError> {
        let location = self.location(public_id)?;
        match self.store.delete(&location).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(MarketplaceError::BlobStore(
                anyhow::Error::new(err).context(format!("delete blob {public_id}")),
            )),
        }
    }
}
