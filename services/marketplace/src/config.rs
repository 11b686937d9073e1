use anyhow::Context as _;

/// Marketplace service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Database connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3114). Env var: `MARKETPLACE_PORT`.
    pub marketplace_port: u16,
    /// `object_store` URL for uploads, e.g. `s3://commun-assets/uploads`.
    /// Env var: `BLOB_STORE_URL`.
    pub blob_store_url: String,
    /// Base URL clients fetch uploaded files from. Env var: `BLOB_PUBLIC_BASE_URL`.
    pub blob_public_base_url: String,
    /// Request body cap for multipart uploads (default 10 MiB). Env var: `MAX_UPLOAD_BYTES`.
    pub max_upload_bytes: usize,
}

pub const DEFAULT_PORT: u16 = 3114;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl MarketplaceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            marketplace_port: lookup("MARKETPLACE_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            blob_store_url: required("BLOB_STORE_URL")?,
            blob_public_base_url: required("BLOB_PUBLIC_BASE_URL")?,
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}
