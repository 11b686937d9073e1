use axum::Json;
use serde::Serialize;

use commun_domain::catalog::{CATALOG, CATALOG_VERSION, Category};

#[derive(Serialize)]
pub struct CatalogResponse {
    pub version: u32,
    pub categories: &'static [Category],
}

/// `GET /catalog`: the category table clients build their forms from.
pub async fn get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        version: CATALOG_VERSION,
        categories: CATALOG,
    })
}
