//! # Catalog Commands
//!
//! Product browsing for the catalog page and the cart pickers.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types "rice"                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_products("rice")                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────┐                         │
//! │  │  Full barcode? Exact lookup first         │──► Found? Return [1]    │
//! │  │  Otherwise substring over name, category, │                         │
//! │  │  barcode                                   │                         │
//! │  └───────────────────────────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shopkeep_core::validation::validate_search_query;
use shopkeep_core::Product;
use tracing::debug;

use crate::error::ApiError;
use crate::state::CatalogState;

/// Length of an EAN-13 barcode.
const BARCODE_LEN: usize = 13;

/// Every product, in catalog order.
pub fn list_products(catalog: &CatalogState) -> Vec<Product> {
    debug!("list_products command");
    catalog.inner().products().to_vec()
}

/// Products matching `query`. An empty query returns everything.
pub fn search_products(catalog: &CatalogState, query: String) -> Result<Vec<Product>, ApiError> {
    let query = validate_search_query(&query)?;
    debug!(query = %query, "search_products command");

    if looks_like_barcode(&query) {
        if let Some(product) = catalog.inner().find_by_barcode(&query) {
            return Ok(vec![product.clone()]);
        }
    }

    Ok(catalog
        .inner()
        .search(&query)
        .into_iter()
        .cloned()
        .collect())
}

pub fn get_product(catalog: &CatalogState, id: String) -> Result<Product, ApiError> {
    debug!(id = %id, "get_product command");
    catalog
        .inner()
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

pub fn get_product_by_barcode(catalog: &CatalogState, barcode: String) -> Result<Product, ApiError> {
    debug!(barcode = %barcode, "get_product_by_barcode command");
    catalog
        .inner()
        .find_by_barcode(&barcode)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Product with barcode", &barcode))
}

/// Distinct categories, for filter chips.
pub fn list_categories(catalog: &CatalogState) -> Vec<String> {
    catalog
        .inner()
        .categories()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn looks_like_barcode(query: &str) -> bool {
    query.len() == BARCODE_LEN && query.chars().all(|c| c.is_ascii_digit())
}
