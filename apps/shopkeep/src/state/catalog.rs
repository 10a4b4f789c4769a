//! # Catalog State
//!
//! The product list commands look products up in. Read-only.

use shopkeep_core::Catalog;

#[derive(Debug, Clone)]
pub struct CatalogState {
    catalog: Catalog,
}

impl CatalogState {
    pub fn new(catalog: Catalog) -> Self {
        CatalogState { catalog }
    }

    /// The shop's built-in product list.
    pub fn seeded() -> Self {
        CatalogState::new(Catalog::seeded())
    }

    pub fn inner(&self) -> &Catalog {
        &self.catalog
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::seeded()
    }
}
