//! # Catalog
//!
//! Read-only product reference data.
//!
//! The catalog is handed to the carts explicitly, so tests can build a
//! synthetic one with [`Catalog::new`] while the app uses
//! [`Catalog::seeded`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product the shop buys and sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Primary identifier.
    pub id: String,

    /// Display name shown on carts and invoices.
    pub name: String,

    /// Grouping used for browsing and search.
    pub category: String,

    /// Selling price per unit.
    pub unit_price: Money,

    /// Stock on hand. Informational only; sales do not decrement it.
    pub stock_quantity: i64,

    /// Barcode (EAN-13). Secondary identifier for display and search.
    pub barcode: String,

    /// Unit of sale, e.g. `kg` or `L`.
    pub unit: String,
}

impl Product {
    /// Case-insensitive match on name and category, plain match on barcode.
    fn matches(&self, needle_lower: &str, needle_raw: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.category.to_lowercase().contains(needle_lower)
            || self.barcode.contains(needle_raw)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The fixed product list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// The shop's wholesale staples.
    pub fn seeded() -> Self {
        const SEED: &[(&str, &str, &str, i64, i64, &str, &str)] = &[
            ("1", "Premium Rice", "Grains", 4599, 500, "1234567890123", "kg"),
            ("2", "Organic Wheat Flour", "Grains", 3550, 350, "2345678901234", "kg"),
            ("3", "Basmati Rice", "Grains", 6500, 200, "3456789012345", "kg"),
            ("4", "Cooking Oil", "Oils", 12000, 150, "4567890123456", "L"),
            ("5", "Sunflower Oil", "Oils", 11000, 180, "5678901234567", "L"),
            ("6", "Red Lentils", "Pulses", 5500, 300, "6789012345678", "kg"),
            ("7", "Chickpeas", "Pulses", 4800, 250, "7890123456789", "kg"),
            ("8", "Black Beans", "Pulses", 5200, 220, "8901234567890", "kg"),
            ("9", "White Sugar", "Sweeteners", 3800, 400, "9012345678901", "kg"),
            ("10", "Brown Sugar", "Sweeteners", 4200, 280, "0123456789012", "kg"),
        ];

        let products = SEED
            .iter()
            .map(|&(id, name, category, price, stock, barcode, unit)| Product {
                id: id.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                unit_price: Money::from_cents(price),
                stock_quantity: stock,
                barcode: barcode.to_string(),
                unit: unit.to_string(),
            })
            .collect();

        Catalog { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks a product up by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks a product up by barcode.
    pub fn find_by_barcode(&self, barcode: &str) -> Option<&Product> {
        let barcode = barcode.trim();
        self.products.iter().find(|p| p.barcode == barcode)
    }

    /// Substring search over name, category and barcode.
    ///
    /// Name and category compare case-insensitively; the barcode compares
    /// as typed. An empty query returns every product.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let raw = query.trim();
        if raw.is_empty() {
            return self.products.iter().collect();
        }

        let lower = raw.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.matches(&lower, raw))
            .collect()
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
