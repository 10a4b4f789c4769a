//! # Configuration State
//!
//! The shop profile printed on invoices, loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SHOPKEEP_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};
use shopkeep_core::{Money, SALES_TAX_RATE};

/// Shop profile and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Trading name, invoice header
    pub business_name: String,

    /// Shopkeeper's name
    pub owner_name: String,

    pub phone: String,

    pub email: String,

    /// Single-line postal address
    pub address: String,

    /// GST registration number
    pub gstin: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Sales tax in basis points. Informational; totals always use the
    /// core rate.
    pub tax_rate_bps: u32,
}

impl Default for ConfigState {
    /// Demo shop profile.
    fn default() -> Self {
        ConfigState {
            business_name: "Kumar Wholesale Mart".to_string(),
            owner_name: "Rajesh Kumar".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            email: "rajesh@kumarwholesale.com".to_string(),
            address: "123 Market Street, Commerce District".to_string(),
            gstin: "27AAAAA0000A1Z5".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            tax_rate_bps: SALES_TAX_RATE.bps(),
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `SHOPKEEP_BUSINESS_NAME`
    /// - `SHOPKEEP_OWNER_NAME`
    /// - `SHOPKEEP_PHONE`
    /// - `SHOPKEEP_EMAIL`
    /// - `SHOPKEEP_ADDRESS`
    /// - `SHOPKEEP_GSTIN`
    /// - `SHOPKEEP_CURRENCY_SYMBOL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        let fields: [(&str, &mut String); 7] = [
            ("SHOPKEEP_BUSINESS_NAME", &mut config.business_name),
            ("SHOPKEEP_OWNER_NAME", &mut config.owner_name),
            ("SHOPKEEP_PHONE", &mut config.phone),
            ("SHOPKEEP_EMAIL", &mut config.email),
            ("SHOPKEEP_ADDRESS", &mut config.address),
            ("SHOPKEEP_GSTIN", &mut config.gstin),
            ("SHOPKEEP_CURRENCY_SYMBOL", &mut config.currency_symbol),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value.trim().to_string();
            }
        }

        config
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }

    /// Tax line label, e.g. `Tax (18%)`.
    pub fn tax_label(&self) -> String {
        let percent = self.tax_rate_bps as f64 / 100.0;
        format!("Tax ({}%)", percent)
    }
}
