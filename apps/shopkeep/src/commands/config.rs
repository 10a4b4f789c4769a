//! # Config Commands
//!
//! Shop profile used by the invoice and currency display.

use tracing::debug;

use crate::state::ConfigState;

/// Gets the current shop profile.
///
/// ## When Used
/// - Invoice header (business name, address, GSTIN)
/// - Currency formatting on every page
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}
