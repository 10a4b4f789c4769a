//! # Shopkeep Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep                                         │
//! │                                                                         │
//! │  main.rs ────► collects args, runs the library                         │
//! │                                                                         │
//! │  lib.rs ─────► logging, database path, ledger, dashboard output        │
//! │                                                                         │
//! │  commands/ ──► add_to_sales_cart, confirm_order, get_dashboard, ...    │
//! │                                                                         │
//! │  state/ ─────► LedgerState, CartState, CatalogState, ConfigState       │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  SQLite: shopkeep.db (kv_store: wholesale_orders, wholesale_purchases) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    // The actual setup is in lib.rs for testability
    if let Err(e) = shopkeep_lib::run(args).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
