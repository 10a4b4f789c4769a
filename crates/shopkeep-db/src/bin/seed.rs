//! # Demo Data Seeder
//!
//! Fills an empty ledger with a few orders and purchases for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p shopkeep-db --bin seed
//!
//! # Specify database path
//! cargo run -p shopkeep-db --bin seed -- --db ./data/shopkeep.db
//! ```
//!
//! Every record goes through the same cart → commit path the app uses, so
//! the seeded data satisfies the same invariants as real data.

use std::env;

use chrono::NaiveDate;
use shopkeep_core::{
    Catalog, FixedClock, IdGenerator, Money, PaymentMethod, PurchaseCart, SalesCart,
};
use shopkeep_db::{Database, DbConfig, LedgerStore};

/// (date, customer, [(product id, qty)], paid)
type DemoOrder = (&'static str, &'static str, &'static [(&'static str, i64)], &'static str);

const DEMO_ORDERS: &[DemoOrder] = &[
    ("2026-01-25", "Green Valley Store", &[("1", 50), ("4", 20)], "5545.41"),
    ("2026-01-26", "City Mart", &[("2", 30), ("6", 25)], "2879.20"),
    ("2026-01-27", "Downtown Grocers", &[("3", 40), ("7", 35), ("9", 50)], "3000"),
];

/// (date, supplier, [(product id, qty, unit cost cents)], paid)
type DemoPurchase = (
    &'static str,
    &'static str,
    &'static [(&'static str, i64, i64)],
    &'static str,
);

const DEMO_PURCHASES: &[DemoPurchase] = &[
    ("2026-01-20", "Punjab Grain Traders", &[("1", 200, 3800), ("3", 100, 5400)], "13000"),
    ("2026-01-22", "Golden Oil Mills", &[("4", 80, 9800), ("5", 60, 9000)], "5000"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shopkeep_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shopkeep Demo Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./shopkeep_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopkeep Demo Data Seeder");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let ledger = LedgerStore::new(db.kv());

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = ledger.orders().await.len() + ledger.purchases().await.len();
    if existing > 0 {
        println!("⚠ Ledger already has {} records", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let catalog = Catalog::seeded();
    let ids = IdGenerator::new();

    println!();
    println!("Recording purchases...");
    for (date, supplier, lines, paid) in DEMO_PURCHASES {
        let clock = FixedClock::at_date(NaiveDate::parse_from_str(date, "%Y-%m-%d")?);
        let mut cart = PurchaseCart::new();
        for (product_id, qty, cost) in lines.iter() {
            cart.add_item(&catalog, product_id, Some(Money::from_cents(*cost)));
            cart.set_quantity(product_id, *qty)?;
        }
        cart.set_supplier_name(*supplier);
        cart.set_paid_input(*paid);

        let committed = ledger.commit_purchase(&mut cart, &ids, &clock).await?;
        println!(
            "  {} {} {} ({:?})",
            committed.record.id, supplier, committed.record.total_cost, committed.record.status
        );
    }

    println!();
    println!("Recording orders...");
    for (date, customer, lines, paid) in DEMO_ORDERS {
        let clock = FixedClock::at_date(NaiveDate::parse_from_str(date, "%Y-%m-%d")?);
        let mut cart = SalesCart::new();
        for (product_id, qty) in lines.iter() {
            cart.add_item(&catalog, product_id, None);
            cart.set_quantity(product_id, *qty)?;
        }
        cart.set_customer_name(*customer);
        cart.set_payment_method(PaymentMethod::Cash);
        cart.set_paid_input(*paid);

        let committed = ledger.commit_order(&mut cart, &ids, &clock).await?;
        println!(
            "  {} {} {} ({:?})",
            committed.record.id, customer, committed.record.total, committed.record.status
        );
    }

    let pl = ledger.profit_loss(None).await;
    println!();
    println!("Sales:     {}", pl.total_sales);
    println!("Purchases: {}", pl.total_purchases);
    println!("Profit:    {} ({:.2}%)", pl.profit_loss, pl.margin);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
