//! # Seed Data Generator
//!
//! Populates the database with a development catalog: ticket types,
//! garments with priced variants, and the modifier tables.
//!
//! ## Usage
//! ```bash
//! cargo run -p pressline-db --bin seed
//! cargo run -p pressline-db --bin seed -- --db ./data/pressline.db
//! ```

use std::env;

use pressline_db::repository::catalog::TicketTypeLinks;
use pressline_db::{Database, DbConfig};

/// Garments with their priced variants (name, price in cents).
const GARMENTS: &[(&str, &[(&str, i64)])] = &[
    (
        "Shirt",
        &[
            ("Long Sleeve", 299),
            ("Short Sleeve", 279),
            ("Dress Shirt", 349),
        ],
    ),
    (
        "Pants",
        &[("Slacks", 550), ("Jeans", 499), ("Khakis", 525)],
    ),
    (
        "Suit",
        &[("Two Piece", 1399), ("Three Piece", 1799)],
    ),
    (
        "Dress",
        &[("Casual", 899), ("Formal", 1499), ("Gown", 2499)],
    ),
    ("Coat", &[("Overcoat", 1599), ("Jacket", 999)]),
    (
        "Household",
        &[("Comforter", 2999), ("Blanket", 1999), ("Drapes (per panel)", 1499)],
    ),
];

const COLORS: &[(&str, &str)] = &[
    ("White", "#ffffff"),
    ("Black", "#000000"),
    ("Navy", "#001f54"),
    ("Grey", "#808080"),
    ("Red", "#c0392b"),
    ("Blue", "#2980b9"),
    ("Green", "#27ae60"),
    ("Beige", "#d5c4a1"),
];

const PATTERNS: &[&str] = &["Solid", "Striped", "Plaid", "Floral", "Polka Dot", "Paisley"];

const TEXTURES: &[&str] = &["Cotton", "Wool", "Silk", "Linen", "Polyester", "Leather"];

const UPCHARGES: &[(&str, i64)] = &[
    ("Heavy starch", 150),
    ("Stain treatment", 300),
    ("Rush service", 500),
    ("Delicate handling", 250),
    ("Button replacement", 100),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_arg().unwrap_or_else(|| "./pressline.db".to_string());
    println!("Seeding catalog into {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.catalog();

    let mut garment_ids = Vec::new();
    for &(garment_name, variants) in GARMENTS {
        let garment = catalog.create_garment(garment_name).await?;
        for &(variant_name, price_cents) in variants {
            catalog
                .create_variant(garment.id, variant_name, price_cents)
                .await?;
        }
        garment_ids.push(garment.id);
    }

    let mut color_ids = Vec::new();
    for &(name, value) in COLORS {
        color_ids.push(catalog.create_color(name, value).await?.id);
    }

    let mut pattern_ids = Vec::new();
    for &name in PATTERNS {
        pattern_ids.push(catalog.create_pattern(name).await?.id);
    }

    let mut texture_ids = Vec::new();
    for &name in TEXTURES {
        texture_ids.push(catalog.create_texture(name).await?.id);
    }

    let mut upcharge_ids = Vec::new();
    for &(description, price_cents) in UPCHARGES {
        upcharge_ids.push(catalog.create_upcharge(description, price_cents).await?.id);
    }

    catalog.create_discount("Loyalty 10%", Some(1000), None).await?;
    catalog.create_discount("$5 Off", None, Some(500)).await?;

    // Every ticket type offers the full catalog in the dev seed
    let links = TicketTypeLinks {
        garment_ids: garment_ids.clone(),
        color_ids,
        pattern_ids,
        texture_ids,
        upcharge_ids,
    };

    for name in ["Dry Clean", "Wash & Fold", "Press Only", "Alterations"] {
        catalog.create_ticket_type(name, &links).await?;
    }

    println!("Catalog seeded: {} garments, 4 ticket types", garment_ids.len());
    Ok(())
}

fn parse_db_arg() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}
