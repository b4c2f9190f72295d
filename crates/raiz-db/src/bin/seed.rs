//! # Seed Data Generator
//!
//! Creates a demo account, its store and a small service catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p raiz-db --bin seed
//! cargo run -p raiz-db --bin seed -- --db ./data/pdv.db
//! cargo run -p raiz-db --bin seed -- --email demo@raiz.app --password demo123
//! ```
//!
//! Running it twice is harmless: an existing demo user is reused and a
//! non-empty catalog is left alone.

use std::env;

use raiz_core::{ProductInput, DEFAULT_STORE_NAME};
use raiz_db::{Database, DbConfig, DbError};

/// (name, description, price in centavos, stock)
const CATALOG: &[(&str, &str, i64, i64)] = &[
    ("Corte de Cabelo", "Corte masculino tradicional", 4000, 50),
    ("Barba", "Barba com toalha quente", 3000, 50),
    ("Corte + Barba", "Combo completo", 6500, 30),
    ("Sobrancelha", "Acabamento na navalha", 1500, 40),
    ("Pomada Modeladora", "Pote 120g", 3500, 12),
    ("Óleo para Barba", "Frasco 30ml", 2800, 8),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./pdv_dev.db");
    let mut email = String::from("demo@raiz.app");
    let mut password = String::from("demo123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 1;
            }
            "--email" | "-e" if i + 1 < args.len() => {
                email = args[i + 1].clone();
                i += 1;
            }
            "--password" | "-p" if i + 1 < args.len() => {
                password = args[i + 1].clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("PDV Raiz Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./pdv_dev.db)");
                println!("  -e, --email <EMAIL>      Demo account email (default: demo@raiz.app)");
                println!("  -p, --password <PASS>    Demo account password (default: demo123)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PDV Raiz Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let user = match db.users().register(&email, &password).await {
        Ok(user) => {
            println!("✓ Created user {}", user.email);
            user
        }
        Err(DbError::UniqueViolation { .. }) => {
            println!("• User {} already exists", email);
            db.users()
                .get_by_email(&email)
                .await?
                .ok_or_else(|| DbError::not_found("User", &email))?
        }
        Err(e) => return Err(e.into()),
    };

    let store = db
        .stores()
        .ensure_for_owner(&user.id, DEFAULT_STORE_NAME, Some("Seg-Sáb 9h-19h"))
        .await?;
    println!("✓ Store: {}", store.name);

    let existing = db.products().count(&store.id).await?;
    if existing > 0 {
        println!("⚠ Store already has {} products, skipping catalog", existing);
        return Ok(());
    }

    for (name, description, price_cents, stock) in CATALOG {
        let input = ProductInput {
            name: name.to_string(),
            description: Some(description.to_string()),
            price_cents: *price_cents,
            stock: *stock,
        };
        match db.products().create(&store.id, &input).await {
            Ok(product) => println!("  + {} ({})", product.name, product.price()),
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("✓ Seed complete! Sign in with {} / {}", email, password);

    Ok(())
}
