//! Parser CLI - Turns an uploaded route sheet into a stored service sheet
//!
//! Responsibilities:
//! - Read the uploaded file (CSV or Excel, first worksheet)
//! - Parse it with the strict template, falling back to heuristics
//! - Substitute a placeholder client when none was found
//! - Store the sheet and its child rows, skipping duplicate uploads
//!
//! Usage:
//!   hoja-parser --file hoja_ruta.xlsx --dry-run
//!   hoja-parser --file hoja_ruta.csv --template config/sala-norte.json

use anyhow::{Context, Result};
use clap::Parser;
use hoja_parser::pipeline::placeholder_client;
use hoja_parser::source::load_source;
use hoja_parser::{store, Pipeline, Template};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hoja-parser", about = "Parses route sheets into service sheet records")]
struct Args {
    /// Sheet to import (.csv, .xlsx, .xls, .ods)
    #[arg(long)]
    file: PathBuf,

    /// Template override (JSON) for the strict extractor
    #[arg(long)]
    template: Option<PathBuf>,

    /// Dry run - don't save to database
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Print the parsed document as JSON
    #[arg(long, default_value = "false")]
    json: bool,

    /// Import even if the same file was already stored
    #[arg(long, default_value = "false")]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    println!("=== Hoja de Ruta Parser ===");
    println!("File: {}", args.file.display());
    println!("Mode: {}", if args.dry_run { "dry-run" } else { "live" });

    let template = match &args.template {
        Some(path) => Template::from_file(path)
            .with_context(|| format!("Failed to load template {}", path.display()))?,
        None => Template::standard(),
    };
    println!("Template: {}", template.name);

    let source = load_source(&args.file)
        .await
        .context("Failed to read sheet file")?;
    println!("Content size: {} bytes", source.text.len());
    println!("Hash: {}", source.content_hash);
    if source.from_workbook {
        println!("Detected Excel format - converted first worksheet to CSV");
    }

    let mut extraction = Pipeline::new(template).process_text(&source.text);
    println!("\nStrategy: {}", extraction.strategy);
    if let Some(reason) = extraction.strict_rejection {
        println!("Strict template rejected: {}", reason);
    }
    if let Some(format) = &extraction.format {
        println!(
            "Detected delimiter {:?}, {} labelled fields",
            format.delimiter,
            format.fields.len()
        );
    }

    if extraction.sheet.client.trim().is_empty() {
        extraction.sheet.client = placeholder_client(&source.name);
        println!("No client found - using placeholder '{}'", extraction.sheet.client);
    }

    let sheet = &extraction.sheet;
    println!("\nClient: {}", sheet.client);
    println!("Date: {}", sheet.service_date);
    println!("Responsible: {}", sheet.responsible_person);
    println!("Persons: {}", sheet.person_count);
    println!(
        "Items: {} equipment, {} menu, {} beverages, {} notes",
        sheet.equipment_items.len(),
        sheet.menu_items.len(),
        sheet.beverage_items.len(),
        sheet.notes.len()
    );
    for (i, item) in sheet.menu_items.iter().take(3).enumerate() {
        println!(
            "  [{}] {} | {} | {} | {}",
            i + 1,
            item.section_type,
            item.time,
            item.name,
            item.quantity
        );
    }
    if sheet.menu_items.len() > 3 {
        println!("  ... and {} more", sheet.menu_items.len() - 3);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&extraction).context("Failed to serialize sheet")?
        );
    }

    if args.dry_run {
        println!("\nDry run - nothing saved to database");
        return Ok(());
    }

    let db_url = std::env::var("DB_URL").context("DB_URL env var missing")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .context("Failed to connect to database")?;

    if !args.force {
        if let Some(existing) = store::find_by_hash(&pool, &source.content_hash).await? {
            println!("Sheet already imported as {}. Use --force to import again.", existing);
            return Ok(());
        }
    }

    let hoja_id = store::save_sheet(&pool, &source.name, &source.content_hash, &extraction)
        .await
        .context("Failed to store sheet")?;

    println!("\n=== Import Complete ===");
    println!("Hoja ID: {}", hoja_id);

    Ok(())
}
