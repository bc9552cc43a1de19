use colored::*;
use futures::FutureExt;
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 72;

/// Applies every registered migration in order, printing one status line
/// per migration. Exits the process on the first failure so a half-built
/// schema is obvious immediately.
pub async fn run_all_migrations(url: &str) {
    let db = sea_orm::Database::connect(url)
        .await
        .expect("DB connection failed");

    let manager = SchemaManager::new(&db);
    let pending = <migration::Migrator as MigratorTrait>::migrations();
    println!("Applying {} migration(s)...", pending.len());

    for m in pending {
        apply_one(&manager, m).await;
    }
    println!("{}", "Schema is up to date.".green());
}

async fn apply_one(manager: &SchemaManager<'_>, m: Box<dyn MigrationTrait>) {
    let label = format!("  {}", m.name().bold());
    print!(
        "{}{} ",
        label,
        ".".repeat(STATUS_COLUMN.saturating_sub(label.len()))
    );
    io::stdout().flush().ok();

    let started = Instant::now();
    // A migration can fail by returning an error or by panicking inside
    // sea-query; both must stop the run.
    let outcome = std::panic::AssertUnwindSafe(m.up(manager)).catch_unwind().await;

    match outcome {
        Ok(Ok(())) => {
            println!(
                "{} {}",
                "ok".green(),
                format!("({:.2?})", started.elapsed()).dimmed()
            );
        }
        Ok(Err(err)) => {
            println!("{}: {err}", "failed".red());
            std::process::exit(1);
        }
        Err(_) => {
            println!("{}", "panicked".red());
            std::process::exit(1);
        }
    }
}
