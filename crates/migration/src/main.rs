use clap::{Parser, Subcommand};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

use migration::Migrator;

/// Applies or rolls back the WalletTrack schema.
#[derive(Parser, Debug)]
#[command(name = "migration")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./wallettrack.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Apply pending migrations (all of them unless `--steps` is given).
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back the last migration, or `--steps` of them.
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and reapply all migrations. Deletes all users,
    /// transactions and budgets.
    Fresh,
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            Migrator::up(&db, steps).await?;
            println!("schema is up to date");
        }
        Command::Down { steps } => {
            Migrator::down(&db, Some(steps)).await?;
            println!("rolled back {steps} migration(s)");
        }
        Command::Fresh => {
            Migrator::fresh(&db).await?;
            println!("schema recreated, all data removed");
        }
        Command::Status => Migrator::status(&db).await?,
    }

    Ok(())
}
