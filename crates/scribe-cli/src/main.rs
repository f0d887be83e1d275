mod analyze_cmd;
mod config;
mod serve_cmd;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use scribe_core::generator::CommandGenerator;
use scribe_db::pool;

use config::ScribeConfig;

#[derive(Parser)]
#[command(name = "scribe", about = "Meeting transcript to work-breakdown plan pipeline")]
struct Cli {
    /// Database URL (overrides SCRIBE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a scribe config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/scribe")]
        db_url: String,
        /// Generator command line (prompt on stdin, completion on stdout)
        #[arg(long, default_value = config::DEFAULT_GENERATOR_COMMAND)]
        generator: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the scribe database (create + migrate)
    DbInit,
    /// Analyze a transcript file and store the resulting plan
    Analyze {
        /// Path to the transcript file ("-" reads stdin)
        file: String,
    },
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

/// Execute the `scribe init` command: write config file.
fn cmd_init(db_url: &str, generator: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        generator: config::GeneratorSection {
            command: generator.to_string(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  generator.command = {generator}");
    println!();
    println!("Next: run `scribe db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `scribe db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = ScribeConfig::resolve(cli_db_url)?;

    println!("Initializing scribe database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("scribe db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            generator,
            force,
        } => {
            cmd_init(&db_url, &generator, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Analyze { file } => {
            let resolved = ScribeConfig::resolve(cli.database_url.as_deref())?;
            let generator = CommandGenerator::from_command_line(&resolved.generator_command)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = analyze_cmd::run_analyze(&db_pool, &generator, &file).await;
            db_pool.close().await;
            result?;
        }
        Commands::Serve { bind, port } => {
            let resolved = ScribeConfig::resolve(cli.database_url.as_deref())?;
            let generator = CommandGenerator::from_command_line(&resolved.generator_command)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let state = serve_cmd::AppState {
                pool: db_pool.clone(),
                generator: Arc::new(generator),
            };
            let result = serve_cmd::run_serve(state, &bind, port).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
