use clap::{Parser, Subcommand};
use diary_cli::{maintenance, seeder};
use diary_db::{DatabaseConfig, MySqlPool, init_db_pool};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "diary-cli")]
#[command(about = "Diary CLI - maintenance tools for the Diary API database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert fake diaries
    Seed {
        /// Number of diaries to create
        #[arg(short = 'c', long, default_value = "25")]
        count: usize,
    },
    /// Print the number of diaries
    Count {
        /// Only count diaries whose title contains this text
        #[arg(short = 't', long)]
        title: Option<String>,
    },
    /// Delete diaries older than the given number of days
    Purge {
        #[arg(long)]
        older_than_days: u32,
    },
    /// Upsert diaries from a JSON file, keyed by id
    Restore {
        /// Path to a JSON array of {id, title, content}
        #[arg(short = 'f', long)]
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let pool = match init_db_pool(&DatabaseConfig::from_env()).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Seed { count } => handle_seed(&pool, count).await,
        Commands::Count { title } => handle_count(&pool, title.as_deref()).await,
        Commands::Purge { older_than_days } => handle_purge(&pool, older_than_days).await,
        Commands::Restore { file } => handle_restore(&pool, &file).await,
    };

    pool.close().await;
    std::process::exit(code);
}

async fn handle_seed(pool: &MySqlPool, count: usize) -> i32 {
    match seeder::seed_diaries(pool, count).await {
        Ok(ids) => {
            println!("✅ Created {} diaries", ids.len());
            0
        }
        Err(e) => {
            eprintln!("\n❌ Error seeding diaries: {}", e);
            1
        }
    }
}

async fn handle_count(pool: &MySqlPool, title: Option<&str>) -> i32 {
    match maintenance::count(pool, title).await {
        Ok(total) => {
            println!("{}", total);
            0
        }
        Err(e) => {
            eprintln!("❌ Error counting diaries: {}", e);
            1
        }
    }
}

async fn handle_purge(pool: &MySqlPool, days: u32) -> i32 {
    match maintenance::purge_older_than(pool, days).await {
        Ok(true) => {
            println!("✅ Purged diaries older than {} days", days);
            0
        }
        Ok(false) => {
            println!("Nothing older than {} days", days);
            0
        }
        Err(e) => {
            eprintln!("❌ Error purging diaries: {}", e);
            1
        }
    }
}

async fn handle_restore(pool: &MySqlPool, file: &std::path::Path) -> i32 {
    let contents = match tokio::fs::read_to_string(file).await {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("❌ Cannot read {}: {}", file.display(), e);
            return 1;
        }
    };

    let entries = match maintenance::parse_restore_file(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("❌ Invalid restore file: {}", e);
            return 1;
        }
    };

    match maintenance::restore(pool, &entries).await {
        Ok(changed) => {
            println!(
                "✅ Restored {} diaries ({} inserted or changed)",
                entries.len(),
                changed
            );
            0
        }
        Err(e) => {
            eprintln!("❌ Error restoring diaries (nothing was written): {}", e);
            1
        }
    }
}
