//! CLI administration tool for link-shortener.
//!
//! Runs the same services as the HTTP API directly against PostgreSQL.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL, optionally with a custom hash
//! cargo run --bin admin -- link create https://example.com/spring --hash "Spring Sale"
//!
//! # Resolve a hash id or custom hash
//! cargo run --bin admin -- link show springSale
//!
//! # Find the link for a URL
//! cargo run --bin admin -- link find example.com/spring
//!
//! # Delete a link
//! cargo run --bin admin -- link delete springSale
//!
//! # Create a user
//! cargo run --bin admin -- user create alice
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `BASE_URL` (required): public base URL of the service
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection

use link_shortener::application::services::{CreateLink, LinkOutcome};
use link_shortener::config::{self, Config};
use link_shortener::domain::entities::Link;
use link_shortener::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use link_shortener::server::{build_processor, connect_database};
use link_shortener::state::{AppState, DynLinkService};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Shorten a URL
    Create {
        /// Destination URL (prompted for if omitted)
        url: Option<String>,

        /// Custom hash for a branded URL
        #[arg(long)]
        hash: Option<String>,

        /// Id of the creating user
        #[arg(long)]
        creator: Option<i64>,
    },

    /// Show a link by hash id or custom hash
    Show { token: String },

    /// Find the link for a URL
    Find { url: String },

    /// Delete a link by hash id or custom hash
    Delete {
        token: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user
    Create { username: Option<String> },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL or DB_HOST must be set")?;

    let pool = connect_database(&config, &database_url).await?;
    let state = build_state(&config, &pool)?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &state).await?,
        Commands::User { action } => handle_user_action(action, &state).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn build_state(config: &Config, pool: &PgPool) -> Result<AppState> {
    let pool = Arc::new(pool.clone());

    Ok(AppState::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(build_processor(config)?),
    ))
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, state: &AppState) -> Result<()> {
    let service = state.link_service.as_ref();

    match action {
        LinkAction::Create { url, hash, creator } => {
            create_link(service, url, hash, creator).await?;
        }
        LinkAction::Show { token } => {
            let link = service
                .get_by_hash_id(&token)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            print_link(service, &link);
        }
        LinkAction::Find { url } => {
            match service
                .find_by_url(&url)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?
            {
                Some(link) => print_link(service, &link),
                None => println!("{}", "No link points at this URL".yellow()),
            }
        }
        LinkAction::Delete { token, yes } => {
            delete_link(service, token, yes).await?;
        }
    }

    Ok(())
}

async fn create_link(
    service: &DynLinkService,
    url: Option<String>,
    hash: Option<String>,
    creator_id: Option<i64>,
) -> Result<()> {
    println!("{}", "🔗 Create Link".bright_blue().bold());
    println!();

    let original_url = match url {
        Some(u) => u,
        None => Input::new().with_prompt("URL").interact_text()?,
    };

    let outcome = service
        .create_link(CreateLink {
            original_url,
            hash,
            creator_id,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    match outcome {
        LinkOutcome::Created(ref link) => {
            println!("{}", "✅ Link created".green().bold());
            print_link(service, link);
        }
        LinkOutcome::Existing(ref link) => {
            println!("{}", "ℹ️  Link already exists".yellow());
            print_link(service, link);
        }
    }

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(service: &DynLinkService, token: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = service
        .get_by_hash_id(&token)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    print_link(service, &link);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(&token)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    Ok(())
}

fn print_link(service: &DynLinkService, link: &Link) {
    println!();
    println!("  ID:        {}", link.id.to_string().bright_black());
    println!("  Hash id:   {}", service.hash_id(link).cyan());
    if let Some(ref hash) = link.hash {
        println!("  Hash:      {}", hash.cyan());
    }
    println!("  URL:       {}", link.original_url.bright_white());
    println!(
        "  Short:     {}",
        service.shortened_url(link).bright_yellow().bold()
    );
    if let Some(branded) = service.branded_url(link) {
        println!("  Branded:   {}", branded.bright_yellow().bold());
    }
    if let Some(creator_id) = link.creator_id {
        println!("  Creator:   {}", creator_id.to_string().bright_black());
    }
    println!(
        "  Created:   {}",
        link.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();
}

async fn handle_user_action(action: UserAction, state: &AppState) -> Result<()> {
    match action {
        UserAction::Create { username } => {
            let username = match username {
                Some(u) => u,
                None => Input::new().with_prompt("Username").interact_text()?,
            };

            let user = state
                .user_service
                .create_user(&username)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

            println!(
                "{} {} (id {})",
                "✅ User created:".green().bold(),
                user.username.cyan(),
                user.id.to_string().bright_white()
            );
        }
    }

    Ok(())
}

/// Displays link and user counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let branded_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE hash IS NOT NULL")
            .fetch_one(pool)
            .await?;

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:         {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Branded links: {}",
        branded_count.to_string().bright_green().bold()
    );
    println!(
        "  Users:         {}",
        users_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
