//! CLI administration tool for linkforge.
//!
//! Provides commands for managing API tokens without requiring HTTP API
//! access. A token binds an opaque owner id to a Bearer credential; the raw
//! token is shown exactly once and only its HMAC hash is stored.
//!
//! # Usage
//!
//! ```bash
//! # Mint a token for an owner
//! cargo run --bin admin -- token create --name "CI deploys" --owner user-42
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token by id
//! cargo run --bin admin -- token revoke 3
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required): HMAC key, must match the server's

use linkforge::application::services::AuthService;
use linkforge::domain::repositories::TokenRepository;
use linkforge::infrastructure::persistence::PgTokenRepository;

use anyhow::{Context, Result};
use base64::Engine as _;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkforge.
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
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Mint a new API token for an owner
    Create {
        /// Token name (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Owner id the token authenticates as
        #[arg(short, long)]
        owner: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token by id
    Revoke {
        /// Token id to revoke
        id: i64,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let signing_secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));
    let auth = AuthService::new(repo.clone(), signing_secret);

    match action {
        TokenAction::Create { name, owner, yes } => {
            create_token(repo, &auth, name, owner, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { id } => {
            revoke_token(repo, id).await?;
        }
    }

    Ok(())
}

/// Mints a token, prints it once, and stores only its hash.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    auth: &AuthService,
    name: Option<String>,
    owner: Option<String>,
    yes: bool,
) -> Result<()> {
    let name: String = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Token name").interact_text()?,
    };

    let owner: String = match owner {
        Some(o) => o,
        None => Input::new().with_prompt("Owner id").interact_text()?,
    };

    if !yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Create token '{}' for owner '{}'?", name, owner))
            .default(true)
            .interact()?;
        if !proceed {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    let raw_token = generate_raw_token()?;
    let token_hash = auth.hash_token(&raw_token);

    let created = repo.create_token(&name, &token_hash, &owner).await?;

    println!("{}", "Token created.".green().bold());
    println!("  Id:    {}", created.id);
    println!("  Name:  {}", created.name);
    println!("  Owner: {}", created.owner_id);
    println!();
    println!("  {}", raw_token.bold());
    println!();
    println!(
        "{}",
        "Store this token now — it cannot be recovered later.".yellow()
    );

    Ok(())
}

/// Prints all tokens with their status.
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    let tokens = repo.list_tokens().await?;

    if tokens.is_empty() {
        println!("{}", "No tokens found.".yellow());
        return Ok(());
    }

    println!(
        "{:<6} {:<24} {:<16} {:<12} {}",
        "ID".bold(),
        "NAME".bold(),
        "OWNER".bold(),
        "STATUS".bold(),
        "CREATED".bold()
    );

    for token in tokens {
        let status = if token.revoked_at.is_some() {
            "revoked".red()
        } else {
            "active".green()
        };

        println!(
            "{:<6} {:<24} {:<16} {:<12} {}",
            token.id,
            token.name,
            token.owner_id,
            status,
            token.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Revokes a token after confirmation.
async fn revoke_token(repo: Arc<PgTokenRepository>, id: i64) -> Result<()> {
    let proceed = Confirm::new()
        .with_prompt(format!("Revoke token {}? Clients using it will get 401.", id))
        .default(false)
        .interact()?;

    if !proceed {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    if repo.revoke_token(id).await? {
        println!("{}", format!("Token {} revoked.", id).green());
    } else {
        println!(
            "{}",
            format!("Token {} not found or already revoked.", id).yellow()
        );
    }

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(pool)
                .await
                .context("Database round trip failed")?;
            println!("{}", "Database connection OK.".green());
        }
    }

    Ok(())
}

/// Generates a 256-bit random token, URL-safe base64 without padding.
fn generate_raw_token() -> Result<String> {
    let mut buffer = [0u8; 32];
    getrandom::fill(&mut buffer).context("System RNG failure")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}
