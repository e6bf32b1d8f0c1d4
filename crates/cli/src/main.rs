//! Phone dialer CLI - data directory management tools.
//!
//! # Usage
//!
//! ```bash
//! # Write any missing documents (seed accounts, empty pool)
//! dialer-cli init
//!
//! # Manage accounts
//! dialer-cli users list
//! dialer-cli users create -u sales4 -p secret -r salesperson -n "Salesperson 4"
//! dialer-cli users delete sales4
//!
//! # Manage the shared pool
//! dialer-cli pool import numbers.txt
//! dialer-cli pool show
//! dialer-cli pool clear
//! dialer-cli distribute
//!
//! # Delete every document
//! dialer-cli data clear
//! ```
//!
//! Every command reads `--data-dir` (or `DIALER_DATA_DIR`), the same
//! directory the server uses.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use phone_dialer_server::store::JsonStore;

mod commands;

#[derive(Parser)]
#[command(name = "dialer-cli")]
#[command(author, version, about = "Phone dialer CLI tools")]
struct Cli {
    /// Directory holding the JSON documents
    #[arg(long, env = "DIALER_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write any missing documents
    Init,
    /// Manage accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Manage the shared phone pool
    Pool {
        #[command(subcommand)]
        action: PoolAction,
    },
    /// Distribute the pool over every salesperson
    Distribute,
    /// Whole-directory maintenance
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List accounts
    List,
    /// Create an account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Role (`admin`, `salesperson`)
        #[arg(short, long, default_value = "salesperson")]
        role: String,

        /// Display name (defaults to the username)
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Delete an account
    Delete {
        /// Login name
        username: String,
    },
}

#[derive(Subcommand)]
enum PoolAction {
    /// Extract numbers from a text file and add the new ones
    Import {
        /// Text or CSV file
        file: PathBuf,
    },
    /// Show the pool
    Show,
    /// Empty the pool
    Clear,
}

#[derive(Subcommand)]
enum DataAction {
    /// Delete every document
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let store = JsonStore::new(cli.data_dir);

    match cli.command {
        Commands::Init => commands::data::init(&store).await?,
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list(&store).await?,
            UsersAction::Create {
                username,
                password,
                role,
                name,
            } => commands::users::create(&store, username, password, &role, name).await?,
            UsersAction::Delete { username } => {
                commands::users::delete(&store, &username).await?;
            }
        },
        Commands::Pool { action } => match action {
            PoolAction::Import { file } => commands::pool::import(&store, &file).await?,
            PoolAction::Show => commands::pool::show(&store).await?,
            PoolAction::Clear => commands::pool::clear(&store).await?,
        },
        Commands::Distribute => commands::pool::distribute(&store).await?,
        Commands::Data { action } => match action {
            DataAction::Clear => commands::data::clear(&store).await?,
        },
    }
    Ok(())
}
