pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppContext;

#[derive(Parser)]
#[command(name = "shop-admin")]
#[command(about = "shop-admin - back-office client for the shop admin API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Select the API server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Sign in, sign out, and session information")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Open a path through the route guard and show the resulting screen")]
    Open {
        #[arg(help = "Path such as /orders")]
        path: String,
    },

    #[command(about = "User management (admin only)")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UsersCommands,
    },

    #[command(about = "Customer records")]
    Customers {
        #[command(subcommand)]
        cmd: commands::customers::CustomersCommands,
    },

    #[command(about = "Product catalogue")]
    Products {
        #[command(subcommand)]
        cmd: commands::products::ProductsCommands,
    },

    #[command(about = "Orders")]
    Orders {
        #[command(subcommand)]
        cmd: commands::orders::OrdersCommands,
    },

    #[command(about = "KPIs, recent orders and sales charts")]
    Dashboard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let app_config = crate::config::config();
    let dir = config::get_config_dir(app_config)?;

    // Server selection works without a session.
    let command = match cli.command {
        Commands::Server { cmd } => return commands::server::handle(cmd, &dir, output_format).await,
        other => other,
    };

    let effective = config::effective_config(app_config, &dir)?;
    let jar = Arc::new(config::load_cookies(&dir)?);
    let ctx = AppContext::new(&effective, jar.clone())?;
    ctx.start().await;

    let result = match command {
        Commands::Server { .. } => Ok(()),
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format).await,
        Commands::Open { path } => commands::open::handle(&path, &ctx, output_format).await,
        Commands::Users { cmd } => commands::users::handle(cmd, &ctx, output_format).await,
        Commands::Customers { cmd } => commands::customers::handle(cmd, &ctx, output_format).await,
        Commands::Products { cmd } => commands::products::handle(cmd, &ctx, output_format).await,
        Commands::Orders { cmd } => commands::orders::handle(cmd, &ctx, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(&ctx, output_format).await,
    };

    // Renewals and sign-outs change the jar even when the command fails.
    config::save_cookies(&dir, &jar)?;
    result
}
