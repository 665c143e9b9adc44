use clap::Subcommand;
use serde_json::json;
use std::path::Path;
use url::Url;

use crate::cli::config::{load_server_config, save_server_config};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Use this API base URL for every later command")]
    Set {
        #[arg(help = "API base URL, e.g. http://localhost:5000/api")]
        url: String,
    },

    #[command(about = "Show the API base URL in use")]
    Show,
}

pub async fn handle(cmd: ServerCommands, dir: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            let parsed = Url::parse(url.trim())?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("Unsupported scheme '{}': use http or https", parsed.scheme());
            }

            let mut server = load_server_config(dir)?;
            server.api_url = Some(parsed.to_string());
            save_server_config(dir, &server)?;

            output_success(
                &output_format,
                &format!("Using server {}", parsed),
                Some(json!({ "api_url": parsed.to_string() })),
            )
        }
        ServerCommands::Show => {
            let server = load_server_config(dir)?;
            let (url, source) = match server.api_url {
                Some(url) => (url, "saved"),
                None => (crate::config::config().client.api_url.clone(), "environment"),
            };
            output_success(
                &output_format,
                &format!("Server: {} ({})", url, source),
                Some(json!({ "api_url": url, "source": source })),
            )
        }
    }
}
