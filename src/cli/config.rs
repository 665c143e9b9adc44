use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::http::SessionJar;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Overrides the environment's API URL when set.
    pub api_url: Option<String>,
}

pub fn get_config_dir(app: &AppConfig) -> anyhow::Result<PathBuf> {
    let config_dir = match &app.cli.config_dir {
        Some(dir) => dir.clone(),
        None => {
            let home = std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("shop-admin")
        }
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn load_json<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_server_config(dir: &Path) -> anyhow::Result<ServerConfig> {
    load_json(&dir.join("server.json"))
}

pub fn save_server_config(dir: &Path, config: &ServerConfig) -> anyhow::Result<()> {
    save_json(&dir.join("server.json"), config)
}

pub fn load_cookies(dir: &Path) -> anyhow::Result<SessionJar> {
    let path = dir.join("cookies.json");
    if !path.exists() {
        return Ok(SessionJar::new());
    }
    let file = BufReader::new(fs::File::open(path)?);
    Ok(SessionJar::load_json(file)?)
}

pub fn save_cookies(dir: &Path, jar: &SessionJar) -> anyhow::Result<()> {
    let mut file = fs::File::create(dir.join("cookies.json"))?;
    jar.save_json(&mut file)?;
    Ok(())
}

/// Environment config with the saved server selection applied.
pub fn effective_config(app: &AppConfig, dir: &Path) -> anyhow::Result<AppConfig> {
    let server = load_server_config(dir)?;
    Ok(match server.api_url {
        Some(url) => app.clone().with_api_url(url),
        None => app.clone(),
    })
}
