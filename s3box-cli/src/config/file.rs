use std::path::{Path, PathBuf};
use std::io::ErrorKind;

use serde::Deserialize;

use crate::error::{self, Context};

#[derive(Debug, Default, Deserialize)]
pub struct Identity {
    pub user_pool_id: Option<String>,
    pub client_id: Option<String>,
    pub endpoint: Option<String>,
}

/// all values are in milliseconds
#[derive(Debug, Default, Deserialize)]
pub struct Timing {
    pub refresh_delay: Option<u64>,
    pub banner_timeout: Option<u64>,
    pub sign_in_pause: Option<u64>,
    pub sign_up_prefill: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Demo {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Root {
    pub gateway_url: Option<String>,
    pub identity: Option<Identity>,
    pub timing: Option<Timing>,
    pub demo: Option<Demo>,
}

pub fn resolve_path<B, N>(path: PathBuf, base: B, name: &N) -> error::Result<PathBuf>
where
    B: AsRef<Path>,
    N: std::fmt::Display + ?Sized,
{
    let resolve = if path.is_absolute() {
        path
    } else {
        base.as_ref().join(path)
    };

    match resolve.canonicalize() {
        Ok(p) => Ok(p),
        Err(err) => match err.kind() {
            ErrorKind::NotFound => Err(error::Error::new()
                .context(format!("failed to resolve the desired file path ({})", name))),
            _ => Err(error::Error::new()
                .context(format!("io error when attempting to resolve a file path ({})", name))
                .source(err))
        }
    }
}

pub fn load(path: PathBuf) -> error::Result<Root> {
    let cwd = std::env::current_dir()
        .context("failed to retrieve the current working directory")?;
    let config_path = resolve_path(path, &cwd, "config file path")?;

    let Some(ext) = config_path.extension() else {
        return Err(error::Error::new()
            .context("failed to retrieve the file extension of the config file"));
    };

    let ext = ext.to_ascii_lowercase();
    let file = std::fs::OpenOptions::new()
        .read(true)
        .open(&config_path)
        .context("failed to open the specified config file")?;
    let reader = std::io::BufReader::new(file);

    tracing::debug!("loading config file {}", config_path.display());

    if ext.eq("yaml") || ext.eq("yml") {
        serde_yaml::from_reader(reader)
            .context("there was an error when attempting to parse the yaml config file")
    } else if ext.eq("json") {
        serde_json::from_reader(reader)
            .context("there was an error when attempting to parse the json config file")
    } else {
        Err(error::Error::new()
            .context("the specified config type is not yaml or json"))
    }
}
