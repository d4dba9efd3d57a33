use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use url::Url;

use crate::error::{self, Context};

mod file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    /// wait before re-listing after an upload, the listing may lag behind
    pub refresh_delay: Duration,
    pub banner_timeout: Duration,
    /// pause after a successful sign in so the banner can be read
    pub sign_in_pause: Duration,
    pub sign_up_prefill: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            refresh_delay: Duration::from_millis(1000),
            banner_timeout: Duration::from_millis(8000),
            sign_in_pause: Duration::from_millis(1000),
            sign_up_prefill: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub user_pool_id: String,
    pub client_id: String,
    pub endpoint: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demo {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gateway_url: Url,
    pub identity: Identity,
    pub timing: Timing,
    pub demo: Option<Demo>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// the config file to load
    ///
    /// yaml (.yaml | .yml) and json (.json) files are supported. values
    /// given on the command line take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// invoke url of the api gateway, including the stage
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// id of the identity provider user pool
    #[arg(long)]
    pub user_pool_id: Option<String>,

    /// app client id of the identity provider
    #[arg(long)]
    pub client_id: Option<String>,

    /// overrides the identity provider endpoint derived from the pool id
    #[arg(long)]
    pub identity_endpoint: Option<String>,
}

fn parse_url(given: &str, name: &str) -> error::Result<Url> {
    Url::parse(given).context(format!("{} is not a valid url", name))
}

pub fn get_config(args: ConfigArgs) -> error::Result<Config> {
    let root = if let Some(file_path) = args.config {
        file::load(file_path)?
    } else {
        file::Root::default()
    };

    let file_identity = root.identity.unwrap_or_default();

    let gateway_url = args.gateway_url
        .or(root.gateway_url)
        .context("no gateway url was provided")?;
    let user_pool_id = args.user_pool_id
        .or(file_identity.user_pool_id)
        .context("no user pool id was provided")?;
    let client_id = args.client_id
        .or(file_identity.client_id)
        .context("no client id was provided")?;
    let endpoint = match args.identity_endpoint.or(file_identity.endpoint) {
        Some(given) => Some(parse_url(&given, "identity endpoint")?),
        None => None,
    };

    let mut timing = Timing::default();

    if let Some(file_timing) = root.timing {
        if let Some(ms) = file_timing.refresh_delay {
            timing.refresh_delay = Duration::from_millis(ms);
        }

        if let Some(ms) = file_timing.banner_timeout {
            timing.banner_timeout = Duration::from_millis(ms);
        }

        if let Some(ms) = file_timing.sign_in_pause {
            timing.sign_in_pause = Duration::from_millis(ms);
        }

        if let Some(ms) = file_timing.sign_up_prefill {
            timing.sign_up_prefill = Duration::from_millis(ms);
        }
    }

    let rtn = Config {
        gateway_url: parse_url(&gateway_url, "gateway url")?,
        identity: Identity {
            user_pool_id,
            client_id,
            endpoint,
        },
        timing,
        demo: root.demo.map(|demo| Demo {
            email: demo.email,
            password: demo.password,
        }),
    };

    tracing::debug!("{:#?}", rtn.timing);

    Ok(rtn)
}

#[cfg(test)]
mod test {
    use super::*;

    fn args() -> ConfigArgs {
        ConfigArgs {
            config: None,
            gateway_url: Some(String::from("http://localhost:3000/prod")),
            user_pool_id: Some(String::from("us-east-1_abc")),
            client_id: Some(String::from("client")),
            identity_endpoint: None,
        }
    }

    #[test]
    fn arguments_only() {
        let config = get_config(args()).unwrap();

        assert_eq!(config.gateway_url.as_str(), "http://localhost:3000/prod");
        assert_eq!(config.identity.user_pool_id, "us-east-1_abc");
        assert_eq!(config.timing, Timing::default());
        assert!(config.demo.is_none());
    }

    #[test]
    fn missing_values() {
        let mut no_gateway = args();
        no_gateway.gateway_url = None;

        let mut no_client = args();
        no_client.client_id = None;

        let mut bad_endpoint = args();
        bad_endpoint.identity_endpoint = Some(String::from("not a url"));

        assert!(get_config(no_gateway).is_err());
        assert!(get_config(no_client).is_err());
        assert!(get_config(bad_endpoint).is_err());
    }

    #[test]
    fn default_timing() {
        let timing = Timing::default();

        assert_eq!(timing.refresh_delay, Duration::from_secs(1));
        assert_eq!(timing.banner_timeout, Duration::from_secs(8));
        assert_eq!(timing.sign_in_pause, Duration::from_secs(1));
        assert_eq!(timing.sign_up_prefill, Duration::from_secs(2));
    }
}
