mod error;
mod config;
mod input;
mod view;
mod session;
mod files;
mod opener;
mod captcha;
mod app;
mod cli;

#[cfg(test)]
mod test_support;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    use tracing_subscriber::{FmtSubscriber, EnvFilter};

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .expect("failed to initialize global tracing subscriber");

    if let Err(err) = cli::start().await {
        println!("{}", err);
    }
}
