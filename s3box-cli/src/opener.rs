use std::path::PathBuf;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{self, Context};

/// takes over a pre-signed download url, the same way a browser would open
/// it in a new tab
#[async_trait]
pub trait Opener: Send + Sync {
    async fn open(&self, url: &str) -> error::Result;
}

/// prints the url for the user to open
pub struct PrintOpener;

#[async_trait]
impl Opener for PrintOpener {
    async fn open(&self, url: &str) -> error::Result {
        println!("{}", url);

        Ok(())
    }
}

/// streams the object behind the url into a local file
pub struct SaveOpener {
    client: reqwest::Client,
    output: PathBuf,
}

impl SaveOpener {
    pub fn new(output: PathBuf) -> Self {
        SaveOpener {
            client: reqwest::Client::new(),
            output,
        }
    }
}

#[async_trait]
impl Opener for SaveOpener {
    async fn open(&self, url: &str) -> error::Result {
        let res = self.client.get(url)
            .send()
            .await
            .context("failed to request file")?;

        let status = res.status();

        if !status.is_success() {
            return Err(error::Error::from(format!("storage responded with {}", status)));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.output)
            .await
            .context("failed to open output file")?;

        let mut stream = res.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("error when reading file from storage")?;

            file.write_all(&chunk)
                .await
                .context("failed to write to output file")?;

            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .context("failed to flush output file")?;

        tracing::debug!("saved {} bytes to {}", written, self.output.display());

        println!("saved to {}", self.output.display());

        Ok(())
    }
}
