use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// blocking style questions asked of the user in the middle of an action
#[async_trait]
pub trait Prompt: Send + Sync {
    async fn confirm(&self, question: &str) -> bool;

    fn alert(&self, text: &str);
}

/// line based stdin shared by the interactive loop and any prompts issued
/// while a command runs
pub struct Terminal {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Terminal {
    pub fn new() -> Self {
        Terminal {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines())
        }
    }

    /// writes the prompt and waits for the next line. None once stdin closes
    pub async fn read_line<P>(&self, prompt: P) -> std::io::Result<Option<String>>
    where
        P: AsRef<str>
    {
        {
            let mut stdout = std::io::stdout();

            stdout.write_all(prompt.as_ref().as_bytes())?;
            stdout.flush()?;
        }

        self.lines.lock().await.next_line().await
    }

    pub async fn read_trimmed<P>(&self, prompt: P) -> std::io::Result<Option<String>>
    where
        P: AsRef<str>
    {
        Ok(self.read_line(prompt).await?.map(|v| v.trim().to_owned()))
    }

    pub async fn read_yn<P>(&self, prefix: P) -> std::io::Result<bool>
    where
        P: std::fmt::Display
    {
        let prompt = format!("{} [y|n]: ", prefix);
        let Some(result) = self.read_trimmed(prompt).await? else {
            return Ok(false);
        };

        if let Some(first) = result.chars().next() {
            Ok(first.to_ascii_lowercase() == 'y')
        } else {
            Ok(false)
        }
    }

    /// reads a password without echo. the read blocks so it is moved off of
    /// the runtime thread
    pub async fn read_password<P>(&self, prompt: P) -> std::io::Result<String>
    where
        P: Into<String>
    {
        let prompt = prompt.into();

        tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt))
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Terminal::new()
    }
}

#[async_trait]
impl Prompt for Terminal {
    async fn confirm(&self, question: &str) -> bool {
        match self.read_yn(question).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!("failed to read confirmation: {}", err);

                false
            }
        }
    }

    fn alert(&self, text: &str) {
        println!("{}", text);
    }
}
