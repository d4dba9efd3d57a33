use std::path::PathBuf;
use std::sync::Arc;

use s3box_api::client::ApiClient;
use s3box_api::client::identity::{CognitoClient, IdentityProvider};
use s3box_lib::captcha::Verdict;

use crate::captcha::Captcha;
use crate::cli::{BaseCmds, ShowSection};
use crate::config::Config;
use crate::error::{self, ActionResult, Context};
use crate::files::Files;
use crate::input::Terminal;
use crate::opener::{Opener, PrintOpener, SaveOpener};
use crate::session::{Auth, SessionContext};
use crate::view::{Surface, View};

/// everything a running client needs. the session lives here and nowhere
/// else, so it goes away with the process.
pub struct App {
    view: View,
    session: SessionContext,
    auth: Auth,
    files: Files,
    captcha: Captcha,
    terminal: Arc<Terminal>,
    interactive: bool,
}

impl App {
    pub fn new(config: Config, terminal: Arc<Terminal>, surface: Arc<dyn Surface>) -> error::Result<Self> {
        let mut api_builder = ApiClient::builder();
        api_builder.base_url(config.gateway_url.as_str())
            .context("invalid gateway url")?;

        let api = api_builder.build()
            .context("failed to create api client")?;

        let provider: Arc<dyn IdentityProvider> = match config.identity.endpoint {
            Some(endpoint) => Arc::new(CognitoClient::with_endpoint(endpoint, config.identity.client_id)
                .context("failed to create identity client")?),
            None => Arc::new(CognitoClient::new(&config.identity.user_pool_id, config.identity.client_id)
                .context("failed to create identity client")?),
        };

        let view = View::new(surface, config.timing.banner_timeout);
        let session = SessionContext::new();
        let files = Files::new(
            api,
            session.clone(),
            view.clone(),
            terminal.clone(),
            config.timing.refresh_delay,
        );
        let auth = Auth::new(
            provider,
            session.clone(),
            view.clone(),
            files.clone(),
            config.timing,
        );

        Ok(App {
            view,
            session,
            auth,
            files,
            captcha: Captcha::new(config.demo),
            terminal,
            interactive: true,
        })
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// one shot commands wait for delayed work before the process exits
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub async fn handle(&mut self, command: BaseCmds) -> error::Result {
        match command {
            BaseCmds::Signup { email, admin } => self.sign_up(email, admin).await,
            BaseCmds::Signin { email } => self.sign_in(email).await,
            BaseCmds::Signout => {
                self.auth.sign_out().await;

                Ok(())
            },
            BaseCmds::Select { path } => self.select(path).await,
            BaseCmds::Upload { path, key } => self.upload(path, key).await,
            BaseCmds::List { prefix } => report(self.files.list(prefix).await),
            BaseCmds::Download { key, output } => {
                let opener: Box<dyn Opener> = match output {
                    Some(path) => Box::new(SaveOpener::new(path)),
                    None => Box::new(PrintOpener),
                };

                report(self.files.download(&key, opener.as_ref()).await)
            },
            BaseCmds::Delete { key } => report(self.files.delete(&key).await),
            BaseCmds::Captcha => self.captcha().await,
            BaseCmds::Show { section } => {
                match section {
                    ShowSection::SignIn => self.view.show_sign_in(),
                    ShowSection::SignUp => self.view.show_sign_up(),
                }

                Ok(())
            },
            BaseCmds::Status => {
                self.view.redraw();

                Ok(())
            },
            BaseCmds::Whoami => {
                match self.session.profile() {
                    Some(profile) => println!("{} ({})", profile.email, profile.role),
                    None => println!("not signed in"),
                }

                Ok(())
            },
        }
    }

    async fn read_email(&self, given: Option<String>) -> error::Result<String> {
        if let Some(email) = given {
            return Ok(email);
        }

        let prompt = match self.view.sign_in_email() {
            Some(prefilled) => format!("email [{}]: ", prefilled),
            None => String::from("email: "),
        };

        let entered = self.terminal.read_trimmed(prompt)
            .await?
            .unwrap_or_default();

        if entered.is_empty() {
            Ok(self.view.sign_in_email().unwrap_or_default())
        } else {
            Ok(entered)
        }
    }

    async fn sign_up(&mut self, email: Option<String>, admin: bool) -> error::Result {
        let email = match email {
            Some(email) => email,
            None => self.terminal.read_trimmed("email: ")
                .await?
                .unwrap_or_default(),
        };
        let password = self.terminal.read_password("password: ").await?;

        report(self.auth.sign_up(&email, &password, admin).await)
    }

    pub async fn sign_in(&mut self, email: Option<String>) -> error::Result {
        let email = self.read_email(email).await?;
        let password = self.terminal.read_password("password: ").await?;

        report(self.auth.sign_in(&email, &password).await)
    }

    async fn select(&mut self, path: PathBuf) -> error::Result {
        let metadata = tokio::fs::metadata(&path)
            .await
            .context(format!("failed to retrieve metadata for {}", path.display()))?;

        if !metadata.is_file() {
            return Err(error::Error::from("requested file path is not a file"));
        }

        self.view.select_file(path);

        Ok(())
    }

    async fn upload(&mut self, path: Option<PathBuf>, key: Option<String>) -> error::Result {
        if let Some(path) = path {
            self.select(path).await?;
        }

        match self.files.upload(key).await {
            Ok(uploaded) => {
                tracing::debug!("stored upload as {}", uploaded.s3_key);

                if !self.interactive {
                    uploaded.refresh.await
                        .context("listing refresh did not complete")?;
                }

                Ok(())
            },
            Err(err) => report::<()>(Err(err)),
        }
    }

    async fn captcha(&mut self) -> error::Result {
        loop {
            if let Some(demo) = self.captcha.credentials() {
                match demo {
                    Some(demo) => {
                        println!("email: {}", demo.email);
                        println!("password: {}", demo.password);
                    },
                    None => println!("no demo credentials are configured"),
                }

                return Ok(());
            }

            let prompt = format!("{} ", self.captcha.challenge());

            let Some(answer) = self.terminal.read_line(prompt).await? else {
                return Ok(());
            };

            if self.captcha.submit(&answer, self.terminal.as_ref()) == Verdict::Correct {
                tracing::debug!("captcha solved after {} challenges", self.captcha.gate().draws());
            }
        }
    }
}

/// action failures have already been shown by the view
fn report<T>(result: ActionResult<T>) -> error::Result {
    if let Err(err) = result {
        tracing::debug!("action failed: {}", err);
    }

    Ok(())
}
