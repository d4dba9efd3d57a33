use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::app::App;
use crate::config::{self, ConfigArgs};
use crate::error;
use crate::input::Terminal;
use crate::view::TerminalSurface;

/// a terminal client for storing files behind an api gateway.
///
/// sign up or sign in with the identity provider and then upload, list,
/// download and delete files. if no command is provided then it will enter
/// interactive mode.
#[derive(Debug, Parser)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// signs in with the given email before running anything else
    ///
    /// the password is always prompted for
    #[arg(long)]
    email: Option<String>,

    #[command(subcommand)]
    command: Option<BaseCmds>,
}

pub async fn start() -> error::Result {
    let args = Cli::parse();

    let config = config::get_config(args.config)?;
    let terminal = Arc::new(Terminal::new());
    let mut app = App::new(config, terminal.clone(), Arc::new(TerminalSurface))?;

    if args.command.is_none() {
        app.view().show_sign_in();
    }

    if let Some(email) = args.email {
        app.sign_in(Some(email)).await?;
    }

    match args.command {
        Some(cmd) => {
            app.set_interactive(false);
            app.handle(cmd).await
        },
        None => Interactive::handle(&mut app, &terminal).await,
    }
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
enum Interactive {
    #[command(flatten)]
    Base(BaseCmds),
    Quit
}

impl Interactive {
    async fn handle(app: &mut App, terminal: &Terminal) -> error::Result {
        loop {
            let prompt = format!("{}> ", app.view().section());

            let Some(given) = terminal.read_line(prompt).await? else {
                break;
            };
            let trimmed = given.trim();

            if trimmed.is_empty() {
                continue;
            }

            let Ok(args_list) = shell_words::split(trimmed) else {
                println!("failed to parse command line args");
                continue;
            };

            let cmd = match Interactive::try_parse_from(args_list) {
                Ok(c) => c,
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
            };

            let result = match cmd {
                Interactive::Base(cmd) => app.handle(cmd).await,
                Interactive::Quit => break,
            };

            if let Err(err) = result {
                println!("{}", err);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShowSection {
    SignIn,
    SignUp,
}

#[derive(Debug, Subcommand)]
pub enum BaseCmds {
    /// creates a new account with the identity provider
    Signup {
        /// email of the new account, prompted for if missing
        email: Option<String>,

        /// requests the admin role
        ///
        /// admin accounts must be approved before they can sign in
        #[arg(long)]
        admin: bool,
    },

    /// signs in and lists the files of the account
    #[command(alias = "login")]
    Signin {
        /// email of the account, defaults to the one entered on sign up
        email: Option<String>,
    },

    /// drops the current session
    #[command(alias = "logout")]
    Signout,

    /// selects a local file for the next upload
    Select {
        path: PathBuf,
    },

    /// uploads the selected file
    Upload {
        /// selects this file before uploading
        path: Option<PathBuf>,

        /// requested storage path, only honored for admins
        #[arg(long)]
        key: Option<String>,
    },

    /// lists the files of the account
    #[command(alias = "ls")]
    List {
        /// only list keys starting with this prefix, only honored for admins
        #[arg(long)]
        prefix: Option<String>,
    },

    /// retrieves a download link for a file
    ///
    /// the link is printed unless an output file is given
    Download {
        /// storage key of the file
        key: String,

        /// saves the file to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// deletes a file after confirming
    Delete {
        /// storage key of the file
        key: String,
    },

    /// solves a captcha to reveal the demo credentials
    Captcha,

    /// switches between the sign in and sign up forms
    Show {
        section: ShowSection,
    },

    /// shows the signed in account
    Whoami,

    /// shows the active section, banner and file list again
    Status,
}
