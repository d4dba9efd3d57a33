//! which section is active, the transient status banner and the rendered
//! file list.
//!
//! state changes are pushed to a [`Surface`] as they happen. the terminal
//! surface prints them, tests record them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use s3box_api::files::FileRecord;
use s3box_lib::format::{display_name, format_file_size, format_timestamp};
use s3box_lib::role::Role;

pub const EMPTY_STATE: &str = "No files found. Upload your first file!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    SignIn,
    SignUp,
    Upload,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::SignIn => write!(f, "sign in"),
            Section::SignUp => write!(f, "sign up"),
            Section::Upload => write!(f, "files"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub key: String,
    pub name: String,
    pub size: String,
    pub modified: String,
}

impl From<FileRecord> for FileRow {
    fn from(record: FileRecord) -> Self {
        FileRow {
            name: display_name(&record.key).to_owned(),
            size: format_file_size(record.size),
            modified: format_timestamp(&record.last_modified),
            key: record.key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Empty,
    Files(Vec<FileRow>),
}

impl Listing {
    pub fn from_records(records: Vec<FileRecord>) -> Self {
        if records.is_empty() {
            Listing::Empty
        } else {
            Listing::Files(records.into_iter().map(FileRow::from).collect())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Section(Section, Option<Profile>),
    Banner(Banner),
    BannerHidden,
    Listing(Listing),
    FileSelected(PathBuf),
    FileInputCleared,
    SignInPrefilled(String),
}

pub trait Surface: Send + Sync {
    fn render(&self, event: &ViewEvent);
}

#[derive(Debug)]
struct ViewState {
    section: Section,
    profile: Option<Profile>,
    banner: Option<Banner>,
    listing: Option<Listing>,
    selected_file: Option<PathBuf>,
    sign_in_email: Option<String>,
}

#[derive(Clone)]
pub struct View {
    state: Arc<Mutex<ViewState>>,
    surface: Arc<dyn Surface>,
    banner_timeout: Duration,
}

impl View {
    pub fn new(surface: Arc<dyn Surface>, banner_timeout: Duration) -> Self {
        View {
            state: Arc::new(Mutex::new(ViewState {
                section: Section::SignIn,
                profile: None,
                banner: None,
                listing: None,
                selected_file: None,
                sign_in_email: None,
            })),
            surface,
            banner_timeout,
        }
    }

    fn activate(&self, section: Section, profile: Option<Profile>) {
        {
            let mut state = self.state.lock();
            state.section = section;
            state.profile = profile.clone();
            state.banner = None;
        }

        tracing::debug!("active section {:?}", section);

        self.surface.render(&ViewEvent::Section(section, profile));
        self.surface.render(&ViewEvent::BannerHidden);
    }

    pub fn show_sign_in(&self) {
        self.activate(Section::SignIn, None);
    }

    pub fn show_sign_up(&self) {
        self.activate(Section::SignUp, None);
    }

    pub fn show_upload(&self, profile: Profile) {
        self.activate(Section::Upload, Some(profile));
    }

    /// shows the banner right away and hides it once the banner timeout
    /// passes. a later message does not push back an earlier pending hide.
    pub fn show_message<T>(&self, kind: MessageKind, text: T)
    where
        T: Into<String>
    {
        let banner = Banner {
            kind,
            text: text.into(),
        };

        self.state.lock().banner = Some(banner.clone());
        self.surface.render(&ViewEvent::Banner(banner));

        let state = self.state.clone();
        let surface = self.surface.clone();
        let timeout = self.banner_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            state.lock().banner = None;
            surface.render(&ViewEvent::BannerHidden);
        });
    }

    pub fn success<T>(&self, text: T)
    where
        T: Into<String>
    {
        self.show_message(MessageKind::Success, text);
    }

    pub fn error<T>(&self, text: T)
    where
        T: Into<String>
    {
        self.show_message(MessageKind::Error, text);
    }

    /// replaces the whole rendered file list
    pub fn render_files(&self, records: Vec<FileRecord>) {
        let listing = Listing::from_records(records);

        self.state.lock().listing = Some(listing.clone());
        self.surface.render(&ViewEvent::Listing(listing));
    }

    pub fn select_file<P>(&self, path: P)
    where
        P: Into<PathBuf>
    {
        let path = path.into();

        self.state.lock().selected_file = Some(path.clone());
        self.surface.render(&ViewEvent::FileSelected(path));
    }

    pub fn clear_file_input(&self) {
        self.state.lock().selected_file = None;
        self.surface.render(&ViewEvent::FileInputCleared);
    }

    pub fn prefill_sign_in<E>(&self, email: E)
    where
        E: Into<String>
    {
        let email = email.into();

        self.state.lock().sign_in_email = Some(email.clone());
        self.surface.render(&ViewEvent::SignInPrefilled(email));
    }

    /// renders the active section again along with the banner still up and,
    /// in the file section, the last listing
    pub fn redraw(&self) {
        let (section, profile, banner, listing) = {
            let state = self.state.lock();

            (
                state.section,
                state.profile.clone(),
                state.banner.clone(),
                state.listing.clone(),
            )
        };

        self.surface.render(&ViewEvent::Section(section, profile));

        if let Some(banner) = banner {
            self.surface.render(&ViewEvent::Banner(banner));
        }

        if section == Section::Upload {
            if let Some(listing) = listing {
                self.surface.render(&ViewEvent::Listing(listing));
            }
        }
    }

    pub fn section(&self) -> Section {
        self.state.lock().section
    }

    #[cfg(test)]
    pub fn profile(&self) -> Option<Profile> {
        self.state.lock().profile.clone()
    }

    #[cfg(test)]
    pub fn banner(&self) -> Option<Banner> {
        self.state.lock().banner.clone()
    }

    #[cfg(test)]
    pub fn listing(&self) -> Option<Listing> {
        self.state.lock().listing.clone()
    }

    pub fn selected_file(&self) -> Option<PathBuf> {
        self.state.lock().selected_file.clone()
    }

    pub fn sign_in_email(&self) -> Option<String> {
        self.state.lock().sign_in_email.clone()
    }
}

/// prints view changes to stdout
pub struct TerminalSurface;

impl TerminalSurface {
    fn write_listing(listing: &Listing) {
        match listing {
            Listing::Empty => println!("{}", EMPTY_STATE),
            Listing::Files(rows) => {
                let name_width = rows.iter()
                    .map(|row| row.name.chars().count())
                    .max()
                    .unwrap_or(0);
                let size_width = rows.iter()
                    .map(|row| row.size.len())
                    .max()
                    .unwrap_or(0);

                for row in rows {
                    println!(
                        "{:name_width$}  {:>size_width$}  {}  {}",
                        row.name,
                        row.size,
                        row.modified,
                        row.key,
                    );
                }
            }
        }
    }
}

impl Surface for TerminalSurface {
    fn render(&self, event: &ViewEvent) {
        match event {
            ViewEvent::Section(section, profile) => match profile {
                Some(profile) => println!("[{}] {} ({})", section, profile.email, profile.role),
                None => println!("[{}]", section),
            },
            ViewEvent::Banner(banner) => match banner.kind {
                MessageKind::Success => println!("{}", banner.text),
                MessageKind::Error => eprintln!("error: {}", banner.text),
            },
            ViewEvent::Listing(listing) => Self::write_listing(listing),
            ViewEvent::FileSelected(path) => println!("selected {}", path.display()),
            ViewEvent::SignInPrefilled(email) => println!("sign in email set to {}", email),
            ViewEvent::BannerHidden |
            ViewEvent::FileInputCleared => {}
        }
    }
}
