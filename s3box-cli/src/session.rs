//! sign up, sign in and sign out against the identity provider.
//!
//! the session only ever lives in memory. it is created by a successful sign
//! in and dropped by sign out or when the process exits.

use std::sync::Arc;

use parking_lot::Mutex;
use s3box_api::client::identity::{AuthSession, AuthenticationDetails, IdentityProvider};
use s3box_api::identity::{generated_username, AttributeType};
use s3box_lib::role::{RequestedRole, Role};
use s3box_lib::validation::check_credentials;
use tokio::task::JoinHandle;

use crate::config::Timing;
use crate::error::{ActionError, ActionResult};
use crate::files::Files;
use crate::view::{Profile, View};

pub const ADMIN_PENDING: &str = "Admin request submitted! Your account will be activated after manual approval. Please contact the administrator.";
pub const ACCOUNT_CREATED: &str = "Account created successfully! You can now sign in with your email.";

pub struct Session {
    token: String,
    email: String,
    role: Role,
    handle: AuthSession,
}

impl Session {
    pub fn new<E>(email: E, handle: AuthSession) -> Self
    where
        E: Into<String>
    {
        Session {
            token: handle.id_token().jwt().to_owned(),
            role: handle.id_token().claims().role(),
            email: email.into(),
            handle,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn profile(&self) -> Profile {
        Profile {
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// shared holder of the current session, passed to everything that needs the
/// bearer token
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<Mutex<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        SessionContext::default()
    }

    pub fn establish(&self, session: Session) {
        *self.inner.lock() = Some(session);
    }

    pub fn teardown(&self) -> Option<Session> {
        self.inner.lock().take()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.lock()
            .as_ref()
            .map(|session| session.token().to_owned())
    }

    pub fn profile(&self) -> Option<Profile> {
        self.inner.lock()
            .as_ref()
            .map(Session::profile)
    }
}

pub enum SignUpOutcome {
    /// admin accounts wait for someone to approve them
    PendingApproval,
    /// the sign in form gets the email once the prefill delay passes
    Created {
        prefill: JoinHandle<()>,
    },
}

#[derive(Clone)]
pub struct Auth {
    provider: Arc<dyn IdentityProvider>,
    session: SessionContext,
    view: View,
    files: Files,
    timing: Timing,
}

impl Auth {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        session: SessionContext,
        view: View,
        files: Files,
        timing: Timing,
    ) -> Self {
        Auth {
            provider,
            session,
            view,
            files,
            timing,
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str, admin: bool) -> ActionResult<SignUpOutcome> {
        if let Err(err) = check_credentials(email, password) {
            self.view.error(err.to_string());

            return Err(err.into());
        }

        let role = RequestedRole::from_admin_flag(admin);
        let username = generated_username(chrono::Utc::now());
        let attributes = vec![
            AttributeType::email(email),
            AttributeType::role(role),
        ];

        tracing::debug!("signing up {} as {} ({:?})", email, username, role);

        if let Err(err) = self.provider.sign_up(&username, password, attributes).await {
            let err = ActionError::from(err);

            self.view.error(format!("Sign up failed: {}", err));

            return Err(err);
        }

        if admin {
            self.view.success(ADMIN_PENDING);

            return Ok(SignUpOutcome::PendingApproval);
        }

        self.view.success(ACCOUNT_CREATED);

        let view = self.view.clone();
        let email = email.to_owned();
        let delay = self.timing.sign_up_prefill;
        let prefill = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            view.prefill_sign_in(email);
            view.show_sign_in();
        });

        Ok(SignUpOutcome::Created { prefill })
    }

    /// authenticates and, after a short pause, moves to the file section and
    /// lists the files of the new session
    pub async fn sign_in(&self, email: &str, password: &str) -> ActionResult<Profile> {
        if let Err(err) = check_credentials(email, password) {
            self.view.error(err.to_string());

            return Err(err.into());
        }

        let details = AuthenticationDetails::new(email, password);

        let handle = match self.provider.authenticate_user(details).await {
            Ok(handle) => handle,
            Err(err) => {
                let err = ActionError::from(err);

                self.view.error(format!("Sign in failed: {}", err));

                return Err(err);
            }
        };

        let session = Session::new(email, handle);
        let profile = session.profile();

        tracing::debug!("signed in {} with role {}", profile.email, profile.role);

        self.session.establish(session);
        self.view.success("Sign in successful!");

        tokio::time::sleep(self.timing.sign_in_pause).await;

        self.view.show_upload(profile.clone());

        if let Err(err) = self.files.list(None).await {
            tracing::debug!("initial listing failed: {}", err);
        }

        Ok(profile)
    }

    /// the local session is always cleared, a failed provider sign out is
    /// only logged
    pub async fn sign_out(&self) {
        if let Some(session) = self.session.teardown() {
            if let Err(err) = self.provider.sign_out(&session.handle).await {
                tracing::warn!("provider sign out failed: {}", err);
            }
        }

        self.view.show_sign_in();
        self.view.success("Signed out successfully");
    }
}
