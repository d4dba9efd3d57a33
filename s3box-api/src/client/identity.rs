//! identity provider seam. the provider sdk of a browser reports the outcome
//! of an authentication through a pair of callbacks, here every operation is
//! a future that resolves exactly once with either outcome.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::error::ApiClientError;
use crate::client::DEFAULT_USER_AGENT;
use crate::identity::{
    AttributeType,
    SignUpRequest,
    SignUpResponse,
    InitiateAuthRequest,
    InitiateAuthResponse,
    GlobalSignOutRequest,
    ProviderError,
    IdToken,
    TokenError,
};

pub const AMZ_JSON: &str = "application/x-amz-json-1.1";
pub const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// failure reported by the provider, the message is passed through as is
    #[error("{message}")]
    Provider {
        kind: Option<String>,
        message: String,
    },

    #[error("authentication requires an unsupported challenge: {0}")]
    Challenge(String),

    #[error("the identity provider returned an invalid id token: {0}")]
    Token(#[from] TokenError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl IdentityError {
    pub fn provider<M>(kind: Option<String>, message: M) -> Self
    where
        M: Into<String>
    {
        IdentityError::Provider {
            kind,
            message: message.into(),
        }
    }
}

pub struct AuthenticationDetails {
    pub username: String,
    pub password: String,
}

impl AuthenticationDetails {
    pub fn new<U, P>(username: U, password: P) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        AuthenticationDetails {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for AuthenticationDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationDetails")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// tokens issued by a successful authentication
#[derive(Clone)]
pub struct AuthSession {
    id_token: IdToken,
    access_token: String,
    refresh_token: Option<String>,
}

impl AuthSession {
    pub fn new<A>(id_token: IdToken, access_token: A, refresh_token: Option<String>) -> Self
    where
        A: Into<String>
    {
        AuthSession {
            id_token,
            access_token: access_token.into(),
            refresh_token,
        }
    }

    pub fn id_token(&self) -> &IdToken {
        &self.id_token
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("claims", self.id_token.claims())
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: Vec<AttributeType>,
    ) -> Result<SignUpResponse, IdentityError>;

    async fn authenticate_user(
        &self,
        details: AuthenticationDetails,
    ) -> Result<AuthSession, IdentityError>;

    async fn sign_out(&self, session: &AuthSession) -> Result<(), IdentityError>;
}

/// region part of a user pool id, "us-east-1_abc" -> "us-east-1"
pub fn pool_region(user_pool_id: &str) -> Option<&str> {
    user_pool_id.split_once('_')
        .map(|(region, _)| region)
        .filter(|region| !region.is_empty())
}

#[derive(Debug, Clone)]
pub struct CognitoClient {
    client: reqwest::Client,
    endpoint: Url,
    client_id: String,
}

impl CognitoClient {
    pub fn new<P, C>(user_pool_id: P, client_id: C) -> Result<Self, ApiClientError>
    where
        P: AsRef<str>,
        C: Into<String>,
    {
        let region = pool_region(user_pool_id.as_ref())
            .ok_or(ApiClientError::InvalidUserPool)?;
        let endpoint = Url::parse(&format!("https://cognito-idp.{}.amazonaws.com/", region))?;

        Self::with_endpoint(endpoint, client_id)
    }

    pub fn with_endpoint<C>(endpoint: Url, client_id: C) -> Result<Self, ApiClientError>
    where
        C: Into<String>
    {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(CognitoClient {
            client,
            endpoint,
            client_id: client_id.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R, IdentityError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!("identity provider call {}", operation);

        let body = serde_json::to_vec(body)
            .map_err(|e| IdentityError::provider(None, e.to_string()))?;

        let res = self.client.post(self.endpoint.clone())
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("x-amz-target", format!("{}.{}", TARGET_PREFIX, operation))
            .body(body)
            .send()
            .await?;

        let status = res.status();

        if status.is_success() {
            let bytes = res.bytes().await?;

            // an empty body is a valid reply for operations without output
            let bytes = if bytes.is_empty() { &b"{}"[..] } else { &bytes[..] };

            serde_json::from_slice(bytes)
                .map_err(|e| IdentityError::provider(None, format!("unreadable provider response: {}", e)))
        } else {
            let err = match res.json::<ProviderError>().await {
                Ok(err) => err,
                Err(err) => {
                    tracing::debug!("unreadable provider error body: {}", err);

                    ProviderError::default()
                }
            };

            let kind = err.short_kind().map(|v| v.to_owned());
            let message = err.message
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| format!("identity provider responded with {}", status));

            Err(IdentityError::Provider { kind, message })
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: Vec<AttributeType>,
    ) -> Result<SignUpResponse, IdentityError> {
        let body = SignUpRequest {
            client_id: self.client_id.clone(),
            username: username.to_owned(),
            password: password.to_owned(),
            user_attributes: attributes,
        };

        self.call("SignUp", &body).await
    }

    async fn authenticate_user(
        &self,
        details: AuthenticationDetails,
    ) -> Result<AuthSession, IdentityError> {
        let body = InitiateAuthRequest::user_password(
            self.client_id.clone(),
            details.username,
            details.password,
        );

        let res: InitiateAuthResponse = self.call("InitiateAuth", &body).await?;

        let Some(result) = res.authentication_result else {
            return Err(IdentityError::Challenge(
                res.challenge_name.unwrap_or_else(|| String::from("unknown"))
            ));
        };

        let id_token = IdToken::parse(result.id_token)?;

        Ok(AuthSession::new(id_token, result.access_token, result.refresh_token))
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), IdentityError> {
        let body = GlobalSignOutRequest {
            access_token: session.access_token().to_owned(),
        };

        let _: serde_json::Value = self.call("GlobalSignOut", &body).await?;

        Ok(())
    }
}
