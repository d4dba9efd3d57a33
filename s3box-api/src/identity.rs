//! wire types for the cognito user pool json protocol and the claims carried
//! by the issued id token.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use s3box_lib::role::{GroupsClaim, Role, ROLE_ATTRIBUTE, RequestedRole};
use serde::{Serialize, Deserialize};

pub const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeType {
    pub name: String,
    pub value: String,
}

impl AttributeType {
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        AttributeType {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn email<V>(value: V) -> Self
    where
        V: Into<String>
    {
        Self::new("email", value)
    }

    pub fn role(role: RequestedRole) -> Self {
        Self::new(ROLE_ATTRIBUTE, role.attribute_value())
    }
}

/// synthetic username used for sign up, the email is only an alias
pub fn generated_username(at: DateTime<Utc>) -> String {
    format!("user_{}", at.timestamp_millis())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpRequest {
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub user_attributes: Vec<AttributeType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpResponse {
    #[serde(default)]
    pub user_confirmed: bool,

    #[serde(default)]
    pub user_sub: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthRequest {
    pub auth_flow: String,
    pub client_id: String,
    pub auth_parameters: HashMap<String, String>,
}

impl InitiateAuthRequest {
    pub fn user_password<C, U, P>(client_id: C, username: U, password: P) -> Self
    where
        C: Into<String>,
        U: Into<String>,
        P: Into<String>,
    {
        InitiateAuthRequest {
            auth_flow: USER_PASSWORD_AUTH.into(),
            client_id: client_id.into(),
            auth_parameters: HashMap::from([
                (String::from("USERNAME"), username.into()),
                (String::from("PASSWORD"), password.into()),
            ]),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthResponse {
    #[serde(default)]
    pub authentication_result: Option<AuthenticationResult>,

    #[serde(default)]
    pub challenge_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub id_token: String,
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalSignOutRequest {
    pub access_token: String,
}

/// error body of the identity provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderError {
    #[serde(default, rename = "__type")]
    pub kind: Option<String>,

    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

impl ProviderError {
    /// the error kind without the service namespace prefix
    pub fn short_kind(&self) -> Option<&str> {
        self.kind.as_deref()
            .map(|kind| kind.rsplit('#').next().unwrap_or(kind))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("the token is not a three part jwt")]
    Malformed,

    #[error("the token payload is not valid base64url")]
    Base64(#[from] base64::DecodeError),

    #[error("the token payload is not valid json")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default, rename = "cognito:groups")]
    pub groups: Option<GroupsClaim>,
}

impl IdTokenClaims {
    pub fn groups(&self) -> Vec<String> {
        self.groups.clone()
            .map(|v| v.into_groups())
            .unwrap_or_default()
    }

    pub fn role(&self) -> Role {
        Role::from_groups(self.groups())
    }
}

/// an id token along with its decoded claims. the signature is not checked
/// here, the gateway verifies every token it receives.
#[derive(Debug, Clone)]
pub struct IdToken {
    jwt: String,
    claims: IdTokenClaims,
}

impl IdToken {
    pub fn parse<J>(jwt: J) -> Result<Self, TokenError>
    where
        J: Into<String>
    {
        let jwt = jwt.into();
        let mut parts = jwt.split('.');

        let (Some(_header), Some(payload), Some(_signature), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next()
        ) else {
            return Err(TokenError::Malformed);
        };

        let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let claims = serde_json::from_slice(&decoded)?;

        Ok(IdToken { jwt, claims })
    }

    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    pub fn claims(&self) -> &IdTokenClaims {
        &self.claims
    }
}

/// builds an unsigned jwt carrying the given claims
#[cfg(any(test, feature = "test-util"))]
pub fn encode_unsigned(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

    format!("{header}.{payload}.sig")
}
