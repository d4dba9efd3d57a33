//! fakes shared by the tests of this crate: an in process gateway with its
//! storage bucket, a scripted identity provider and recording view/prompt
//! implementations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use s3box_api::client::ApiClient;
use s3box_api::client::identity::{
    AuthSession,
    AuthenticationDetails,
    IdentityError,
    IdentityProvider,
};
use s3box_api::identity::{encode_unsigned, AttributeType, IdToken, SignUpResponse};

use crate::config::Timing;
use crate::files::Files;
use crate::input::Prompt;
use crate::session::{Auth, SessionContext};
use crate::view::{Surface, View, ViewEvent};

pub const LAST_MODIFIED: &str = "2024-01-02T03:04:05.000Z";

#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingSurface {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }
}

impl Surface for RecordingSurface {
    fn render(&self, event: &ViewEvent) {
        self.events.lock().push(event.clone());
    }
}

pub struct ScriptedPrompt {
    confirm: bool,
    questions: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn confirming(confirm: bool) -> Self {
        ScriptedPrompt {
            confirm,
            questions: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn confirm(&self, question: &str) -> bool {
        self.questions.lock().push(question.to_owned());

        self.confirm
    }

    fn alert(&self, text: &str) {
        self.alerts.lock().push(text.to_owned());
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// canned reply for a method and path, overrides the normal behavior
struct Failure {
    method: Method,
    path: String,
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct GatewayState {
    base: String,
    requests: Mutex<Vec<Recorded>>,
    objects: Mutex<BTreeMap<String, Bytes>>,
    failures: Mutex<Vec<Failure>>,
}

/// gateway mounted under a "prod" stage with a storage bucket next to it.
/// uploaded objects land in the bucket and show up in the listing.
#[derive(Clone)]
pub struct FakeGateway {
    state: Arc<GatewayState>,
}

impl FakeGateway {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(GatewayState {
            base: format!("http://{}", addr),
            ..GatewayState::default()
        });
        let app = Router::new()
            .fallback(gateway)
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeGateway { state }
    }

    pub fn invoke_url(&self) -> String {
        format!("{}/prod", self.state.base)
    }

    pub fn client(&self) -> ApiClient {
        let mut builder = ApiClient::builder();
        builder.base_url(self.invoke_url()).unwrap();
        builder.build().unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn put_object<K, B>(&self, key: K, body: B)
    where
        K: Into<String>,
        B: Into<Bytes>,
    {
        self.state.objects.lock().insert(key.into(), body.into());
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.state.objects.lock().get(key).cloned()
    }

    pub fn fail<P, B>(&self, method: Method, path: P, status: StatusCode, body: B)
    where
        P: Into<String>,
        B: Into<String>,
    {
        self.state.failures.lock().push(Failure {
            method,
            path: path.into(),
            status,
            body: body.into(),
        });
    }
}

fn json_reply(status: StatusCode, body: serde_json::Value) -> Response {
    (status, [(CONTENT_TYPE, "application/json")], body.to_string()).into_response()
}

fn query_value(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

async fn gateway(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: HeaderName| headers.get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_owned());

    state.requests.lock().push(Recorded {
        method: method.clone(),
        path: uri.path().to_owned(),
        query: uri.query().map(|v| v.to_owned()),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body: body.clone(),
    });

    {
        let failures = state.failures.lock();

        if let Some(failure) = failures.iter().find(|f| f.method == method && f.path == uri.path()) {
            return (failure.status, failure.body.clone()).into_response();
        }
    }

    let path = uri.path();

    if let Some(key) = path.strip_prefix("/storage/") {
        return match method {
            Method::PUT => {
                state.objects.lock().insert(key.to_owned(), body);

                StatusCode::OK.into_response()
            },
            Method::GET => match state.objects.lock().get(key) {
                Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
                None => StatusCode::NOT_FOUND.into_response(),
            },
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        };
    }

    match (method, path) {
        (Method::POST, "/prod/upload-url") => {
            let given: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
            let key = match given["path"].as_str() {
                Some(path) => path.to_owned(),
                None => format!("users/sub-1/{}", given["filename"].as_str().unwrap_or_default()),
            };

            json_reply(StatusCode::OK, serde_json::json!({
                "uploadUrl": format!("{}/storage/{}?X-Amz-Signature=abc", state.base, key),
                "s3Key": key,
                "expiresIn": 300
            }))
        },
        (Method::GET, "/prod/files") => {
            let prefix = query_value(uri.query(), "prefix").unwrap_or_default();
            let files: Vec<serde_json::Value> = state.objects.lock()
                .iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .map(|(key, bytes)| serde_json::json!({
                    "key": key,
                    "size": bytes.len(),
                    "lastModified": LAST_MODIFIED
                }))
                .collect();

            json_reply(StatusCode::OK, serde_json::json!({
                "count": files.len(),
                "files": files,
                "prefix": prefix
            }))
        },
        (Method::GET, "/prod/download-url") => {
            let Some(key) = query_value(uri.query(), "key") else {
                return json_reply(StatusCode::BAD_REQUEST, serde_json::json!({
                    "error": "key is required"
                }));
            };

            json_reply(StatusCode::OK, serde_json::json!({
                "downloadUrl": format!("{}/storage/{}", state.base, key),
                "s3Key": key,
                "expiresIn": 300
            }))
        },
        (Method::DELETE, "/prod/files") => {
            let given: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
            let key = given["key"].as_str().unwrap_or_default().to_owned();

            state.objects.lock().remove(&key);

            json_reply(StatusCode::OK, serde_json::json!({
                "message": "File deleted successfully",
                "s3Key": key
            }))
        },
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// identity provider that accepts one password and hands out unsigned tokens
pub struct FakeProvider {
    pub password: String,
    pub groups: Vec<String>,
    pub sign_up_error: Option<String>,
    pub sign_out_error: Option<String>,
    pub sign_ups: Mutex<Vec<(String, Vec<AttributeType>)>>,
    pub sign_outs: Mutex<usize>,
}

impl FakeProvider {
    pub fn new<P>(password: P) -> Self
    where
        P: Into<String>
    {
        FakeProvider {
            password: password.into(),
            groups: Vec::new(),
            sign_up_error: None,
            sign_out_error: None,
            sign_ups: Mutex::new(Vec::new()),
            sign_outs: Mutex::new(0),
        }
    }

    pub fn token_for(&self, email: &str) -> String {
        encode_unsigned(&serde_json::json!({
            "sub": "sub-1",
            "email": email,
            "cognito:groups": self.groups
        }))
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn sign_up(
        &self,
        username: &str,
        _password: &str,
        attributes: Vec<AttributeType>,
    ) -> Result<SignUpResponse, IdentityError> {
        if let Some(msg) = &self.sign_up_error {
            return Err(IdentityError::provider(None, msg.clone()));
        }

        self.sign_ups.lock().push((username.to_owned(), attributes));

        Ok(SignUpResponse {
            user_confirmed: false,
            user_sub: Some(String::from("sub-1")),
        })
    }

    async fn authenticate_user(
        &self,
        details: AuthenticationDetails,
    ) -> Result<AuthSession, IdentityError> {
        if details.password != self.password {
            return Err(IdentityError::provider(
                Some(String::from("NotAuthorizedException")),
                "Incorrect username or password.",
            ));
        }

        let id_token = IdToken::parse(self.token_for(&details.username))?;

        Ok(AuthSession::new(id_token, "access", Some(String::from("refresh"))))
    }

    async fn sign_out(&self, _session: &AuthSession) -> Result<(), IdentityError> {
        *self.sign_outs.lock() += 1;

        match &self.sign_out_error {
            Some(msg) => Err(IdentityError::provider(None, msg.clone())),
            None => Ok(()),
        }
    }
}

/// short waits so delayed work finishes quickly, banners stay up for the
/// whole test
pub fn test_timing() -> Timing {
    Timing {
        refresh_delay: Duration::from_millis(10),
        banner_timeout: Duration::from_secs(60),
        sign_in_pause: Duration::from_millis(10),
        sign_up_prefill: Duration::from_millis(10),
    }
}

pub struct Harness {
    pub gateway: FakeGateway,
    pub provider: Arc<FakeProvider>,
    pub prompt: Arc<ScriptedPrompt>,
    pub surface: Arc<RecordingSurface>,
    pub view: View,
    pub session: SessionContext,
    pub files: Files,
    pub auth: Auth,
}

impl Harness {
    pub async fn new(provider: FakeProvider, confirm: bool) -> Self {
        let gateway = FakeGateway::start().await;
        let provider = Arc::new(provider);
        let prompt = Arc::new(ScriptedPrompt::confirming(confirm));
        let surface = Arc::new(RecordingSurface::default());
        let timing = test_timing();

        let view = View::new(surface.clone(), timing.banner_timeout);
        let session = SessionContext::new();
        let files = Files::new(
            gateway.client(),
            session.clone(),
            view.clone(),
            prompt.clone(),
            timing.refresh_delay,
        );
        let auth = Auth::new(
            provider.clone(),
            session.clone(),
            view.clone(),
            files.clone(),
            timing,
        );

        Harness {
            gateway,
            provider,
            prompt,
            surface,
            view,
            session,
            files,
            auth,
        }
    }

    pub async fn signed_in(provider: FakeProvider) -> Self {
        let harness = Harness::new(provider, true).await;
        let password = harness.provider.password.clone();

        harness.auth.sign_in("a@example.com", &password).await.unwrap();

        harness
    }

    pub fn token(&self) -> String {
        self.session.token().unwrap()
    }

    pub fn banner_text(&self) -> Option<String> {
        self.view.banner().map(|banner| banner.text)
    }
}
