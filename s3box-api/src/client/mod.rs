use reqwest::{RequestBuilder, Url};
use reqwest::header::AUTHORIZATION;

pub mod error;
pub mod files;
pub mod identity;

use error::{ApiClientError, RequestError};

pub const DEFAULT_USER_AGENT: &str = "s3box-api-client/0.1.0";

#[derive(Debug, Clone)]
pub struct Info {
    pub url: Url
}

/// client for the gateway api. every request carries the bearer token as
/// the raw value of the authorization header.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) info: Info,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder {
            url: None,
            agent: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.info.url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        Ok(self.info.url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn get(&self, path: &str, token: &str) -> Result<RequestBuilder, RequestError> {
        self.get_query(path, &[], token)
    }

    /// query values are encoded the way `encodeURIComponent` does it so the
    /// gateway sees `%20` for a space and never a `+`
    pub(crate) fn get_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &str
    ) -> Result<RequestBuilder, RequestError> {
        let mut url = self.endpoint(path)?;

        if !query.is_empty() {
            let encoded = query.iter()
                .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
                .collect::<Vec<String>>()
                .join("&");

            url.set_query(Some(&encoded));
        }

        tracing::debug!("GET {}", url);

        Ok(self.client.get(url).header(AUTHORIZATION, token))
    }

    pub(crate) fn post(&self, path: &str, token: &str) -> Result<RequestBuilder, RequestError> {
        let url = self.endpoint(path)?;

        tracing::debug!("POST {}", url);

        Ok(self.client.post(url).header(AUTHORIZATION, token))
    }

    pub(crate) fn delete(&self, path: &str, token: &str) -> Result<RequestBuilder, RequestError> {
        let url = self.endpoint(path)?;

        tracing::debug!("DELETE {}", url);

        Ok(self.client.delete(url).header(AUTHORIZATION, token))
    }

    /// requests to a pre-signed url carry no authorization of their own
    pub(crate) fn put_presigned(&self, url: &str) -> Result<RequestBuilder, RequestError> {
        let url = Url::parse(url)?;

        tracing::debug!("PUT {}{}", url.origin().ascii_serialization(), url.path());

        Ok(self.client.put(url))
    }
}

/// percent encodes everything but ascii alphanumerics and `*-._`
pub fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub struct ApiClientBuilder {
    url: Option<Url>,
    agent: Option<String>,
}

impl ApiClientBuilder {
    /// the invoke url of the gateway, any stage path is kept and endpoint
    /// paths are appended to it
    pub fn base_url<U>(&mut self, url: U) -> Result<&mut Self, ApiClientError>
    where
        U: AsRef<str>
    {
        let mut parsed = Url::parse(url.as_ref())?;

        if parsed.cannot_be_a_base() {
            return Err(ApiClientError::CannotBeABase);
        }

        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        parsed.set_query(None);
        parsed.set_fragment(None);

        self.url = Some(parsed);

        Ok(self)
    }

    pub fn user_agent<U>(&mut self, user_agent: U) -> &mut Self
    where
        U: Into<String>
    {
        self.agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let url = match self.url {
            Some(url) => url,
            None => Url::parse("http://localhost/")?,
        };
        let user_agent = self.agent.unwrap_or(DEFAULT_USER_AGENT.into());
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;

        Ok(ApiClient {
            client,
            info: Info { url }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let mut builder = ApiClient::builder();
        builder.base_url(base).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn stage_path_is_kept() {
        let with_stage = client("https://abc.execute-api.us-east-1.amazonaws.com/prod");
        let with_slash = client("https://abc.execute-api.us-east-1.amazonaws.com/prod/");
        let bare = client("https://abc.execute-api.us-east-1.amazonaws.com");

        assert_eq!(
            with_stage.endpoint("/files").unwrap().as_str(),
            "https://abc.execute-api.us-east-1.amazonaws.com/prod/files"
        );
        assert_eq!(
            with_slash.endpoint("upload-url").unwrap().as_str(),
            "https://abc.execute-api.us-east-1.amazonaws.com/prod/upload-url"
        );
        assert_eq!(
            bare.endpoint("download-url").unwrap().as_str(),
            "https://abc.execute-api.us-east-1.amazonaws.com/download-url"
        );
    }

    #[test]
    fn query_components() {
        assert_eq!(encode_component("users/sub-1/my report.pdf"), "users%2Fsub-1%2Fmy%20report.pdf");
        assert_eq!(encode_component("a+b"), "a%2Bb");
        assert_eq!(encode_component("plain-name_1.txt"), "plain-name_1.txt");

        let request = client("https://abc.execute-api.us-east-1.amazonaws.com/prod")
            .get_query("download-url", &[("key", "users/sub-1/my report.pdf")], "tok")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.url().path(), "/prod/download-url");
        assert_eq!(request.url().query(), Some("key=users%2Fsub-1%2Fmy%20report.pdf"));
        assert_eq!(request.headers()[AUTHORIZATION], "tok");
    }

    #[test]
    fn invalid_base_url() {
        let mut builder = ApiClient::builder();

        assert!(matches!(builder.base_url("not a url"), Err(ApiClientError::Url(_))));
        assert!(matches!(builder.base_url("mailto:a@example.com"), Err(ApiClientError::CannotBeABase)));
    }
}
