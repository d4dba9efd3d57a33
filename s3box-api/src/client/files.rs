use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;

use crate::client::ApiClient;
use crate::client::error::RequestError;
use crate::files::{
    RequestUploadUrl,
    UploadUrl,
    FileList,
    DownloadUrl,
    DeleteFile,
    Deleted,
};

pub const UPLOAD_URL_FALLBACK: &str = "API Gateway request failed";
pub const LIST_FALLBACK: &str = "Failed to fetch files";
pub const DOWNLOAD_URL_FALLBACK: &str = "Failed to get download URL";
pub const DELETE_FALLBACK: &str = "Failed to delete file";

pub struct RequestUpload {
    body: RequestUploadUrl
}

impl RequestUpload {
    pub fn filename<F>(filename: F) -> Self
    where
        F: Into<String>
    {
        RequestUpload {
            body: RequestUploadUrl {
                filename: filename.into(),
                path: None,
            }
        }
    }

    pub fn path<P>(&mut self, path: P) -> &mut Self
    where
        P: Into<String>
    {
        self.body.path = Some(path.into());
        self
    }

    pub async fn send(self, client: &ApiClient, token: &str) -> Result<UploadUrl, RequestError> {
        let res = client.post("upload-url", token)?
            .json(&self.body)
            .send()
            .await?;

        if res.status().is_success() {
            Ok(res.json().await?)
        } else {
            Err(RequestError::from_response(res, UPLOAD_URL_FALLBACK).await)
        }
    }
}

/// sends the raw bytes of a file to a pre-signed storage url
pub struct UploadObject {
    url: String,
    content_type: mime::Mime,
    body: Bytes,
}

impl UploadObject {
    pub fn new<U, B>(url: U, body: B) -> Self
    where
        U: Into<String>,
        B: Into<Bytes>,
    {
        UploadObject {
            url: url.into(),
            content_type: mime::APPLICATION_OCTET_STREAM,
            body: body.into(),
        }
    }

    pub fn content_type(&mut self, content_type: mime::Mime) -> &mut Self {
        self.content_type = content_type;
        self
    }

    pub async fn send(self, client: &ApiClient) -> Result<(), RequestError> {
        let res = client.put_presigned(&self.url)?
            .header(CONTENT_TYPE, self.content_type.as_ref())
            .body(self.body)
            .send()
            .await?;

        let status = res.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(RequestError::Storage { status })
        }
    }
}

pub struct ListFiles {
    prefix: Option<String>,
}

impl ListFiles {
    pub fn new() -> Self {
        ListFiles { prefix: None }
    }

    pub fn prefix<P>(&mut self, prefix: P) -> &mut Self
    where
        P: Into<String>
    {
        self.prefix = Some(prefix.into());
        self
    }

    pub async fn send(&self, client: &ApiClient, token: &str) -> Result<FileList, RequestError> {
        let builder = match &self.prefix {
            Some(prefix) => client.get_query("files", &[("prefix", prefix.as_str())], token)?,
            None => client.get("files", token)?,
        };

        let res = builder.send().await?;

        if res.status().is_success() {
            Ok(res.json().await?)
        } else {
            Err(RequestError::from_response(res, LIST_FALLBACK).await)
        }
    }
}

impl Default for ListFiles {
    fn default() -> Self {
        ListFiles::new()
    }
}

pub struct RequestDownload {
    key: String,
}

impl RequestDownload {
    pub fn key<K>(key: K) -> Self
    where
        K: Into<String>
    {
        RequestDownload { key: key.into() }
    }

    pub async fn send(self, client: &ApiClient, token: &str) -> Result<DownloadUrl, RequestError> {
        let res = client.get_query("download-url", &[("key", self.key.as_str())], token)?
            .send()
            .await?;

        if res.status().is_success() {
            Ok(res.json().await?)
        } else {
            Err(RequestError::from_response(res, DOWNLOAD_URL_FALLBACK).await)
        }
    }
}

pub struct DeleteItem {
    body: DeleteFile,
}

impl DeleteItem {
    pub fn key<K>(key: K) -> Self
    where
        K: Into<String>
    {
        DeleteItem {
            body: DeleteFile { key: key.into() }
        }
    }

    /// any 2xx counts as deleted, the body is informational only
    pub async fn send(self, client: &ApiClient, token: &str) -> Result<Deleted, RequestError> {
        let res = client.delete("files", token)?
            .json(&self.body)
            .send()
            .await?;

        if res.status().is_success() {
            let body = res.bytes().await?;

            Ok(serde_json::from_slice(&body).unwrap_or_default())
        } else {
            Err(RequestError::from_response(res, DELETE_FALLBACK).await)
        }
    }
}
