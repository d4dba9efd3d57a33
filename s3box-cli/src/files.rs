//! file operations against the gateway. every operation checks for a held
//! bearer token first and sends nothing when there is none.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use s3box_api::client::ApiClient;
use s3box_api::client::files::{
    RequestUpload,
    UploadObject,
    ListFiles,
    RequestDownload,
    DeleteItem,
};
use tokio::task::JoinHandle;

use crate::error::{ActionError, ActionResult};
use crate::input::Prompt;
use crate::opener::Opener;
use crate::session::SessionContext;
use crate::view::View;

pub const DELETE_QUESTION: &str = "Are you sure you want to delete this file?";

/// result of a completed upload. the listing refresh runs on its own once the
/// refresh delay passes
pub struct Uploaded {
    pub s3_key: String,
    pub refresh: JoinHandle<()>,
}

#[derive(Clone)]
pub struct Files {
    api: ApiClient,
    session: SessionContext,
    view: View,
    prompt: Arc<dyn Prompt>,
    refresh_delay: Duration,
}

impl Files {
    pub fn new(
        api: ApiClient,
        session: SessionContext,
        view: View,
        prompt: Arc<dyn Prompt>,
        refresh_delay: Duration,
    ) -> Self {
        Files {
            api,
            session,
            view,
            prompt,
            refresh_delay,
        }
    }

    fn token(&self, action: &'static str) -> ActionResult<String> {
        match self.session.token() {
            Some(token) => Ok(token),
            None => {
                self.view.error(action);

                Err(ActionError::NotSignedIn(action))
            }
        }
    }

    /// uploads the currently selected file. the gateway hands out a pre-signed
    /// url and the bytes go straight to storage with it.
    pub async fn upload(&self, key: Option<String>) -> ActionResult<Uploaded> {
        let token = self.token("You must be signed in to upload a file.")?;

        let Some(path) = self.view.selected_file() else {
            self.view.error("Please select a file to upload.");

            return Err(ActionError::NoFileSelected);
        };

        match self.send_upload(&token, &path, key).await {
            Ok(s3_key) => {
                self.view.success(format!("File successfully uploaded! Saved as: {}", s3_key));
                self.view.clear_file_input();

                let files = self.clone();
                let delay = self.refresh_delay;
                let refresh = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;

                    if let Err(err) = files.list(None).await {
                        tracing::debug!("refresh after upload failed: {}", err);
                    }
                });

                Ok(Uploaded { s3_key, refresh })
            },
            Err(err) => {
                self.view.error(format!("Upload process failed: {}", err));

                Err(err)
            }
        }
    }

    async fn send_upload(&self, token: &str, path: &Path, key: Option<String>) -> ActionResult<String> {
        let filename = path.file_name()
            .and_then(|v| v.to_str())
            .ok_or(ActionError::FileName)?
            .to_owned();
        let content_type = mime_guess::from_path(path).first_or_octet_stream();
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| ActionError::FileRead {
                path: path.to_owned(),
                source,
            })?;

        tracing::debug!("uploading {} ({} bytes, {})", filename, contents.len(), content_type);

        self.view.success("1/3: Requesting secure upload URL from API...");

        let mut request = RequestUpload::filename(filename);

        if let Some(key) = key {
            request.path(key);
        }

        let target = request.send(&self.api, token).await?;

        self.view.success("2/3: Got secure link. Uploading file to S3...");

        let mut object = UploadObject::new(target.upload_url, contents);
        object.content_type(content_type);

        object.send(&self.api).await?;

        Ok(target.s3_key)
    }

    /// fetches the full listing and re-renders it, returns the number of files
    pub async fn list(&self, prefix: Option<String>) -> ActionResult<usize> {
        let token = self.token("You must be signed in to list files.")?;

        let mut request = ListFiles::new();

        if let Some(prefix) = prefix {
            request.prefix(prefix);
        }

        match request.send(&self.api, &token).await {
            Ok(list) => {
                let files = list.into_files();
                let count = files.len();

                self.view.render_files(files);

                Ok(count)
            },
            Err(err) => {
                let err = ActionError::from(err);

                self.view.error(format!("Failed to list files: {}", err));

                Err(err)
            }
        }
    }

    /// asks for a download url and hands it to the opener, the bytes are not
    /// fetched here
    pub async fn download(&self, key: &str, opener: &dyn Opener) -> ActionResult<String> {
        let token = self.token("You must be signed in to download files.")?;

        match self.send_download(&token, key, opener).await {
            Ok(url) => {
                self.view.success("Download started!");

                Ok(url)
            },
            Err(err) => {
                self.view.error(format!("Download failed: {}", err));

                Err(err)
            }
        }
    }

    async fn send_download(&self, token: &str, key: &str, opener: &dyn Opener) -> ActionResult<String> {
        let target = RequestDownload::key(key).send(&self.api, token).await?;

        opener.open(&target.download_url)
            .await
            .map_err(|err| ActionError::Remote(err.to_string()))?;

        Ok(target.download_url)
    }

    /// returns false when the user did not confirm, nothing is sent then
    pub async fn delete(&self, key: &str) -> ActionResult<bool> {
        let token = self.token("You must be signed in to delete files.")?;

        if !self.prompt.confirm(DELETE_QUESTION).await {
            return Ok(false);
        }

        match DeleteItem::key(key).send(&self.api, &token).await {
            Ok(_) => {
                self.view.success("File deleted successfully!");

                if let Err(err) = self.list(None).await {
                    tracing::debug!("refresh after delete failed: {}", err);
                }

                Ok(true)
            },
            Err(err) => {
                let err = ActionError::from(err);

                self.view.error(format!("Delete failed: {}", err));

                Err(err)
            }
        }
    }
}
