//! The FilePress REST API as seen by the client.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};

use crate::error::{ClientError, Result};
use crate::model::{
    ConvertResponse, ErrorBody, FileRecord, ParseResponse, UploadFile, UploadResponse,
};
use crate::session::Session;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Server operations used by the file manager.
pub trait FileApi: Send + Sync {
    /// `GET /files`: the caller's files in server order.
    fn list_files(&self) -> ApiFuture<'_, Vec<FileRecord>>;

    /// `POST /upload` with multipart field `file`.
    fn upload<'a>(&'a self, file: &'a UploadFile) -> ApiFuture<'a, UploadResponse>;

    /// `POST /convert/{filename}`.
    fn convert<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, ConvertResponse>;

    /// `GET {url}` for a URL returned by [`convert`](FileApi::convert).
    fn download<'a>(&'a self, url: &'a str) -> ApiFuture<'a, Vec<u8>>;

    /// `DELETE /files/{filename}`.
    fn delete<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, ()>;

    /// `GET /parse/{filename}`: extracted PDF text.
    fn parse_text<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, String>;
}

/// reqwest-backed [`FileApi`]. Every request carries the session's bearer token.
pub struct HttpFileApi {
    client: reqwest::Client,
    session: Arc<Session>,
}

impl HttpFileApi {
    pub fn new(session: Arc<Session>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("filepress/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, session })
    }

    fn file_url(&self, prefix: &str, filename: &str) -> String {
        self.session.resolve_url(&format!(
            "{}/{}",
            prefix,
            urlencoding::encode(filename)
        ))
    }
}

/// Pass 2xx responses through; turn anything else into `ClientError::Server`
/// carrying the `error` field of the JSON body when there is one.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    if let Some(detail) = &parsed.detail {
        tracing::debug!(status = status.as_u16(), detail, "server error detail");
    }
    Err(ClientError::Server {
        status: status.as_u16(),
        message: parsed.error,
    })
}

async fn json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl FileApi for HttpFileApi {
    fn list_files(&self) -> ApiFuture<'_, Vec<FileRecord>> {
        Box::pin(async move {
            let req = self
                .session
                .authorize(self.client.get(self.session.resolve_url("/files")))?;
            let resp = check(req.send().await?).await?;
            json(resp).await
        })
    }

    fn upload<'a>(&'a self, file: &'a UploadFile) -> ApiFuture<'a, UploadResponse> {
        Box::pin(async move {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime)?;
            let form = Form::new().part("file", part);
            let req = self.session.authorize(
                self.client
                    .post(self.session.resolve_url("/upload"))
                    .multipart(form),
            )?;
            let resp = check(req.send().await?).await?;
            json(resp).await
        })
    }

    fn convert<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, ConvertResponse> {
        Box::pin(async move {
            let req = self
                .session
                .authorize(self.client.post(self.file_url("/convert", filename)))?;
            let resp = check(req.send().await?).await?;
            json(resp).await
        })
    }

    fn download<'a>(&'a self, url: &'a str) -> ApiFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let req = self
                .session
                .authorize(self.client.get(self.session.resolve_url(url)))?;
            let resp = check(req.send().await?).await?;
            Ok(resp.bytes().await?.to_vec())
        })
    }

    fn delete<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let req = self
                .session
                .authorize(self.client.delete(self.file_url("/files", filename)))?;
            check(req.send().await?).await?;
            Ok(())
        })
    }

    fn parse_text<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            let req = self
                .session
                .authorize(self.client.get(self.file_url("/parse", filename)))?;
            let resp = check(req.send().await?).await?;
            let parsed: ParseResponse = json(resp).await?;
            Ok(parsed.text)
        })
    }
}
