//! In-memory [`FileApi`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::{ApiFuture, FileApi};
use crate::error::ClientError;
use crate::model::{ConvertResponse, FileRecord, UploadFile, UploadResponse, pdf_download_name};

/// Which API operation a call or scripted failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListFiles,
    Upload,
    Convert,
    Download,
    Delete,
    ParseText,
}

/// A recorded call, with its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListFiles,
    Upload(String),
    Convert(String),
    Download(String),
    Delete(String),
    ParseText(String),
}

impl ApiCall {
    pub fn op(&self) -> Op {
        match self {
            ApiCall::ListFiles => Op::ListFiles,
            ApiCall::Upload(_) => Op::Upload,
            ApiCall::Convert(_) => Op::Convert,
            ApiCall::Download(_) => Op::Download,
            ApiCall::Delete(_) => Op::Delete,
            ApiCall::ParseText(_) => Op::ParseText,
        }
    }
}

/// A hand-rolled fake server.
///
/// Keeps a file list that uploads append to and deletes remove from, records
/// every call, and can be told to fail the next N calls of an operation.
#[derive(Default)]
pub struct MockApi {
    files: Mutex<Vec<FileRecord>>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<HashMap<Op, VecDeque<(u16, Option<String>)>>>,
    delay: Option<Duration>,
}

impl MockApi {
    pub fn new(files: Vec<FileRecord>) -> Self {
        Self {
            files: Mutex::new(files),
            ..Default::default()
        }
    }

    /// Simulate network latency on every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next call of `op` fail with `status` and an optional
    /// `{error}` message. Queued failures are consumed in order.
    pub fn fail_next(&self, op: Op, status: u16, message: Option<&str>) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back((status, message.map(str::to_string)));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: Op) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Files currently held by the fake server.
    pub fn server_files(&self) -> Vec<FileRecord> {
        self.files.lock().unwrap().clone()
    }

    pub fn has_file(&self, filename: &str) -> bool {
        self.files
            .lock()
            .unwrap()
            .iter()
            .any(|f| f.filename == filename)
    }

    async fn enter(&self, call: ApiCall) -> Result<(), ClientError> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(|q| q.pop_front());
        match failure {
            Some((status, message)) => Err(ClientError::Server { status, message }),
            None => Ok(()),
        }
    }

    fn not_found() -> ClientError {
        ClientError::Server {
            status: 404,
            message: Some("File not found".to_string()),
        }
    }
}

/// Convenience constructor for test records.
pub fn record(filename: &str, size: u64, mimetype: &str) -> FileRecord {
    FileRecord {
        filename: filename.to_string(),
        size,
        mimetype: mimetype.to_string(),
        pages: None,
        docinfo: Default::default(),
    }
}

impl FileApi for MockApi {
    fn list_files(&self) -> ApiFuture<'_, Vec<FileRecord>> {
        Box::pin(async move {
            self.enter(ApiCall::ListFiles).await?;
            Ok(self.server_files())
        })
    }

    fn upload<'a>(&'a self, file: &'a UploadFile) -> ApiFuture<'a, UploadResponse> {
        Box::pin(async move {
            self.enter(ApiCall::Upload(file.name.clone())).await?;
            let mut files = self.files.lock().unwrap();
            files.retain(|f| f.filename != file.name);
            files.push(record(&file.name, file.bytes.len() as u64, &file.mime));
            Ok(UploadResponse {
                filename: file.name.clone(),
            })
        })
    }

    fn convert<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, ConvertResponse> {
        Box::pin(async move {
            self.enter(ApiCall::Convert(filename.to_string())).await?;
            if !self.has_file(filename) {
                return Err(Self::not_found());
            }
            Ok(ConvertResponse {
                download_url: Some(format!("/download/{}", pdf_download_name(filename))),
                message: None,
            })
        })
    }

    fn download<'a>(&'a self, url: &'a str) -> ApiFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.enter(ApiCall::Download(url.to_string())).await?;
            Ok(format!("%PDF-1.4 mock of {}", url).into_bytes())
        })
    }

    fn delete<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.enter(ApiCall::Delete(filename.to_string())).await?;
            let mut files = self.files.lock().unwrap();
            let before = files.len();
            files.retain(|f| f.filename != filename);
            if files.len() == before {
                return Err(Self::not_found());
            }
            Ok(())
        })
    }

    fn parse_text<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            self.enter(ApiCall::ParseText(filename.to_string())).await?;
            if !self.has_file(filename) {
                return Err(Self::not_found());
            }
            Ok(format!("text of {}", filename))
        })
    }
}
