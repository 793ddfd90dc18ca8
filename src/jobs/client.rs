use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::multipart;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::auth::SessionManager;
use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, RequestGateway};

use super::types::{Job, StatusReport, SubmitParameters};

const SUBMIT_PATH: &str = "/api/keyword/excel";
const WORK_PATH: &str = "/api/work/";
const ARTIFACT_PATH: &str = "/api/keyword/file";
const ARTIFACT_SUFFIX: &str = ".xlsx";

/// Client for the extraction-job endpoints.
///
/// Every protected call validates the session first (refreshing the access
/// token if needed) and only then sends the guarded request, so
/// refresh-then-request is strictly sequential per caller.
pub struct JobClient {
    gateway: Arc<RequestGateway>,
    session: Arc<SessionManager>,
}

impl JobClient {
    pub fn new(gateway: Arc<RequestGateway>, session: Arc<SessionManager>) -> Self {
        Self { gateway, session }
    }

    async fn bearer(&self) -> Result<String> {
        Ok(self.session.ensure_valid().await?.access_token)
    }

    /// Upload a spreadsheet and enqueue an extraction job for it.
    ///
    /// Returns the backend-assigned job id. A backend complaint about the
    /// upload (wrong file type, malformed parameters) surfaces as
    /// [`ClientError::ValidationRejected`].
    pub async fn submit(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        parameters: &SubmitParameters,
    ) -> Result<i64> {
        let token = self.bearer().await?;
        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(contents).file_name(file_name.to_string()),
            )
            .text("useKipris", parameters.use_external_lookup.to_string())
            .text("sellerMin", parameters.seller_count_min.to_string())
            .text("sellerMax", parameters.seller_count_max.to_string())
            .text("searchCount", parameters.search_count.to_string());
        debug!(file_name, "submitting extraction job");
        let request = ApiRequest::post(SUBMIT_PATH).bearer(token).multipart(form);
        match self.gateway.send(request).await {
            Err(ClientError::Rejected {
                status: 400 | 422,
                message,
            }) => Err(ClientError::ValidationRejected(message)),
            other => other,
        }
    }

    /// Fetch the full work list. One round trip per call; re-invoke to
    /// refresh.
    pub async fn list(&self) -> Result<Vec<Job>> {
        let token = self.bearer().await?;
        self.gateway.send(ApiRequest::get(WORK_PATH).bearer(token)).await
    }

    /// Poll the live progress of one job.
    pub async fn status(&self, id: i64) -> Result<StatusReport> {
        let token = self.bearer().await?;
        let request = ApiRequest::get(format!("/api/status/{id}")).bearer(token);
        match self.gateway.send(request).await {
            Err(ClientError::Rejected { status: 404, .. }) => {
                Err(ClientError::NotFound(format!("job {id}")))
            }
            other => other,
        }
    }

    /// Ask the backend to kill a running job.
    ///
    /// Idempotent from the caller's perspective: killing a job that already
    /// finished, was already killed, or was never known is not an error.
    /// Only transport failures propagate.
    pub async fn cancel(&self, id: i64) -> Result<()> {
        let token = self.bearer().await?;
        let request = ApiRequest::put(format!("/api/status/kill/{id}")).bearer(token);
        match self.gateway.send_unit(request).await {
            Ok(()) => Ok(()),
            Err(ClientError::Rejected { status, .. }) => {
                debug!(id, status, "kill request rejected; treating as already stopped");
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Acknowledge a completed job in the work list.
    pub async fn mark_reviewed(&self, id: i64) -> Result<()> {
        let token = self.bearer().await?;
        let request = ApiRequest::put(format!("/api/work/statuscode/{id}")).bearer(token);
        match self.gateway.send_unit(request).await {
            Err(ClientError::Rejected { status: 404, .. }) => {
                Err(ClientError::NotFound(format!("job {id}")))
            }
            other => other,
        }
    }

    /// Stream a completed job's result workbook.
    ///
    /// The caller owns persistence of the bytes; see
    /// [`JobClient::download_to_file`] for the common case.
    pub async fn download(&self, filename: &str) -> Result<BoxStream<'static, Result<Bytes>>> {
        let token = self.bearer().await?;
        let request = ApiRequest::get(ARTIFACT_PATH)
            .query("filename", filename)
            .bearer(token);
        match self.gateway.send_bytes_stream(request).await {
            Err(ClientError::Rejected { status: 404, .. }) => {
                Err(ClientError::NotFound(format!("file {filename}")))
            }
            other => other,
        }
    }

    /// Stream an artifact into `dir`, named `{filename}.xlsx`.
    pub async fn download_to_file(
        &self,
        filename: &str,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let mut stream = self.download(filename).await?;
        let path = dir.as_ref().join(format!("{filename}{ARTIFACT_SUFFIX}"));
        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        debug!(path = %path.display(), "artifact saved");
        Ok(path)
    }
}
