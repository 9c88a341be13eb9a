use crate::error::CapsightError;
use crate::types::{AnalysisResult, CaptureFile, PacketDetail};

use log::{debug, error, info};
use serde::Deserialize;

/// UploadResponse is the analysis service reply to a capture upload: the
/// computed summary plus, when the service provides them, a server-side
/// handle for follow-up queries and the path of its own summary copy.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// The computed summary
    #[serde(flatten)]
    pub result: AnalysisResult,
    /// Server-side handle of the uploaded capture
    #[serde(default)]
    pub file_id: Option<String>,
    /// Download path of the server-side summary copy
    #[serde(default)]
    pub download_path: Option<String>,
}

/// Failure payload of a non-2xx reply.
#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: String,
}

/// Per-packet breakdown envelope.
#[derive(Debug, Clone, Deserialize)]
struct PacketDetailsResponse {
    #[serde(default)]
    packets: Vec<PacketDetail>,
}

/// AnalysisClient is the boundary to the external analysis service. The
/// session drives it with exactly one attempt per operation; retrying is the
/// caller's decision.
pub trait AnalysisClient {
    /// Sends a capture file for analysis and returns the computed summary.
    fn analyze(
        &self,
        file: &CaptureFile,
    ) -> impl Future<Output = Result<UploadResponse, CapsightError>>;

    /// Fetches the per-packet breakdown for a previously uploaded capture.
    fn packet_details(
        &self,
        file_id: &str,
    ) -> impl Future<Output = Result<Vec<PacketDetail>, CapsightError>>;
}

/// HttpAnalysisClient talks to the analysis service over HTTP: a multipart
/// POST of the capture bytes, JSON replies back.
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    /// Creates a client for the service at `endpoint`, e.g.
    /// "http://127.0.0.1:8000". The endpoint must carry an HTTP scheme.
    pub fn new(endpoint: &str) -> Result<Self, CapsightError> {
        if endpoint.is_empty() {
            return Err(CapsightError::InvalidEndpoint("Empty endpoint".to_string()));
        }

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(CapsightError::EndpointNotSupported(
                "Invalid endpoint, must start with http:// or https://".to_string(),
            ));
        }

        info!("Analysis client ready for {}", endpoint);
        Ok(HttpAnalysisClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Maps a non-2xx reply to a Service error, preferring the body's
    /// `detail` message over the bare status line.
    async fn service_failure(response: reqwest::Response) -> CapsightError {
        let status = response.status();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) if !body.detail.is_empty() => body.detail,
            _ => format!("Request failed with status {}", status),
        };

        error!("Analysis service replied {}: {}", status, detail);
        CapsightError::Service(detail)
    }
}

impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, file: &CaptureFile) -> Result<UploadResponse, CapsightError> {
        let part = reqwest::multipart::Part::bytes(file.contents.to_vec())
            .file_name(file.file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        debug!(
            "Uploading {} ({} bytes) to {}/upload",
            file.file_name,
            file.contents.len(),
            self.endpoint
        );

        let response = self
            .http
            .post(format!("{}/upload", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                error!("Failed to reach the analysis service: {}", err);
                CapsightError::Network(err.to_string())
            })?;

        if !response.status().is_success() {
            return Err(Self::service_failure(response).await);
        }

        response.json::<UploadResponse>().await.map_err(|err| {
            CapsightError::Parse(format!("Failed to decode analysis summary: {}", err))
        })
    }

    async fn packet_details(&self, file_id: &str) -> Result<Vec<PacketDetail>, CapsightError> {
        debug!("Fetching packet details for {}", file_id);

        let response = self
            .http
            .get(format!("{}/packets/{}", self.endpoint, file_id))
            .send()
            .await
            .map_err(|err| {
                error!("Failed to reach the analysis service: {}", err);
                CapsightError::Network(err.to_string())
            })?;

        if !response.status().is_success() {
            return Err(Self::service_failure(response).await);
        }

        let body = response
            .json::<PacketDetailsResponse>()
            .await
            .map_err(|err| {
                CapsightError::Parse(format!("Failed to decode packet details: {}", err))
            })?;

        Ok(body.packets)
    }
}
