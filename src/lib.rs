pub mod client;
pub mod error;
pub mod export;
pub mod filter;
pub mod types;

use export::ExportArtifact;
use log::{debug, error, info};
use types::{
    AnalysisResult, CaptureFile, ExportFormat, FilterCriteria, FilteredResult, PacketDetail,
};

pub use client::{AnalysisClient, HttpAnalysisClient, UploadResponse};
pub use error::CapsightError;

/// AnalysisView bundles the outcome of one successful upload: the summary as
/// received from the service, the criteria currently applied to it, and the
/// view derived under those criteria.
#[derive(Debug, Clone)]
pub struct AnalysisView {
    /// The summary, immutable until the next upload replaces it
    result: AnalysisResult,
    /// Criteria the view was derived under
    criteria: FilterCriteria,
    /// The derived view, recomputed on every criteria change
    filtered: FilteredResult,
    /// Server-side handle of the uploaded capture, when provided
    file_id: Option<String>,
    /// Server-side summary copy location, when provided
    download_path: Option<String>,
}

impl AnalysisView {
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn filtered(&self) -> &FilteredResult {
        &self.filtered
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn download_path(&self) -> Option<&str> {
        self.download_path.as_deref()
    }
}

/// SessionState is the position of a session in the upload lifecycle.
#[derive(Debug)]
pub enum SessionState {
    /// Nothing uploaded yet (a capture may be staged for upload)
    Idle,
    /// Upload in flight, awaiting the service reply
    Uploading,
    /// A result is held and a view is derived from it
    Ready(AnalysisView),
    /// The last upload failed; the message is the user-visible account of it
    Error(String),
}

/// Session drives one analysis round trip: stage a capture file, upload it
/// to the analysis service, explore the returned summary through filtering,
/// export the current view. All mutable state of the pipeline lives here.
///
/// Every transition takes `&mut self`, so nothing can overlap the suspended
/// `upload` call; the machine is re-enterable indefinitely, a new
/// `select_file` always starts the next round.
pub struct Session<C: AnalysisClient> {
    /// Collaborator performing the actual capture analysis
    client: C,
    /// Capture staged for the next upload
    pending_file: Option<CaptureFile>,
    /// Current lifecycle position
    state: SessionState,
}

impl<C: AnalysisClient> Session<C> {
    /// Creates an idle session with no staged file and no result.
    pub fn new(client: C) -> Self {
        Session {
            client,
            pending_file: None,
            state: SessionState::Idle,
        }
    }

    /// Stages a capture for the next upload. Valid in any state: any held
    /// result, view or error message is dropped and the machine returns to
    /// Idle.
    pub fn select_file(&mut self, file: CaptureFile) {
        debug!("Selected {} ({} bytes)", file.file_name, file.contents.len());
        self.pending_file = Some(file);
        self.state = SessionState::Idle;
    }

    /// Uploads the staged capture and, on success, derives the identity view
    /// over the fresh result (criteria reset to the unfiltered default).
    ///
    /// With no staged file the transition aborts with a Validation error and
    /// the state is untouched. On a Network/Service failure the machine
    /// moves to `Error` with a user-visible message built from the
    /// collaborator's failure detail, and the staged file is kept so the
    /// upload can be re-invoked explicitly. Exactly one attempt per call.
    pub async fn upload(&mut self) -> Result<(), CapsightError> {
        if matches!(self.state, SessionState::Uploading) {
            return Err(CapsightError::InvalidState(
                "An upload is already in flight".to_string(),
            ));
        }

        let Some(file) = self.pending_file.clone() else {
            return Err(CapsightError::Validation(
                "Please select a file first".to_string(),
            ));
        };

        self.state = SessionState::Uploading;
        match self.client.analyze(&file).await {
            Ok(response) => {
                info!(
                    "Analysis of {} ready: {} packets, {} protocols, {} conversations",
                    file.file_name,
                    response.result.packet_summary.total_packets,
                    response.result.protocols.len(),
                    response.result.ip_conversations.len()
                );

                let criteria = FilterCriteria::default();
                let filtered = filter::filter(&response.result, &criteria);
                self.state = SessionState::Ready(AnalysisView {
                    result: response.result,
                    criteria,
                    filtered,
                    file_id: response.file_id,
                    download_path: response.download_path,
                });
                Ok(())
            }
            Err(err) => {
                let message = match &err {
                    CapsightError::Service(detail) | CapsightError::Network(detail) => {
                        format!("Upload failed: {}", detail)
                    }
                    other => format!("Upload failed: {}", other),
                };

                error!("{}", message);
                self.state = SessionState::Error(message);
                Err(err)
            }
        }
    }

    /// Rederives the view under new criteria. Valid only while a result is
    /// held; idempotent, no effect beyond replacing the derived view.
    pub fn apply_filter(&mut self, criteria: FilterCriteria) -> Result<(), CapsightError> {
        match &mut self.state {
            SessionState::Ready(view) => {
                view.filtered = filter::filter(&view.result, &criteria);
                view.criteria = criteria;
                Ok(())
            }
            _ => Err(CapsightError::InvalidState(
                "No analysis result to filter".to_string(),
            )),
        }
    }

    /// Encodes the current view as a downloadable artifact. Valid only while
    /// a view is held; does not mutate the session.
    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact, CapsightError> {
        match &self.state {
            SessionState::Ready(view) => export::export(&view.filtered, format),
            _ => Err(CapsightError::InvalidState(
                "No filtered view to export".to_string(),
            )),
        }
    }

    /// Fetches the per-packet breakdown of the uploaded capture from the
    /// analysis service. Valid only while a result is held and the service
    /// returned a file handle; a failure surfaces as an error return, the
    /// session state is untouched.
    pub async fn packet_details(&self) -> Result<Vec<PacketDetail>, CapsightError> {
        let SessionState::Ready(view) = &self.state else {
            return Err(CapsightError::InvalidState(
                "No analysis result to inspect".to_string(),
            ));
        };

        let Some(file_id) = &view.file_id else {
            return Err(CapsightError::InvalidState(
                "The analysis service did not return a file handle".to_string(),
            ));
        };

        self.client.packet_details(file_id).await
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The staged capture, if any.
    pub fn pending_file(&self) -> Option<&CaptureFile> {
        self.pending_file.as_ref()
    }

    /// The held result, if the session is in `Ready`.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Ready(view) => Some(&view.result),
            _ => None,
        }
    }

    /// The derived view, if the session is in `Ready`.
    pub fn filtered(&self) -> Option<&FilteredResult> {
        match &self.state {
            SessionState::Ready(view) => Some(&view.filtered),
            _ => None,
        }
    }

    /// The user-visible failure message, if the session is in `Error`.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }
}
