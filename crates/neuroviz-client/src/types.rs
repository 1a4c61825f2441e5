//! Request and response bodies of the REST API.
//!
//! Field names follow the backend's camelCase JSON. Timestamps are kept as the
//! ISO-8601 strings the backend sends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Account of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id.
    pub id: u64,
    /// Login email.
    pub email: String,
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Account creation time.
    pub created_at: String,
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Response of `POST /auth/login`. Not wrapped in an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Token type, `Bearer`.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Logged-in user.
    pub user: User,
}

/// Where a recording came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Uploaded file.
    Upload,
    /// Recorded from a live stream.
    Stream,
}

/// A stored EEG recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Origin of the recording.
    pub source_type: SourceType,
    /// Server-side file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Samples per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    /// Recording length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Number of channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_count: Option<u32>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
    /// Per-channel data locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<Vec<ChannelData>>,
    /// Processing jobs run on this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_jobs: Option<Vec<ProcessingJob>>,
}

/// Storage record of one channel of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelData {
    /// Record id.
    pub id: u64,
    /// Channel name.
    pub channel_name: String,
    /// Samples per second.
    pub sample_rate: u32,
    /// Storage location.
    pub data_location: String,
    /// Stored size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_size_bytes: Option<u64>,
    /// Creation time.
    pub created_at: String,
}

/// Kind of processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    /// Filtering and artifact removal.
    Preprocess,
    /// Spectral analytics.
    Analytics,
    /// State classification.
    Classify,
}

/// Lifecycle of a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Queued.
    Pending,
    /// In progress.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl JobStatus {
    /// Returns true if the job will not change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A server-side processing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingJob {
    /// Job id.
    pub id: u64,
    /// Kind of job.
    pub job_type: JobType,
    /// Current status.
    pub status: JobStatus,
    /// Parameters, as JSON text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_json: Option<String>,
    /// Results, as JSON text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_json: Option<String>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Completion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

/// Parameters of `POST /sessions/{id}/preprocess`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreprocessRequest {
    /// Band-pass corners in Hz, low then high.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandpass: Option<[f64; 2]>,
    /// Notch frequency in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notch: Option<f64>,
    /// Remove artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<bool>,
}

/// Power spectral density of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsdAnalysis {
    /// Frequency bins in Hz.
    pub frequencies: Vec<f64>,
    /// PSD value per bin.
    pub psd_values: Vec<f64>,
    /// Channel name.
    pub channel: String,
    /// Samples per second.
    pub sample_rate: f64,
}

/// Server-computed band power of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPowerAnalysis {
    /// Delta band power.
    pub delta: f64,
    /// Theta band power.
    pub theta: f64,
    /// Alpha band power.
    pub alpha: f64,
    /// Beta band power.
    pub beta: f64,
    /// Gamma band power.
    pub gamma: f64,
    /// Channel name.
    pub channel: String,
}

/// Outcome of `POST /sessions/{id}/classify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// Most likely class.
    pub predicted_class: String,
    /// Probability per class.
    pub probabilities: BTreeMap<String, f64>,
    /// Probability of the predicted class.
    pub confidence: f64,
    /// All classes, in model order.
    pub classes: Vec<String>,
}

/// File attached to a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent to the server.
    pub file_name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Fields of `POST /sessions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionForm {
    /// Display name. Must not be blank.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Recording to upload.
    pub file: Option<UploadFile>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn session_decodes_backend_shape() {
        let json = r#"{
            "id": 3,
            "name": "Resting state",
            "sourceType": "UPLOAD",
            "sampleRate": 250,
            "durationSeconds": 12.5,
            "createdAt": "2024-03-01T10:00:00",
            "updatedAt": "2024-03-01T10:05:00",
            "processingJobs": [{
                "id": 9,
                "jobType": "PREPROCESS",
                "status": "RUNNING",
                "createdAt": "2024-03-01T10:01:00",
                "updatedAt": "2024-03-01T10:02:00"
            }]
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();

        assert_eq!(session.source_type, SourceType::Upload);
        assert_eq!(session.sample_rate, Some(250));
        assert!(session.description.is_none());
        let jobs = session.processing_jobs.unwrap();
        assert_eq!(jobs[0].status, JobStatus::Running);
        assert!(!jobs[0].status.is_terminal());
    }

    #[test]
    fn login_response_uses_type_field() {
        let json = r#"{"token":"abc","type":"Bearer","user":{"id":1,"email":"a@b.c","createdAt":"x"}}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.email, "a@b.c");
    }

    #[test]
    fn preprocess_request_omits_unset_fields() {
        let request = PreprocessRequest { bandpass: Some([1.0, 40.0]), ..Default::default() };
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"bandpass":[1.0,40.0]}"#);
    }
}
