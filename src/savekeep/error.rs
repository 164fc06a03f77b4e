use crate::model::PayloadEncoding;
use thiserror::Error;

/// Failures of the underlying persistence engine.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is malformed: {0}")]
    Format(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Why a payload could not be turned back into state (or into text).
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("compression stream error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("decompressed data is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Failures reported by the host application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("no capturable state")]
    NoState,

    #[error("{0} is not supported by the host")]
    Unsupported(&'static str),

    #[error("{0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Nothing to save yet, make some progress first")]
    NoCapturableState(#[source] HostError),

    #[error("Cannot read {0} payloads: no compression backend available")]
    CodecUnavailable(PayloadEncoding),

    #[error("Save data is corrupted: {0}")]
    CorruptedRecord(#[from] PayloadError),

    #[error("Save storage unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Save not found: {0}")]
    RecordNotFound(String),

    #[error("Load failed: {0}")]
    LoadFailed(String),

    #[error("Not a save bundle: expected a list of saves")]
    InvalidFormat,

    #[error("Incompatible save format version {} (expected {expected})", version_label(.found))]
    IncompatibleVersion { found: Option<u64>, expected: u32 },

    #[error("Bundle contains no valid saves")]
    NoValidRecords,

    #[error("Bundle is corrupted: {0}")]
    CorruptedBundle(#[source] serde_json::Error),

    #[error("Save name cannot be empty")]
    InvalidName,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Api(String),
}

fn version_label(found: &Option<u64>) -> String {
    found.map_or_else(|| "<missing>".to_string(), |v| v.to_string())
}

pub type Result<T> = std::result::Result<T, SaveError>;
