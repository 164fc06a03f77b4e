//! Payload encoding.
//!
//! State is serialized to JSON. When compression is enabled and a backend is
//! registered, the JSON is gzip-compressed and base64-encoded, and the payload
//! is tagged so decoding knows which transform to reverse.

use crate::config::SettingsHandle;
use crate::error::{PayloadError, Result, SaveError};
use crate::model::{Payload, PayloadEncoding};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::io::{Read, Write};
use std::sync::Arc;

/// A reversible text compression transform.
pub trait CompressionBackend: Send + Sync {
    /// Tag written on payloads produced by this backend.
    fn encoding(&self) -> PayloadEncoding;

    fn compress(&self, text: &str) -> std::result::Result<String, PayloadError>;

    fn decompress(&self, data: &str) -> std::result::Result<String, PayloadError>;
}

/// gzip, then base64 so the result is storable as text.
#[derive(Debug, Default, Clone, Copy)]
pub struct GzipBackend;

impl CompressionBackend for GzipBackend {
    fn encoding(&self) -> PayloadEncoding {
        PayloadEncoding::Gzip
    }

    fn compress(&self, text: &str) -> std::result::Result<String, PayloadError> {
        // The gzip header carries no mtime here, so output is deterministic.
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes())?;
        let bytes = encoder.finish()?;
        Ok(STANDARD.encode(bytes))
    }

    fn decompress(&self, data: &str) -> std::result::Result<String, PayloadError> {
        let bytes = STANDARD.decode(data)?;
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

#[derive(Clone)]
pub struct Codec {
    settings: SettingsHandle,
    backend: Option<Arc<dyn CompressionBackend>>,
}

impl Codec {
    /// Codec with the gzip backend registered.
    pub fn new(settings: SettingsHandle) -> Self {
        Self {
            settings,
            backend: Some(Arc::new(GzipBackend)),
        }
    }

    /// Codec with no compression backend; compressed payloads cannot be read.
    pub fn without_compression(settings: SettingsHandle) -> Self {
        Self {
            settings,
            backend: None,
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn CompressionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn encode(&self, state: &Value) -> Result<Payload> {
        let text = serde_json::to_string(state).map_err(PayloadError::from)?;

        match &self.backend {
            Some(backend) if self.settings.compression_enabled() => Ok(Payload {
                data: backend.compress(&text)?,
                tag: backend.encoding(),
            }),
            _ => Ok(Payload {
                data: text,
                tag: PayloadEncoding::Plain,
            }),
        }
    }

    pub fn decode(&self, payload: &Payload) -> Result<Value> {
        let text = match payload.tag {
            PayloadEncoding::Plain => payload.data.clone(),
            tag => match &self.backend {
                Some(backend) if backend.encoding() == tag => backend.decompress(&payload.data)?,
                _ => return Err(SaveError::CodecUnavailable(tag)),
            },
        };
        Ok(serde_json::from_str(&text).map_err(PayloadError::from)?)
    }
}
