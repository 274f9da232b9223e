use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Checkpoint encodings the uploader can recognize by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointFormat {
    /// 8-byte little-endian header length followed by a JSON tensor header.
    Safetensors,
    /// Plain JSON checkpoint.
    Json,
    /// Pickle-based archive (`.pt`/`.pth`/`.bin`): ZIP container or raw
    /// pickle protocol 2 stream.
    PickleArchive,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointInspection {
    pub format: CheckpointFormat,
    pub size_bytes: u64,
    /// Number of tensors/top-level entries, when the format exposes one.
    pub tensor_count: Option<usize>,
}

pub fn sha256_file(path: &Path) -> TrainingResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Best-effort checkpoint verification.
///
/// Callers treat the result as advisory: an `Unknown` format or an error is
/// logged, never a reason to abort an upload.
pub fn inspect_checkpoint(path: &Path) -> TrainingResult<CheckpointInspection> {
    if !path.exists() {
        return Err(TrainingError::Artifact(format!("file not found: {}", path.display())));
    }
    let bytes = std::fs::read(path)?;
    let size_bytes = bytes.len() as u64;

    if let Some(tensor_count) = safetensors_tensor_count(&bytes) {
        return Ok(CheckpointInspection {
            format: CheckpointFormat::Safetensors,
            size_bytes,
            tensor_count: Some(tensor_count),
        });
    }

    if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"\x80\x02") {
        return Ok(CheckpointInspection {
            format: CheckpointFormat::PickleArchive,
            size_bytes,
            tensor_count: None,
        });
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
        let tensor_count = value.as_object().map(serde_json::Map::len);
        return Ok(CheckpointInspection { format: CheckpointFormat::Json, size_bytes, tensor_count });
    }

    Ok(CheckpointInspection { format: CheckpointFormat::Unknown, size_bytes, tensor_count: None })
}

fn safetensors_tensor_count(bytes: &[u8]) -> Option<usize> {
    let header_len_bytes: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    let header_len = usize::try_from(u64::from_le_bytes(header_len_bytes)).ok()?;
    let header = bytes.get(8..8 + header_len)?;
    let value: serde_json::Value = serde_json::from_slice(header).ok()?;
    let map = value.as_object()?;
    Some(map.keys().filter(|key| key.as_str() != "__metadata__").count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_inspect_missing_file_is_an_error() {
        let result = inspect_checkpoint(Path::new("/nonexistent/model.bin"));
        assert!(matches!(result, Err(TrainingError::Artifact(_))));
    }

    #[test]
    fn test_inspect_recognizes_safetensors_header() {
        let header = br#"{"__metadata__":{},"weight":{"dtype":"F32","shape":[2],"data_offsets":[0,8]}}"#;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(header.len() as u64).to_le_bytes());
        bytes.extend_from_slice(header);
        bytes.extend_from_slice(&[0u8; 8]);

        let file = write_temp(&bytes);
        let inspection = inspect_checkpoint(file.path()).unwrap();
        assert_eq!(inspection.format, CheckpointFormat::Safetensors);
        assert_eq!(inspection.tensor_count, Some(1));
    }

    #[test]
    fn test_inspect_recognizes_json_checkpoint() {
        let file = write_temp(br#"{"weights": [0.1, 0.2], "bias": 0.0}"#);
        let inspection = inspect_checkpoint(file.path()).unwrap();
        assert_eq!(inspection.format, CheckpointFormat::Json);
        assert_eq!(inspection.tensor_count, Some(2));
    }

    #[test]
    fn test_inspect_recognizes_pickle_archive() {
        let file = write_temp(b"PK\x03\x04rest-of-zip");
        let inspection = inspect_checkpoint(file.path()).unwrap();
        assert_eq!(inspection.format, CheckpointFormat::PickleArchive);
    }

    #[test]
    fn test_inspect_falls_back_to_unknown() {
        let file = write_temp(b"\x00\x01\x02garbage");
        let inspection = inspect_checkpoint(file.path()).unwrap();
        assert_eq!(inspection.format, CheckpointFormat::Unknown);
    }

    #[test]
    fn test_sha256_is_stable() {
        let file = write_temp(b"checkpoint-bytes");
        let a = sha256_file(file.path()).unwrap();
        let b = sha256_file(file.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
