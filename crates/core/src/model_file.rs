//! Model file types and the alignment contract of the engine loader

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of file making up a translation model
///
/// The serialized names match the model registry used by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelFileType {
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "lex")]
    Lex,
    #[serde(rename = "vocab")]
    Vocab,
    #[serde(rename = "qualityModel")]
    QualityModel,
}

impl ModelFileType {
    /// All file types in the order the engine expects them
    pub const ALL: [ModelFileType; 4] = [
        ModelFileType::Model,
        ModelFileType::Lex,
        ModelFileType::Vocab,
        ModelFileType::QualityModel,
    ];

    /// Byte alignment the engine loader requires for this file type
    pub const fn alignment(self) -> usize {
        match self {
            ModelFileType::Model => 256,
            ModelFileType::Lex => 64,
            ModelFileType::Vocab => 64,
            ModelFileType::QualityModel => 64,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ModelFileType::Model => "model",
            ModelFileType::Lex => "lex",
            ModelFileType::Vocab => "vocab",
            ModelFileType::QualityModel => "qualityModel",
        }
    }
}

impl fmt::Display for ModelFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to one downloaded model file handed over by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelBlob {
    /// File contents already in memory
    Bytes(Vec<u8>),
    /// File stored on local disk
    Path(PathBuf),
}

impl ModelBlob {
    /// Read the blob contents
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            ModelBlob::Bytes(bytes) => Ok(bytes.clone()),
            ModelBlob::Path(path) => tokio::fs::read(path).await,
        }
    }
}

impl fmt::Display for ModelBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelBlob::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            ModelBlob::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
