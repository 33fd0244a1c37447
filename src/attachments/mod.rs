use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// An uploaded file, read once into memory and carried as a base64 blob.
#[derive(Clone, Debug, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub mime: String,
    pub b64: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Pdf,
}

#[derive(Debug)]
pub enum AttachmentError {
    Io(String, std::io::Error),
    UnsupportedType(String),
    Decode(base64::DecodeError),
}

impl fmt::Display for AttachmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentError::Io(path, e) => write!(f, "Failed to read attachment '{}': {}", path, e),
            AttachmentError::UnsupportedType(path) => {
                write!(f, "Unsupported attachment type for '{}': expected png, jpg, gif, webp or pdf", path)
            }
            AttachmentError::Decode(e) => write!(f, "Attachment blob is not valid base64: {}", e),
        }
    }
}

impl Error for AttachmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AttachmentError::Io(_, e) => Some(e),
            AttachmentError::Decode(e) => Some(e),
            AttachmentError::UnsupportedType(_) => None,
        }
    }
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

impl Attachment {
    pub fn from_bytes(filename: &str, mime: &str, bytes: &[u8]) -> Self {
        Self {
            filename: filename.to_string(),
            mime: mime.to_string(),
            b64: BASE64.encode(bytes),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let display = path.display().to_string();
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension)
            .ok_or_else(|| AttachmentError::UnsupportedType(display.clone()))?;
        let bytes = fs::read(path).map_err(|e| AttachmentError::Io(display, e))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();
        Ok(Self::from_bytes(&filename, mime, &bytes))
    }

    pub fn kind(&self) -> AttachmentKind {
        if self.mime == "application/pdf" {
            AttachmentKind::Pdf
        } else {
            AttachmentKind::Image
        }
    }

    /// Raw bytes for the multipart wire format.
    pub fn bytes(&self) -> Result<Vec<u8>, AttachmentError> {
        BASE64.decode(&self.b64).map_err(AttachmentError::Decode)
    }
}
