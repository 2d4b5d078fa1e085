use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RxError {
    #[error("failed to load catalog from {path}: {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("invalid catalog: {0}")]
    CatalogInvalid(String),

    #[error("unknown preset '{0}'. Available: {presets}", presets = crate::catalog::builtin::PRESETS.join(", "))]
    UnknownPreset(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("failed to parse prescription: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
