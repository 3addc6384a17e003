use thiserror::Error;

/// Crate-wide error type.
///
/// Variants map one-to-one onto the responses the serving layer produces:
/// `InvalidPath` and `Validation` are client faults, `NotFound` is an
/// absence, `PermissionDenied` is an authorization fault, `Io` and `Codec`
/// are server faults.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec failure: {0}")]
    Codec(#[from] image::ImageError),
}

impl AppError {
    /// True for errors caused by the request itself rather than the server.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, AppError::InvalidPath(_) | AppError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_request_faults() {
        assert!(AppError::InvalidPath("..".into()).is_client_fault());
        assert!(AppError::Validation("bad size".into()).is_client_fault());

        assert!(!AppError::NotFound("x".into()).is_client_fault());
        assert!(!AppError::PermissionDenied("x".into()).is_client_fault());
        assert!(!AppError::Io(std::io::Error::other("disk")).is_client_fault());
    }
}
