use quanthuff_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("PNG decode error: {0}")]
    PngDecode(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<png::DecodingError> for AppError {
    fn from(e: png::DecodingError) -> Self {
        AppError::PngDecode(e.to_string())
    }
}

impl From<png::EncodingError> for AppError {
    fn from(e: png::EncodingError) -> Self {
        AppError::PngEncode(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let error = AppError::from(CodecError::MalformedArtifact("bad magic".into()));
        assert_eq!(error.to_string(), "Codec error: Malformed artifact: bad magic");
    }

    #[test]
    fn test_config_error_display() {
        let error = AppError::Config("unknown field".to_string());
        assert_eq!(error.to_string(), "Config error: unknown field");
    }

    #[test]
    fn test_unsupported_image_display() {
        let error = AppError::UnsupportedImage("zero width".to_string());
        assert_eq!(error.to_string(), "Unsupported image: zero width");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: AppError = io.into();
        assert!(matches!(error, AppError::Io(_)));
        assert_eq!(error.to_string(), "IO error: missing");
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<u32>("not: a number").unwrap_err();
        let error: AppError = yaml_err.into();
        assert!(matches!(error, AppError::Config(_)));
    }
}
