/// Errors that can occur while decoding DDP datagrams.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    /// Too few bytes for the header shape the flags byte declares.
    #[error("malformed header: need {needed} bytes, got {available}")]
    MalformedHeader { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, ProtoError>;
