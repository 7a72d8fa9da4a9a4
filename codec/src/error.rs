use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed token identity: {0}")]
    MalformedIdentity(String),

    #[error("transfer fee {0} exceeds the maximum of 50000")]
    TransferFeeTooHigh(u16),
}
