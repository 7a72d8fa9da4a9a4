use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("invalid signature on transaction {tx_hash}")]
    InvalidSignature { tx_hash: String },

    #[error("signing key does not belong to account {account}")]
    SignerMismatch { account: String },

    #[error("{field} exceeds {max} bytes")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("offer destination must differ from the offering account")]
    SelfOffer,

    #[error("offer expired at {expiration}, now {now}")]
    OfferAlreadyExpired { expiration: u64, now: u64 },

    #[error("codec error: {0}")]
    Codec(#[from] admit_codec::CodecError),

    #[error("serialization error: {0}")]
    Serialization(String),
}
