//! Transaction validation logic.

use admit_codec::token_id::MAX_TRANSFER_FEE;
use admit_codec::CodecError;
use admit_crypto::decode_address;
use admit_types::Timestamp;

use crate::error::TransactionError;
use crate::mint::{MAX_MEMO_BYTES, MAX_URI_BYTES};
use crate::signed::SignedTransaction;
use crate::Transaction;

/// Validate a signed transaction's basic structure (signer, signature, field limits).
///
/// This performs stateless validation only. Stateful checks (ownership,
/// sequence numbers, offer existence) are done by the ledger.
pub fn validate_transaction(
    signed: &SignedTransaction,
    now: Timestamp,
) -> Result<(), TransactionError> {
    let account = signed.tx.account();
    let account_key = decode_address(account.as_str()).ok_or_else(|| {
        TransactionError::SignerMismatch {
            account: account.to_string(),
        }
    })?;
    if account_key != signed.signing_key {
        return Err(TransactionError::SignerMismatch {
            account: account.to_string(),
        });
    }

    if !signed.has_valid_signature() {
        return Err(TransactionError::InvalidSignature {
            tx_hash: signed.hash.to_string(),
        });
    }

    match &signed.tx {
        Transaction::Mint(mint) => {
            if mint.transfer_fee > MAX_TRANSFER_FEE {
                return Err(CodecError::TransferFeeTooHigh(mint.transfer_fee).into());
            }
            // Hex doubles the length.
            if mint.uri.as_ref().is_some_and(|u| u.len() > MAX_URI_BYTES * 2) {
                return Err(TransactionError::FieldTooLong {
                    field: "uri",
                    max: MAX_URI_BYTES,
                });
            }
            if mint.memo.as_ref().is_some_and(|m| m.len() > MAX_MEMO_BYTES) {
                return Err(TransactionError::FieldTooLong {
                    field: "memo",
                    max: MAX_MEMO_BYTES,
                });
            }
        }
        Transaction::CreateOffer(offer) => {
            if offer.destination == offer.account {
                return Err(TransactionError::SelfOffer);
            }
            if offer.expiration <= now {
                return Err(TransactionError::OfferAlreadyExpired {
                    expiration: offer.expiration.as_secs(),
                    now: now.as_secs(),
                });
            }
        }
        Transaction::AcceptOffer(_) => {}
    }

    Ok(())
}
