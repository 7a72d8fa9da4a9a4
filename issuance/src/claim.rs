//! Ownership transfer through the ledger's offer/accept handshake.
//!
//! The current owner offers the token to the destination with a short
//! expiry, then the destination accepts. Ownership is re-read from the
//! ledger before every retry, so a step that may have landed is never
//! repeated blindly.

use std::sync::Arc;

use admit_codec::TokenId;
use admit_crypto::validate_address;
use admit_ledger::{CancelToken, LedgerClient, LedgerError, RejectCode, SubmissionQueue};
use admit_transactions::{AcceptOfferTx, CreateOfferTx, OfferId, Transaction};
use admit_types::{Address, Clock, TxHash};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use crate::finality::{bounded, settle, Settled};
use crate::{spans, IssuanceConfig, IssuanceError};

/// A token and the account that owns it, as read from the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub token: TokenId,
    pub owner: Address,
}

pub struct ClaimCoordinator {
    ledger: Arc<dyn LedgerClient>,
    queue: Arc<SubmissionQueue>,
    clock: Arc<dyn Clock>,
    config: Arc<IssuanceConfig>,
}

impl ClaimCoordinator {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        queue: Arc<SubmissionQueue>,
        clock: Arc<dyn Clock>,
        config: Arc<IssuanceConfig>,
    ) -> Self {
        Self {
            ledger,
            queue,
            clock,
            config,
        }
    }

    /// Make `to` the owner of `token`.
    ///
    /// Idempotent: if `to` already owns the token the current record is
    /// returned and no transaction is submitted.
    pub async fn claim(
        &self,
        token: &TokenId,
        to: &Address,
        cancel: &CancelToken,
    ) -> Result<OwnershipRecord, IssuanceError> {
        match self.try_transfer(token, to, cancel).await {
            Err(IssuanceError::AlreadyOwned(record)) => {
                debug!(token = %token, owner = %record.owner, "already owned by destination");
                Ok(record)
            }
            other => other,
        }
    }

    /// Like [`claim`](Self::claim), but reports an existing ownership as
    /// [`IssuanceError::AlreadyOwned`].
    pub async fn try_transfer(
        &self,
        token: &TokenId,
        to: &Address,
        cancel: &CancelToken,
    ) -> Result<OwnershipRecord, IssuanceError> {
        if !validate_address(to.as_str()) {
            return Err(IssuanceError::Validation(format!("bad destination address {to}")));
        }
        let result = self
            .transfer(token, to, cancel)
            .instrument(spans::claim_span(token, to))
            .await;
        // Destinations are rarely reused, so their queue state is not kept.
        self.queue.cleanup().await;
        result
    }

    /// Accounts the submission queue currently tracks.
    pub async fn queued_accounts(&self) -> usize {
        self.queue.active_accounts().await
    }

    async fn transfer(
        &self,
        token: &TokenId,
        to: &Address,
        cancel: &CancelToken,
    ) -> Result<OwnershipRecord, IssuanceError> {
        let mut owner = self.current_owner(token, to).await?;
        let mut expired = 0u32;
        let mut retries = 0u32;

        loop {
            match self.hand_over(token, &owner, to, expired + 1, cancel).await {
                Ok(()) => break,
                Err(IssuanceError::Ledger(e))
                    if e.is_transient() && retries < self.config.max_submit_retries =>
                {
                    retries += 1;
                    warn!(token = %token, retry = retries, error = %e, "transient failure, re-checking ownership");
                }
                Err(IssuanceError::OfferExpired { .. })
                    if expired + 1 < self.config.max_offer_attempts =>
                {
                    expired += 1;
                    warn!(token = %token, attempt = expired, "offer expired before acceptance, re-offering");
                }
                Err(e) => return Err(e),
            }
            // A step whose response was lost may still have landed.
            match self.owner_of(token).await? {
                Some(current) if current == *to => break,
                Some(current) => owner = current,
                None => return Err(IssuanceError::TokenNotFound(*token)),
            }
        }

        let record = OwnershipRecord {
            token: *token,
            owner: to.clone(),
        };
        match self.owner_of(token).await? {
            Some(confirmed) if confirmed == *to => {
                info!(token = %token, from = %owner, to = %to, "token claimed");
                Ok(record)
            }
            Some(_) => Err(IssuanceError::TransferRejected {
                token: *token,
                code: RejectCode::Other("ownership_not_confirmed".into()),
            }),
            None => Err(IssuanceError::TokenNotFound(*token)),
        }
    }

    /// Current owner, or `AlreadyOwned` if it is already `to`.
    async fn current_owner(&self, token: &TokenId, to: &Address) -> Result<Address, IssuanceError> {
        match self.owner_of(token).await? {
            Some(owner) if owner == *to => Err(IssuanceError::AlreadyOwned(OwnershipRecord {
                token: *token,
                owner,
            })),
            Some(owner) => Ok(owner),
            None => Err(IssuanceError::TokenNotFound(*token)),
        }
    }

    async fn owner_of(&self, token: &TokenId) -> Result<Option<Address>, IssuanceError> {
        Ok(bounded(self.config.query_timeout(), self.ledger.query_token_owner(token)).await?)
    }

    /// One offer from `owner` and its acceptance by `to`.
    async fn hand_over(
        &self,
        token: &TokenId,
        owner: &Address,
        to: &Address,
        attempt: u32,
        cancel: &CancelToken,
    ) -> Result<(), IssuanceError> {
        let offer = CreateOfferTx {
            account: owner.clone(),
            sequence: 0,
            token_id: *token,
            destination: to.clone(),
            expiration: self.clock.now().plus_secs(self.config.offer_ttl_secs),
        };
        let submitted = self
            .queue
            .submit(Transaction::CreateOffer(offer))
            .await
            .map_err(|e| self.transfer_error(token, attempt, e))?;
        let offer_id: OfferId = match self.settle(&submitted.receipt.hash, cancel).await? {
            Settled::Applied(effects) => effects
                .offer
                .or_else(|| submitted.signed.tx.created_offer())
                .ok_or_else(|| IssuanceError::TransferRejected {
                    token: *token,
                    code: RejectCode::Other("offer_not_created".into()),
                })?,
            Settled::Refused(code) => return Err(self.reject(token, attempt, code)),
        };
        debug!(token = %token, offer = %offer_id, "offer created");

        let accept = AcceptOfferTx {
            account: to.clone(),
            sequence: 0,
            offer_id,
        };
        let submitted = self
            .queue
            .submit(Transaction::AcceptOffer(accept))
            .await
            .map_err(|e| self.transfer_error(token, attempt, e))?;
        match self.settle(&submitted.receipt.hash, cancel).await? {
            Settled::Applied(_) => Ok(()),
            Settled::Refused(code) => Err(self.reject(token, attempt, code)),
        }
    }

    async fn settle(
        &self,
        hash: &TxHash,
        cancel: &CancelToken,
    ) -> Result<Settled, IssuanceError> {
        settle(
            self.ledger.as_ref(),
            hash,
            self.config.claim_finality_timeout(),
            cancel,
        )
        .await
    }

    fn transfer_error(&self, token: &TokenId, attempt: u32, e: LedgerError) -> IssuanceError {
        match e {
            LedgerError::Rejected { code, .. } => self.reject(token, attempt, code),
            other => other.into(),
        }
    }

    fn reject(&self, token: &TokenId, attempt: u32, code: RejectCode) -> IssuanceError {
        match code {
            RejectCode::TokenNotFound => IssuanceError::TokenNotFound(*token),
            RejectCode::OfferExpired => IssuanceError::OfferExpired {
                token: *token,
                attempts: attempt,
            },
            code => IssuanceError::TransferRejected {
                token: *token,
                code,
            },
        }
    }
}
