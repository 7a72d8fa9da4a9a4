//! Token issuance for events.

use std::sync::Arc;

use admit_codec::{matches_event, TokenId};
use admit_crypto::{blake2b_256, validate_address};
use admit_ledger::{CancelToken, LedgerClient, SubmissionQueue};
use admit_transactions::mint::MAX_MEMO_BYTES;
use admit_transactions::{MintTx, Transaction};
use admit_types::{Address, Clock, EventDescriptor};
use tokio::sync::Mutex;
use tracing::{info, warn, Instrument};

use crate::claim::ClaimCoordinator;
use crate::finality::{bounded, settle, Settled};
use crate::{spans, IssuanceConfig, IssuanceError};

/// Result of [`Minter::mint_bulk`].
///
/// Minting is not batched: each token is its own ledger transaction, so a
/// failure part-way leaves the earlier tokens in place.
#[derive(Debug)]
pub struct BulkMint {
    pub requested: u32,
    /// Tokens minted and delivered to the target, in order.
    pub minted: Vec<TokenId>,
    /// The first failure, if any. Nothing after it was attempted.
    pub failure: Option<BulkFailure>,
}

#[derive(Debug)]
pub struct BulkFailure {
    /// 1-based position of the failed mint.
    pub index: u32,
    pub error: IssuanceError,
}

impl BulkFailure {
    /// Token minted at the failing position but left with the issuer.
    pub fn minted_token(&self) -> Option<&TokenId> {
        self.error.minted_token()
    }
}

impl BulkMint {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.minted.len() == self.requested as usize
    }
}

pub struct Minter {
    issuer: Address,
    ledger: Arc<dyn LedgerClient>,
    queue: Arc<SubmissionQueue>,
    claims: Arc<ClaimCoordinator>,
    clock: Arc<dyn Clock>,
    config: Arc<IssuanceConfig>,
    /// Held from the budget check until the mint is final, so concurrent
    /// mints cannot both pass the same check.
    mint_gate: Mutex<()>,
}

impl Minter {
    pub fn new(
        issuer: Address,
        ledger: Arc<dyn LedgerClient>,
        queue: Arc<SubmissionQueue>,
        claims: Arc<ClaimCoordinator>,
        clock: Arc<dyn Clock>,
        config: Arc<IssuanceConfig>,
    ) -> Self {
        Self {
            issuer,
            ledger,
            queue,
            claims,
            clock,
            config,
            mint_gate: Mutex::new(()),
        }
    }

    pub fn issuer(&self) -> &Address {
        &self.issuer
    }

    /// Mint one token for `event` and hand it to `target` (the issuer when
    /// `None`).
    ///
    /// Input problems are reported before any ledger call. A token that was
    /// minted but could not be handed to `target` is reported as
    /// [`IssuanceError::MintedNotTransferred`].
    pub async fn mint_one(
        &self,
        event: &EventDescriptor,
        target: Option<&Address>,
        cancel: &CancelToken,
    ) -> Result<TokenId, IssuanceError> {
        let tx = self.prepare(event, target)?;
        async {
            let token = self.mint_token(event, tx, cancel).await?;
            self.deliver(token, target, cancel).await
        }
        .instrument(spans::mint_span(event.event_id()))
        .await
    }

    /// Mint `quantity` tokens for `event`, one transaction each, to `target`
    /// (the issuer when `None`).
    ///
    /// Stops at the first failure and returns what was minted so far with
    /// the failing index. The whole request must fit the event's remaining
    /// budget up front.
    pub async fn mint_bulk(
        &self,
        event: &EventDescriptor,
        quantity: u32,
        target: Option<&Address>,
        cancel: &CancelToken,
    ) -> Result<BulkMint, IssuanceError> {
        if quantity == 0 {
            return Err(IssuanceError::Validation("bulk quantity must be at least 1".into()));
        }
        let tx = self.prepare(event, target)?;
        async {
            self.check_budget(event, quantity).await?;

            let mut minted = Vec::with_capacity(quantity as usize);
            for index in 1..=quantity {
                let result = match self.mint_token(event, tx.clone(), cancel).await {
                    Ok(token) => self.deliver(token, target, cancel).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(token) => minted.push(token),
                    Err(error) => {
                        warn!(index, minted = minted.len(), error = %error, "bulk mint stopped");
                        return Ok(BulkMint {
                            requested: quantity,
                            minted,
                            failure: Some(BulkFailure { index, error }),
                        });
                    }
                }
            }
            info!(count = minted.len(), "bulk mint complete");
            Ok(BulkMint {
                requested: quantity,
                minted,
                failure: None,
            })
        }
        .instrument(spans::bulk_mint_span(event.event_id(), quantity))
        .await
    }

    /// Local checks and the mint transaction body.
    fn prepare(
        &self,
        event: &EventDescriptor,
        target: Option<&Address>,
    ) -> Result<MintTx, IssuanceError> {
        if let Some(target) = target {
            if !validate_address(target.as_str()) {
                return Err(IssuanceError::Validation(format!("bad target address {target}")));
            }
        }
        if event.is_expired(self.clock.now()) {
            return Err(IssuanceError::Validation(format!(
                "event {} has expired",
                event.event_id()
            )));
        }
        if let Some(target) = target {
            if *target != self.issuer && !self.config.transferable {
                return Err(IssuanceError::Validation(
                    "cannot mint to another account when tokens are not transferable".into(),
                ));
            }
        }

        let memo = event.to_canonical_json()?;
        if memo.len() > MAX_MEMO_BYTES {
            return Err(IssuanceError::Validation(format!(
                "event metadata is {} bytes, limit is {MAX_MEMO_BYTES}",
                memo.len()
            )));
        }
        Ok(MintTx {
            account: self.issuer.clone(),
            sequence: 0,
            taxon: admit_codec::encode(event),
            flags: self.config.token_flags(),
            transfer_fee: self.config.transfer_fee,
            uri: event.uri().map(MintTx::encode_uri),
            metadata_digest: blake2b_256(memo.as_bytes()),
            memo: Some(memo),
        })
    }

    /// Tokens already issued for `event`, read from the ledger.
    pub async fn issued_count(&self, event: &EventDescriptor) -> Result<u32, IssuanceError> {
        let issued = bounded(
            self.config.query_timeout(),
            self.ledger.query_issued_tokens(&self.issuer),
        )
        .await?;
        let count = issued
            .iter()
            .filter(|token| matches_event(token, event.event_id()))
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn check_budget(&self, event: &EventDescriptor, requested: u32) -> Result<(), IssuanceError> {
        let issued = self.issued_count(event).await?;
        if u64::from(issued) + u64::from(requested) > u64::from(event.quantity()) {
            return Err(IssuanceError::BudgetExhausted {
                event: event.event_id(),
                issued,
                quantity: event.quantity(),
                requested,
            });
        }
        Ok(())
    }

    /// Mint one token to the issuer once the event's budget allows it.
    async fn mint_token(
        &self,
        event: &EventDescriptor,
        tx: MintTx,
        cancel: &CancelToken,
    ) -> Result<TokenId, IssuanceError> {
        let _gate = self.mint_gate.lock().await;
        self.check_budget(event, 1).await?;

        let submitted = self.queue.submit(Transaction::Mint(tx)).await?;
        let settled = settle(
            self.ledger.as_ref(),
            &submitted.receipt.hash,
            self.config.mint_finality_timeout(),
            cancel,
        )
        .await?;
        let token = match settled {
            Settled::Applied(effects) => effects.minted.ok_or_else(|| IssuanceError::Submission {
                code: admit_ledger::RejectCode::Other("no_token_minted".into()),
                message: format!("mint {} validated without a token", submitted.receipt.hash),
            })?,
            Settled::Refused(code) => {
                return Err(IssuanceError::Submission {
                    message: format!("mint {} failed", submitted.receipt.hash),
                    code,
                })
            }
        };
        info!(token = %token, hash = %submitted.receipt.hash, "token minted");
        Ok(token)
    }

    /// Hand a freshly minted token to `target` unless that is the issuer.
    async fn deliver(
        &self,
        token: TokenId,
        target: Option<&Address>,
        cancel: &CancelToken,
    ) -> Result<TokenId, IssuanceError> {
        match target {
            Some(target) if *target != self.issuer => {
                if let Err(e) = self.claims.claim(&token, target, cancel).await {
                    warn!(token = %token, target = %target, error = %e, "minted but transfer failed");
                    return Err(IssuanceError::MintedNotTransferred {
                        token,
                        source: Box::new(e),
                    });
                }
                Ok(token)
            }
            _ => Ok(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admit_codec::TokenFlags;
    use admit_nullables::NullLedger;

    fn minter(config: IssuanceConfig) -> Minter {
        let ledger = Arc::new(NullLedger::new());
        let issuer = ledger.create_account([1u8; 32]);
        let config = Arc::new(config);
        let queue = Arc::new(SubmissionQueue::new(ledger.clone(), ledger.clock()));
        let claims = Arc::new(ClaimCoordinator::new(
            ledger.clone(),
            Arc::clone(&queue),
            ledger.clock(),
            Arc::clone(&config),
        ));
        Minter::new(issuer, ledger.clone(), queue, claims, ledger.clock(), config)
    }

    fn event() -> EventDescriptor {
        EventDescriptor::builder(12_345_678, "Soccer")
            .start_date("2022-11-20 17:30")
            .unwrap()
            .uri("ipfs://bafybeigdyr/ticket.json")
            .quantity(1000)
            .build()
            .unwrap()
    }

    #[test]
    fn mint_embeds_metadata_and_pointer() {
        let minter = minter(IssuanceConfig::default());
        let event = event();
        let tx = minter.prepare(&event, None).unwrap();

        let memo = tx.memo.clone().unwrap();
        assert_eq!(memo, event.to_canonical_json().unwrap());
        assert_eq!(tx.metadata_digest, blake2b_256(memo.as_bytes()));
        assert_eq!(tx.decoded_uri().as_deref(), Some("ipfs://bafybeigdyr/ticket.json"));
        assert_eq!(tx.taxon, admit_codec::Taxon::new(12_345_678));
        assert_eq!(tx.flags, TokenFlags::TRANSFERABLE);
        assert_eq!(tx.account, *minter.issuer());
    }

    #[test]
    fn non_transferable_tokens_cannot_target_others() {
        let minter = minter(IssuanceConfig {
            transferable: false,
            ..IssuanceConfig::default()
        });
        let other = admit_crypto::derive_address(&admit_crypto::keypair_from_seed(&[2u8; 32]).public);
        assert!(matches!(
            minter.prepare(&event(), Some(&other)),
            Err(IssuanceError::Validation(_))
        ));
        assert!(minter.prepare(&event(), None).is_ok());
    }

    #[test]
    fn expired_event_is_rejected_locally() {
        let minter = minter(IssuanceConfig::default());
        let event = EventDescriptor::builder(1, "Old")
            .start_date("2020-01-01")
            .unwrap()
            .expires_at(admit_types::Timestamp::new(1_600_000_000))
            .quantity(1)
            .build()
            .unwrap();
        assert!(matches!(
            minter.prepare(&event, None),
            Err(IssuanceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn zero_bulk_quantity_is_invalid() {
        let minter = minter(IssuanceConfig::default());
        let err = minter
            .mint_bulk(&event(), 0, None, &CancelToken::never())
            .await
            .unwrap_err();
        assert!(matches!(err, IssuanceError::Validation(_)));
    }
}
