//! One issuing account with everything it needs.

use std::collections::BTreeMap;
use std::sync::Arc;

use admit_codec::{matches_event, TokenId};
use admit_crypto::{validate_address, Ed25519Verifier, SignatureVerifier};
use admit_ledger::{Cancellation, LedgerClient, SubmissionQueue};
use admit_types::{Address, Clock, EventDescriptor, EventId, Signature, SystemClock};
use admit_utils::StatsCounter;
use tracing::info;

use crate::finality::bounded;
use crate::verifier::challenge_message;
use crate::{
    BulkMint, ClaimCoordinator, IssuanceConfig, IssuanceError, IssuerCapability, LookupService,
    Minter, OwnershipRecord, Verifier,
};

const STAT_NAMES: &[&str] = &[
    "minted",
    "mint_failures",
    "claimed",
    "verified",
    "verify_rejected",
    "lookups",
];

/// Facade over the lifecycle components for one issuer account.
///
/// All components share one [`SubmissionQueue`], so the issuer's mints and
/// offers never race for a sequence number. [`shutdown`](Self::shutdown)
/// abandons every pending finality wait.
pub struct Issuer {
    account: Address,
    ledger: Arc<dyn LedgerClient>,
    config: Arc<IssuanceConfig>,
    minter: Minter,
    claims: Arc<ClaimCoordinator>,
    verifier: Verifier,
    lookup: LookupService,
    stats: StatsCounter,
    cancellation: Cancellation,
}

impl Issuer {
    /// Issuer using the system clock and Ed25519 verification.
    pub fn new(
        account: Address,
        ledger: Arc<dyn LedgerClient>,
        config: IssuanceConfig,
    ) -> Result<Self, IssuanceError> {
        Self::with_parts(
            account,
            ledger,
            Arc::new(SystemClock),
            Arc::new(Ed25519Verifier),
            config,
        )
    }

    pub fn with_parts(
        account: Address,
        ledger: Arc<dyn LedgerClient>,
        clock: Arc<dyn Clock>,
        signatures: Arc<dyn SignatureVerifier>,
        config: IssuanceConfig,
    ) -> Result<Self, IssuanceError> {
        config.validate()?;
        if !validate_address(account.as_str()) {
            return Err(IssuanceError::Validation(format!("bad issuer address {account}")));
        }
        let config = Arc::new(config);
        let queue = Arc::new(SubmissionQueue::new(Arc::clone(&ledger), Arc::clone(&clock)));
        let claims = Arc::new(ClaimCoordinator::new(
            Arc::clone(&ledger),
            Arc::clone(&queue),
            Arc::clone(&clock),
            Arc::clone(&config),
        ));
        let minter = Minter::new(
            account.clone(),
            Arc::clone(&ledger),
            queue,
            Arc::clone(&claims),
            clock,
            Arc::clone(&config),
        );
        let verifier = Verifier::new(Arc::clone(&ledger), signatures, Arc::clone(&config));
        let lookup = LookupService::new(account.clone(), Arc::clone(&ledger), Arc::clone(&config));
        info!(issuer = %account, "issuer ready");

        Ok(Self {
            account,
            ledger,
            config,
            minter,
            claims,
            verifier,
            lookup,
            stats: StatsCounter::new(STAT_NAMES),
            cancellation: Cancellation::new(),
        })
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn config(&self) -> &IssuanceConfig {
        &self.config
    }

    /// Capability for reading private events.
    pub fn capability(&self) -> IssuerCapability {
        IssuerCapability::new(self.account.clone())
    }

    pub fn minter(&self) -> &Minter {
        &self.minter
    }

    pub fn claims(&self) -> &ClaimCoordinator {
        &self.claims
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn lookup(&self) -> &LookupService {
        &self.lookup
    }

    pub async fn mint_one(
        &self,
        event: &EventDescriptor,
        target: Option<&Address>,
    ) -> Result<TokenId, IssuanceError> {
        let result = self
            .minter
            .mint_one(event, target, &self.cancellation.token())
            .await;
        match &result {
            Ok(_) => self.stats.increment("minted"),
            Err(_) => self.stats.increment("mint_failures"),
        }
        result
    }

    pub async fn mint_bulk(
        &self,
        event: &EventDescriptor,
        quantity: u32,
        target: Option<&Address>,
    ) -> Result<BulkMint, IssuanceError> {
        let result = self
            .minter
            .mint_bulk(event, quantity, target, &self.cancellation.token())
            .await;
        match &result {
            Ok(bulk) => {
                self.stats.add("minted", bulk.minted.len() as u64);
                if bulk.failure.is_some() {
                    self.stats.increment("mint_failures");
                }
            }
            Err(_) => self.stats.increment("mint_failures"),
        }
        result
    }

    pub async fn claim(
        &self,
        token: &TokenId,
        to: &Address,
    ) -> Result<OwnershipRecord, IssuanceError> {
        let record = self
            .claims
            .claim(token, to, &self.cancellation.token())
            .await?;
        self.stats.increment("claimed");
        Ok(record)
    }

    pub async fn verify(
        &self,
        account: &Address,
        token: &TokenId,
        signature: &str,
    ) -> Result<bool, IssuanceError> {
        let valid = self.verifier.verify(account, token, signature).await?;
        self.stats
            .increment(if valid { "verified" } else { "verify_rejected" });
        Ok(valid)
    }

    pub async fn lookup_holders(
        &self,
        event: &EventDescriptor,
        caller: Option<&IssuerCapability>,
    ) -> Result<Vec<Address>, IssuanceError> {
        self.stats.increment("lookups");
        self.lookup.lookup_holders(event, caller).await
    }

    /// Tokens `account` currently holds, optionally only those of one event.
    pub async fn tokens_of(
        &self,
        account: &Address,
        event: Option<EventId>,
    ) -> Result<Vec<TokenId>, IssuanceError> {
        let tokens = bounded(
            self.config.query_timeout(),
            self.ledger.query_account_tokens(account),
        )
        .await?;
        Ok(match event {
            Some(event) => tokens
                .into_iter()
                .filter(|token| matches_event(token, event))
                .collect(),
            None => tokens,
        })
    }

    /// Ask the wallet holding `account` to sign its challenge for `token`.
    pub async fn request_signature(
        &self,
        account: &Address,
        token: &TokenId,
    ) -> Result<Signature, IssuanceError> {
        Ok(self
            .ledger
            .sign_message(account, &challenge_message(account, token))
            .await?)
    }

    pub fn stats(&self) -> BTreeMap<&'static str, u64> {
        self.stats.snapshot()
    }

    /// Stop waiting on every in-flight and future finality wait.
    ///
    /// Transactions already submitted are unaffected.
    pub fn shutdown(&self) {
        info!(issuer = %self.account, "abandoning pending finality waits");
        self.cancellation.cancel();
    }
}
