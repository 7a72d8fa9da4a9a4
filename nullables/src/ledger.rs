//! Nullable ledger: an in-memory, single-node stand-in for the real ledger.
//!
//! Applies mint, create-offer and accept-offer transactions with the same
//! rules the issuance core relies on (per-account sequences, owner-only
//! offers, destination-only accepts, offer expiry) and finalizes them
//! immediately. Faults can be injected to exercise error paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admit_codec::{compose, DecodedToken, TokenId};
use admit_crypto::{account_id_of, derive_address, keypair_from_seed, sign_message};
use admit_ledger::{FinalityResult, LedgerClient, LedgerError, RejectCode, SubmitReceipt, TxEffects};
use admit_transactions::{
    AcceptOfferTx, CreateOfferTx, MintTx, OfferId, SignedTransaction, Transaction,
};
use admit_types::{Address, Clock, KeyPair, Signature, Timestamp, TxHash};
use async_trait::async_trait;

use crate::clock::NullClock;

/// Sequence every account starts at.
const FIRST_SEQUENCE: u32 = 1;

#[derive(Debug, Clone)]
struct StandingOffer {
    token: TokenId,
    owner: Address,
    destination: Address,
    expiration: Timestamp,
}

#[derive(Default)]
struct LedgerState {
    ledger_index: u64,
    keys: HashMap<Address, KeyPair>,
    sequences: HashMap<Address, u32>,
    /// All tokens in mint order.
    tokens: Vec<TokenId>,
    owners: HashMap<TokenId, Address>,
    issued: HashMap<Address, Vec<TokenId>>,
    offers: HashMap<OfferId, StandingOffer>,
    results: HashMap<TxHash, FinalityResult>,
    submitted_kinds: Vec<&'static str>,
}

#[derive(Default)]
struct Faults {
    mints_seen: usize,
    fail_mint_at: Option<(usize, RejectCode)>,
    fail_submissions: u32,
    drop_responses: u32,
    expire_offers: u32,
    withhold_finality: bool,
    refuse_transfers_to: HashSet<Address>,
}

/// In-memory ledger for tests.
pub struct NullLedger {
    state: Mutex<LedgerState>,
    faults: Mutex<Faults>,
    clock: Arc<NullClock>,
    owner_queries: AtomicUsize,
    sign_requests: AtomicUsize,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(NullClock::new(1_668_965_400)))
    }

    pub fn with_clock(clock: Arc<NullClock>) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            faults: Mutex::new(Faults::default()),
            clock,
            owner_queries: AtomicUsize::new(0),
            sign_requests: AtomicUsize::new(0),
        }
    }

    /// The clock used for offer expiry.
    pub fn clock(&self) -> Arc<NullClock> {
        Arc::clone(&self.clock)
    }

    /// Create an account whose wallet this ledger holds, so it can sign on
    /// the account's behalf.
    pub fn create_account(&self, seed: [u8; 32]) -> Address {
        self.register_keys(keypair_from_seed(&seed))
    }

    pub fn register_keys(&self, keys: KeyPair) -> Address {
        let address = derive_address(&keys.public);
        let mut state = self.state.lock().unwrap();
        state.sequences.entry(address.clone()).or_insert(FIRST_SEQUENCE);
        state.keys.insert(address.clone(), keys);
        address
    }

    // --- fault injection ---

    /// Reject the `n`-th mint from now (1-based) with `code`.
    pub fn fail_mint_at(&self, n: usize, code: RejectCode) {
        let mut faults = self.faults.lock().unwrap();
        let at = faults.mints_seen + n;
        faults.fail_mint_at = Some((at, code));
    }

    /// Fail the next `n` submissions with a transport error before they
    /// reach the ledger.
    pub fn fail_next_submissions(&self, n: u32) {
        self.faults.lock().unwrap().fail_submissions = n;
    }

    /// Apply the next `n` submissions but lose the response.
    pub fn drop_next_responses(&self, n: u32) {
        self.faults.lock().unwrap().drop_responses = n;
    }

    /// The next `n` accepts find their offer already expired.
    pub fn expire_next_offers(&self, n: u32) {
        self.faults.lock().unwrap().expire_offers = n;
    }

    /// Never finalize anything; finality waits run to their timeout.
    pub fn withhold_finality(&self, withhold: bool) {
        self.faults.lock().unwrap().withhold_finality = withhold;
    }

    /// `account` refuses incoming tokens.
    pub fn refuse_transfers_to(&self, account: &Address) {
        self.faults
            .lock()
            .unwrap()
            .refuse_transfers_to
            .insert(account.clone());
    }

    /// Consume sequences out of band, as if another client submitted for
    /// `account`.
    pub fn advance_sequence(&self, account: &Address, by: u32) {
        let mut state = self.state.lock().unwrap();
        let next = state.sequences.entry(account.clone()).or_insert(FIRST_SEQUENCE);
        *next += by;
    }

    // --- observation ---

    /// Transactions submitted so far, by kind (`"mint"`, `"create_offer"`, `"accept_offer"`).
    pub fn submitted(&self, kind: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.submitted_kinds.iter().filter(|k| **k == kind).count()
    }

    pub fn total_submitted(&self) -> usize {
        self.state.lock().unwrap().submitted_kinds.len()
    }

    pub fn owner_queries(&self) -> usize {
        self.owner_queries.load(Ordering::SeqCst)
    }

    pub fn sign_requests(&self) -> usize {
        self.sign_requests.load(Ordering::SeqCst)
    }

    pub fn open_offers(&self) -> usize {
        self.state.lock().unwrap().offers.len()
    }

    // --- transaction application ---

    fn apply(&self, state: &mut LedgerState, signed: &SignedTransaction) -> FinalityResult {
        let outcome = match &signed.tx {
            Transaction::Mint(tx) => Self::apply_mint(state, tx),
            Transaction::CreateOffer(tx) => self.apply_create_offer(state, tx),
            Transaction::AcceptOffer(tx) => self.apply_accept_offer(state, tx),
        };
        state.ledger_index += 1;
        match outcome {
            Ok(effects) => FinalityResult::Validated {
                ledger_index: state.ledger_index,
                effects,
            },
            Err(code) => FinalityResult::Failed { code },
        }
    }

    fn apply_mint(state: &mut LedgerState, tx: &MintTx) -> Result<TxEffects, RejectCode> {
        let issuer = account_id_of(&tx.account).ok_or(RejectCode::Malformed)?;
        let issued = state.issued.entry(tx.account.clone()).or_default();
        let token = compose(&DecodedToken {
            flags: tx.flags,
            transfer_fee: tx.transfer_fee,
            issuer,
            taxon: tx.taxon,
            sequence: issued.len() as u32,
        })
        .map_err(|_| RejectCode::Malformed)?;
        issued.push(token);
        state.tokens.push(token);
        state.owners.insert(token, tx.account.clone());
        Ok(TxEffects {
            minted: Some(token),
            offer: None,
        })
    }

    fn apply_create_offer(
        &self,
        state: &mut LedgerState,
        tx: &CreateOfferTx,
    ) -> Result<TxEffects, RejectCode> {
        let owner = state.owners.get(&tx.token_id).ok_or(RejectCode::TokenNotFound)?;
        if *owner != tx.account {
            return Err(RejectCode::NotOwner);
        }
        let issuer_held = state
            .issued
            .get(&tx.account)
            .is_some_and(|tokens| tokens.contains(&tx.token_id));
        if !tx.token_id.decode().flags.is_transferable() && !issuer_held {
            return Err(RejectCode::NotTransferable);
        }
        if tx.expiration <= self.clock.now() {
            return Err(RejectCode::OfferExpired);
        }
        let offer_id = tx.offer_id();
        state.offers.insert(
            offer_id,
            StandingOffer {
                token: tx.token_id,
                owner: tx.account.clone(),
                destination: tx.destination.clone(),
                expiration: tx.expiration,
            },
        );
        Ok(TxEffects {
            minted: None,
            offer: Some(offer_id),
        })
    }

    fn apply_accept_offer(
        &self,
        state: &mut LedgerState,
        tx: &AcceptOfferTx,
    ) -> Result<TxEffects, RejectCode> {
        let offer = state
            .offers
            .get(&tx.offer_id)
            .cloned()
            .ok_or(RejectCode::OfferNotFound)?;
        if offer.destination != tx.account {
            return Err(RejectCode::WrongDestination);
        }

        let forced_expiry = {
            let mut faults = self.faults.lock().unwrap();
            if faults.refuse_transfers_to.contains(&tx.account) {
                return Err(RejectCode::NoPermission);
            }
            if faults.expire_offers > 0 {
                faults.expire_offers -= 1;
                true
            } else {
                false
            }
        };
        if forced_expiry || offer.expiration <= self.clock.now() {
            state.offers.remove(&tx.offer_id);
            return Err(RejectCode::OfferExpired);
        }

        if state.owners.get(&offer.token) != Some(&offer.owner) {
            state.offers.remove(&tx.offer_id);
            return Err(RejectCode::NotOwner);
        }
        state.owners.insert(offer.token, tx.account.clone());
        state.offers.retain(|_, o| o.token != offer.token);
        Ok(TxEffects::default())
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<SubmitReceipt, LedgerError> {
        let is_mint = matches!(tx.tx, Transaction::Mint(_));
        let drop_response = {
            let mut faults = self.faults.lock().unwrap();
            if faults.fail_submissions > 0 {
                faults.fail_submissions -= 1;
                return Err(LedgerError::Transport("connection reset".into()));
            }
            if is_mint {
                faults.mints_seen += 1;
                let seen = faults.mints_seen;
                if let Some((at, code)) = faults.fail_mint_at.clone() {
                    if at == seen {
                        faults.fail_mint_at = None;
                        return Err(LedgerError::Rejected {
                            code,
                            message: format!("mint #{seen} refused"),
                        });
                    }
                }
            }
            if faults.drop_responses > 0 {
                faults.drop_responses -= 1;
                true
            } else {
                false
            }
        };

        if !tx.has_valid_signature() {
            return Err(LedgerError::Rejected {
                code: RejectCode::Malformed,
                message: "bad signature".into(),
            });
        }

        let mut state = self.state.lock().unwrap();
        let account = tx.tx.account().clone();
        let expected = *state.sequences.get(&account).unwrap_or(&FIRST_SEQUENCE);
        if tx.tx.sequence() != expected {
            return Err(LedgerError::StaleSequence {
                account: account.to_string(),
                submitted: tx.tx.sequence(),
                expected,
            });
        }
        state.sequences.insert(account, expected + 1);
        state.submitted_kinds.push(tx.tx.kind());

        let result = self.apply(&mut state, tx);
        state.results.insert(tx.hash, result);
        let receipt = SubmitReceipt {
            hash: tx.hash,
            ledger_index: state.ledger_index,
        };
        drop(state);

        if drop_response {
            return Err(LedgerError::Transport("response lost".into()));
        }
        Ok(receipt)
    }

    async fn wait_for_finality(
        &self,
        hash: &TxHash,
        timeout: Duration,
    ) -> Result<FinalityResult, LedgerError> {
        let withheld = self.faults.lock().unwrap().withhold_finality;
        if withheld {
            tokio::time::sleep(timeout).await;
            return Ok(FinalityResult::Pending);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .results
            .get(hash)
            .cloned()
            .unwrap_or(FinalityResult::Pending))
    }

    async fn query_account_tokens(&self, account: &Address) -> Result<Vec<TokenId>, LedgerError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tokens
            .iter()
            .filter(|t| state.owners.get(*t) == Some(account))
            .copied()
            .collect())
    }

    async fn query_token_owner(&self, token: &TokenId) -> Result<Option<Address>, LedgerError> {
        self.owner_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().owners.get(token).cloned())
    }

    async fn query_issued_tokens(&self, issuer: &Address) -> Result<Vec<TokenId>, LedgerError> {
        let state = self.state.lock().unwrap();
        Ok(state.issued.get(issuer).cloned().unwrap_or_default())
    }

    async fn account_sequence(&self, account: &Address) -> Result<u32, LedgerError> {
        let state = self.state.lock().unwrap();
        Ok(*state.sequences.get(account).unwrap_or(&FIRST_SEQUENCE))
    }

    async fn sign_message(&self, account: &Address, message: &[u8]) -> Result<Signature, LedgerError> {
        self.sign_requests.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let keys = state
            .keys
            .get(account)
            .ok_or_else(|| LedgerError::NoSigningCapability(account.to_string()))?;
        Ok(sign_message(message, &keys.private))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admit_codec::{Taxon, TokenFlags};
    use admit_transactions::sign_transaction;

    fn mint_tx(account: &Address, sequence: u32) -> Transaction {
        Transaction::Mint(MintTx {
            account: account.clone(),
            sequence,
            taxon: Taxon::new(12_345_678),
            flags: TokenFlags::TRANSFERABLE,
            transfer_fee: 0,
            uri: None,
            metadata_digest: [0u8; 32],
            memo: None,
        })
    }

    #[tokio::test]
    async fn mint_assigns_owner_and_finalizes() {
        let ledger = NullLedger::new();
        let issuer = ledger.create_account([1u8; 32]);
        let keys = keypair_from_seed(&[1u8; 32]);
        let signed = sign_transaction(mint_tx(&issuer, 1), &keys).unwrap();

        let receipt = ledger.submit_transaction(&signed).await.unwrap();
        let result = ledger
            .wait_for_finality(&receipt.hash, Duration::from_secs(1))
            .await
            .unwrap();
        let FinalityResult::Validated { effects, .. } = result else {
            panic!("expected validated, got {result:?}");
        };
        let token = effects.minted.unwrap();
        assert_eq!(ledger.query_token_owner(&token).await.unwrap(), Some(issuer.clone()));
        assert_eq!(token.decode().taxon, Taxon::new(12_345_678));
        assert_eq!(ledger.account_sequence(&issuer).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn wrong_sequence_is_stale() {
        let ledger = NullLedger::new();
        let issuer = ledger.create_account([1u8; 32]);
        let keys = keypair_from_seed(&[1u8; 32]);
        let signed = sign_transaction(mint_tx(&issuer, 5), &keys).unwrap();
        let err = ledger.submit_transaction(&signed).await.unwrap_err();
        assert!(matches!(err, LedgerError::StaleSequence { expected: 1, .. }));
    }

    #[tokio::test]
    async fn unknown_account_cannot_sign() {
        let ledger = NullLedger::new();
        let stranger = derive_address(&keypair_from_seed(&[7u8; 32]).public);
        let err = ledger.sign_message(&stranger, b"hi").await.unwrap_err();
        assert!(matches!(err, LedgerError::NoSigningCapability(_)));
    }

    #[tokio::test]
    async fn withheld_finality_reports_pending() {
        let ledger = NullLedger::new();
        ledger.withhold_finality(true);
        let result = ledger
            .wait_for_finality(&TxHash::ZERO, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(result, FinalityResult::Pending);
    }
}
