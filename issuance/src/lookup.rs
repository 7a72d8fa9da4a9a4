//! Holder enumeration for an event.

use std::collections::HashSet;
use std::sync::Arc;

use admit_codec::{matches_event, TokenId};
use admit_ledger::LedgerClient;
use admit_types::{Address, EventDescriptor, EventId};
use futures_util::stream::{self, Stream, TryStreamExt};
use tracing::{debug, Instrument};

use crate::finality::bounded;
use crate::{spans, IssuanceConfig, IssuanceError};

/// Proof that the caller acts for the issuer. Only [`crate::Issuer`] hands
/// these out.
#[derive(Clone, Debug)]
pub struct IssuerCapability {
    issuer: Address,
}

impl IssuerCapability {
    pub(crate) fn new(issuer: Address) -> Self {
        Self { issuer }
    }

    pub fn issuer(&self) -> &Address {
        &self.issuer
    }
}

enum Cursor {
    Start,
    Scanning {
        tokens: std::vec::IntoIter<TokenId>,
        seen: HashSet<Address>,
    },
    Done,
}

pub struct LookupService {
    issuer: Address,
    ledger: Arc<dyn LedgerClient>,
    config: Arc<IssuanceConfig>,
}

impl LookupService {
    pub fn new(issuer: Address, ledger: Arc<dyn LedgerClient>, config: Arc<IssuanceConfig>) -> Self {
        Self {
            issuer,
            ledger,
            config,
        }
    }

    /// Stream the distinct current holders of `event`'s tokens, in the order
    /// the tokens were minted.
    ///
    /// Nothing is read until the stream is polled, and each call starts from
    /// fresh ledger state. Private events need the issuer's capability.
    pub fn holders<'a>(
        &'a self,
        event: &EventDescriptor,
        caller: Option<&IssuerCapability>,
    ) -> Result<impl Stream<Item = Result<Address, IssuanceError>> + 'a, IssuanceError> {
        self.authorize(event, caller)?;
        let event_id = event.event_id();

        Ok(stream::unfold(Cursor::Start, move |cursor| async move {
            let mut cursor = cursor;
            loop {
                match cursor {
                    Cursor::Start => match self.event_tokens(event_id).await {
                        Ok(tokens) => {
                            debug!(event = %event_id, tokens = tokens.len(), "scanning event tokens");
                            cursor = Cursor::Scanning {
                                tokens: tokens.into_iter(),
                                seen: HashSet::new(),
                            };
                        }
                        Err(e) => return Some((Err(e), Cursor::Done)),
                    },
                    Cursor::Scanning {
                        mut tokens,
                        mut seen,
                    } => {
                        let token = tokens.next()?;
                        let owner = bounded(
                            self.config.query_timeout(),
                            self.ledger.query_token_owner(&token),
                        )
                        .await;
                        match owner {
                            Ok(Some(owner)) if seen.insert(owner.clone()) => {
                                return Some((Ok(owner), Cursor::Scanning { tokens, seen }));
                            }
                            // Burned, or a holder already reported.
                            Ok(_) => cursor = Cursor::Scanning { tokens, seen },
                            Err(e) => return Some((Err(e.into()), Cursor::Done)),
                        }
                    }
                    Cursor::Done => return None,
                }
            }
        }))
    }

    /// Collect [`holders`](Self::holders).
    pub async fn lookup_holders(
        &self,
        event: &EventDescriptor,
        caller: Option<&IssuerCapability>,
    ) -> Result<Vec<Address>, IssuanceError> {
        let holders = self.holders(event, caller)?;
        holders
            .try_collect()
            .instrument(spans::lookup_span(event.event_id()))
            .await
    }

    fn authorize(
        &self,
        event: &EventDescriptor,
        caller: Option<&IssuerCapability>,
    ) -> Result<(), IssuanceError> {
        if !event.is_private() {
            return Ok(());
        }
        match caller {
            Some(capability) if capability.issuer == self.issuer => Ok(()),
            _ => Err(IssuanceError::AccessDenied(event.event_id())),
        }
    }

    async fn event_tokens(&self, event: EventId) -> Result<Vec<TokenId>, IssuanceError> {
        let issued = bounded(
            self.config.query_timeout(),
            self.ledger.query_issued_tokens(&self.issuer),
        )
        .await?;
        Ok(issued
            .into_iter()
            .filter(|token| matches_event(token, event))
            .collect())
    }
}
