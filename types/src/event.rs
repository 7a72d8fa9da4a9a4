//! Event descriptors: validated event metadata bound into admission tokens.
//!
//! Organisers usually hand over a loosely typed record (JSON with nullable
//! fields and `YYYY-MM-DD HH:MM` dates). [`RawEvent`] mirrors that record and
//! [`EventDescriptor`] is the validated form. Every way of building a
//! descriptor goes through the same checks, so a descriptor that exists is
//! always mintable.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AdmitError;
use crate::time::Timestamp;

/// Ledger URI fields hold at most 256 bytes.
pub const MAX_URI_LEN: usize = 256;

/// Numeric event id, unique per issuer.
///
/// Doubles as the token taxon, so it is limited to 32 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(u32);

impl EventId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u64> for EventId {
    type Error = AdmitError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        u32::try_from(id)
            .map(Self)
            .map_err(|_| AdmitError::InvalidEvent(format!("eventid {id} does not fit in 32 bits")))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The loosely typed event record as organisers submit it.
///
/// Field names follow the wire format (`eventid`, `startdate`, `isvirtual`, ...).
/// Dates are strings in `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DD` or RFC 3339 form,
/// interpreted as UTC.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub eventid: Option<u64>,
    pub name: Option<String>,
    pub info: Option<String>,
    pub description: Option<String>,
    pub startdate: Option<String>,
    pub enddate: Option<String>,
    pub expiry: Option<String>,
    pub isvirtual: Option<bool>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub uri: Option<String>,
    pub quantity: Option<u64>,
    pub private: Option<bool>,
}

/// Validated event metadata.
///
/// Fields are private: once built, a descriptor cannot be mutated, which keeps
/// the event id stable for every token minted from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub struct EventDescriptor {
    event_id: EventId,
    name: String,
    info: String,
    description: String,
    starts_at: Timestamp,
    ends_at: Option<Timestamp>,
    expires_at: Option<Timestamp>,
    is_virtual: bool,
    location: String,
    website: Option<String>,
    uri: Option<String>,
    quantity: u32,
    private: bool,
}

impl EventDescriptor {
    /// Start building a descriptor programmatically.
    pub fn builder(event_id: u64, name: impl Into<String>) -> EventBuilder {
        EventBuilder::new(event_id, name)
    }

    /// Parse and validate the loosely typed JSON event record.
    pub fn from_json(json: &str) -> Result<Self, AdmitError> {
        let raw: RawEvent =
            serde_json::from_str(json).map_err(|e| AdmitError::Serialization(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Canonical JSON form. Field order is fixed, so the bytes are stable
    /// across calls and suitable for hashing.
    pub fn to_canonical_json(&self) -> Result<String, AdmitError> {
        serde_json::to_string(self).map_err(|e| AdmitError::Serialization(e.to_string()))
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    pub fn ends_at(&self) -> Option<Timestamp> {
        self.ends_at
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    /// Content URI (artwork or metadata pointer).
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Upper bound on tokens ever issued for this event.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Private events restrict holder lookup to the issuer.
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Whether the admission right has lapsed at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expiry| now >= expiry)
    }
}

impl TryFrom<RawEvent> for EventDescriptor {
    type Error = AdmitError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let event_id = raw
            .eventid
            .ok_or_else(|| AdmitError::InvalidEvent("eventid is required".into()))?;
        let name = raw
            .name
            .ok_or_else(|| AdmitError::InvalidEvent("name is required".into()))?;
        let startdate = non_empty(raw.startdate)
            .ok_or_else(|| AdmitError::InvalidEvent("startdate is required".into()))?;
        let quantity = raw
            .quantity
            .ok_or_else(|| AdmitError::InvalidEvent("quantity is required".into()))?;

        let mut builder = EventBuilder::new(event_id, name)
            .starts_at(parse_datetime("startdate", &startdate)?)
            .quantity(quantity)
            .is_virtual(raw.isvirtual.unwrap_or(false))
            .private(raw.private.unwrap_or(false));

        if let Some(info) = raw.info {
            builder = builder.info(info);
        }
        if let Some(description) = raw.description {
            builder = builder.description(description);
        }
        if let Some(location) = raw.location {
            builder = builder.location(location);
        }
        if let Some(end) = non_empty(raw.enddate) {
            builder = builder.ends_at(parse_datetime("enddate", &end)?);
        }
        if let Some(expiry) = non_empty(raw.expiry) {
            builder = builder.expires_at(parse_datetime("expiry", &expiry)?);
        }
        if let Some(website) = non_empty(raw.website) {
            builder = builder.website(website);
        }
        if let Some(uri) = non_empty(raw.uri) {
            builder = builder.uri(uri);
        }

        builder.build()
    }
}

impl From<EventDescriptor> for RawEvent {
    fn from(event: EventDescriptor) -> Self {
        RawEvent {
            eventid: Some(u64::from(event.event_id.0)),
            name: Some(event.name),
            info: Some(event.info),
            description: Some(event.description),
            startdate: Some(format_datetime(event.starts_at)),
            enddate: event.ends_at.map(format_datetime),
            expiry: event.expires_at.map(format_datetime),
            isvirtual: Some(event.is_virtual),
            location: Some(event.location),
            website: event.website,
            uri: event.uri,
            quantity: Some(u64::from(event.quantity)),
            private: Some(event.private),
        }
    }
}

/// Builder for [`EventDescriptor`]. All checks run in [`EventBuilder::build`].
#[derive(Clone, Debug)]
pub struct EventBuilder {
    event_id: u64,
    name: String,
    info: String,
    description: String,
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
    expires_at: Option<Timestamp>,
    is_virtual: bool,
    location: String,
    website: Option<String>,
    uri: Option<String>,
    quantity: u64,
    private: bool,
}

impl EventBuilder {
    fn new(event_id: u64, name: impl Into<String>) -> Self {
        Self {
            event_id,
            name: name.into(),
            info: String::new(),
            description: String::new(),
            starts_at: None,
            ends_at: None,
            expires_at: None,
            is_virtual: false,
            location: String::new(),
            website: None,
            uri: None,
            quantity: 0,
            private: false,
        }
    }

    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn starts_at(mut self, at: Timestamp) -> Self {
        self.starts_at = Some(at);
        self
    }

    /// Parse the start date from a string in any accepted event date form.
    pub fn start_date(self, raw: &str) -> Result<Self, AdmitError> {
        Ok(self.starts_at(parse_datetime("startdate", raw)?))
    }

    pub fn ends_at(mut self, at: Timestamp) -> Self {
        self.ends_at = Some(at);
        self
    }

    pub fn expires_at(mut self, at: Timestamp) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn is_virtual(mut self, is_virtual: bool) -> Self {
        self.is_virtual = is_virtual;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn build(self) -> Result<EventDescriptor, AdmitError> {
        let event_id = EventId::try_from(self.event_id)?;

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AdmitError::InvalidEvent("name must not be empty".into()));
        }

        let starts_at = self
            .starts_at
            .ok_or_else(|| AdmitError::InvalidEvent("startdate is required".into()))?;

        if self.quantity == 0 {
            return Err(AdmitError::InvalidEvent("quantity must be at least 1".into()));
        }
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            AdmitError::InvalidEvent(format!("quantity {} is too large", self.quantity))
        })?;

        if let Some(end) = self.ends_at {
            if end < starts_at {
                return Err(AdmitError::InvalidEvent(
                    "enddate must not be before startdate".into(),
                ));
            }
        }
        if let Some(expiry) = self.expires_at {
            if expiry < starts_at {
                return Err(AdmitError::InvalidEvent(
                    "expiry must not be before startdate".into(),
                ));
            }
        }

        if let Some(website) = &self.website {
            check_uri("website", website)?;
        }
        if let Some(uri) = &self.uri {
            check_uri("uri", uri)?;
        }

        Ok(EventDescriptor {
            event_id,
            name,
            info: self.info,
            description: self.description,
            starts_at,
            ends_at: self.ends_at,
            expires_at: self.expires_at,
            is_virtual: self.is_virtual,
            location: self.location,
            website: self.website,
            uri: self.uri,
            quantity,
            private: self.private,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn check_uri(field: &str, value: &str) -> Result<(), AdmitError> {
    if value.len() > MAX_URI_LEN {
        return Err(AdmitError::InvalidEvent(format!(
            "{field} exceeds {MAX_URI_LEN} bytes"
        )));
    }
    if !value.contains("://") {
        return Err(AdmitError::InvalidEvent(format!(
            "{field} is not an absolute URI: {value}"
        )));
    }
    Ok(())
}

/// Parse an event date. Naive forms are read as UTC.
pub fn parse_datetime(field: &str, raw: &str) -> Result<Timestamp, AdmitError> {
    let raw = raw.trim();

    let secs = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        Some(dt.timestamp())
    } else {
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(|ndt| ndt.and_utc().timestamp())
    };

    match secs {
        Some(secs) => u64::try_from(secs)
            .map(Timestamp::new)
            .map_err(|_| AdmitError::InvalidEvent(format!("{field} is before 1970: {raw}"))),
        None => Err(AdmitError::InvalidEvent(format!(
            "{field} is not a recognised date: {raw:?}"
        ))),
    }
}

fn format_datetime(at: Timestamp) -> String {
    at.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOCCER: &str = r#"{
        "eventid": 12345678,
        "name": "Soccer Game",
        "info": "Titans vs Olympics",
        "description": "Match of the week between rival high schools in Miami",
        "startdate": "2022-11-20 17:30",
        "enddate": null,
        "expiry": null,
        "isvirtual": false,
        "location": "Olympic Heights, Miami FL",
        "website": "http://kuyawa.net",
        "uri": "https://ipfs.io/ipfs/bafybeibzetds44cuulfcgkoj2c4hopypewzpk7bpb2kzbavrpoarko2lby/kuyawa.jpg",
        "quantity": 1000,
        "private": false
    }"#;

    #[test]
    fn parses_loose_record() {
        let event = EventDescriptor::from_json(SOCCER).unwrap();
        assert_eq!(event.event_id(), EventId::new(12345678));
        assert_eq!(event.name(), "Soccer Game");
        assert_eq!(event.quantity(), 1000);
        assert_eq!(event.ends_at(), None);
        assert!(!event.is_private());
        // 2022-11-20T17:30:00Z
        assert_eq!(event.starts_at(), Timestamp::new(1_668_965_400));
    }

    #[test]
    fn canonical_json_reparses_to_same_descriptor() {
        let event = EventDescriptor::from_json(SOCCER).unwrap();
        let json = event.to_canonical_json().unwrap();
        let again = EventDescriptor::from_json(&json).unwrap();
        assert_eq!(event, again);
        assert_eq!(json, again.to_canonical_json().unwrap());
    }

    #[test]
    fn missing_eventid_rejected() {
        let err = EventDescriptor::from_json(r#"{"name":"x","startdate":"2022-01-01","quantity":1}"#)
            .unwrap_err();
        assert!(matches!(err, AdmitError::InvalidEvent(msg) if msg.contains("eventid")));
    }

    #[test]
    fn empty_name_rejected() {
        let err = EventDescriptor::builder(1, "   ")
            .starts_at(Timestamp::new(10))
            .quantity(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, AdmitError::InvalidEvent(_)));
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = EventDescriptor::builder(1, "Gig")
            .starts_at(Timestamp::new(10))
            .build()
            .unwrap_err();
        assert!(matches!(err, AdmitError::InvalidEvent(msg) if msg.contains("quantity")));
    }

    #[test]
    fn unparseable_startdate_rejected() {
        let err = EventDescriptor::from_json(
            r#"{"eventid":1,"name":"x","startdate":"next tuesday","quantity":1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AdmitError::InvalidEvent(msg) if msg.contains("startdate")));
    }

    #[test]
    fn expiry_before_start_rejected() {
        let err = EventDescriptor::builder(1, "Gig")
            .starts_at(Timestamp::new(1_000))
            .expires_at(Timestamp::new(999))
            .quantity(5)
            .build()
            .unwrap_err();
        assert!(matches!(err, AdmitError::InvalidEvent(msg) if msg.contains("expiry")));
    }

    #[test]
    fn expiry_equal_to_start_accepted() {
        let event = EventDescriptor::builder(1, "Gig")
            .starts_at(Timestamp::new(1_000))
            .expires_at(Timestamp::new(1_000))
            .quantity(5)
            .build()
            .unwrap();
        assert!(event.is_expired(Timestamp::new(1_000)));
        assert!(!event.is_expired(Timestamp::new(999)));
    }

    #[test]
    fn eventid_beyond_u32_rejected() {
        let err = EventDescriptor::builder(u64::from(u32::MAX) + 1, "Gig")
            .starts_at(Timestamp::new(1))
            .quantity(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, AdmitError::InvalidEvent(_)));
    }

    #[test]
    fn oversized_uri_rejected() {
        let uri = format!("https://{}", "a".repeat(MAX_URI_LEN));
        let err = EventDescriptor::builder(1, "Gig")
            .starts_at(Timestamp::new(1))
            .quantity(1)
            .uri(uri)
            .build()
            .unwrap_err();
        assert!(matches!(err, AdmitError::InvalidEvent(msg) if msg.contains("uri")));
    }

    #[test]
    fn accepts_rfc3339_and_date_only() {
        assert_eq!(
            parse_datetime("startdate", "1970-01-02T00:00:00Z").unwrap(),
            Timestamp::new(86_400)
        );
        assert_eq!(
            parse_datetime("startdate", "1970-01-02").unwrap(),
            Timestamp::new(86_400)
        );
    }

    #[test]
    fn start_date_helper_on_builder() {
        let event = EventDescriptor::builder(7, "Gig")
            .start_date("1970-01-01 00:01")
            .unwrap()
            .quantity(1)
            .build()
            .unwrap();
        assert_eq!(event.starts_at(), Timestamp::new(60));
    }
}
