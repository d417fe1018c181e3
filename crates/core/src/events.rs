//! Event type definitions for the session pipeline.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Event timestamp in seconds since epoch.
pub type Timestamp = u32;
/// Visitor identifier from the raw log.
pub type VisitorId = u32;
/// Dense session identifier, starting at 1.
pub type SessionId = u32;
/// Transaction identifier from the raw log.
pub type TransactionId = u32;

/// Item identifier.
///
/// Identifiers whose text is the canonical form of a `u64` are stored as
/// integers and serialize as JSON numbers. Anything else, including `"007"`
/// or `"+7"`, is kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemId {
    Num(u64),
    Text(String),
}

impl ItemId {
    /// Parses a raw field. Blank input is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        match raw.parse::<u64>() {
            Ok(n) if n.to_string() == raw => Some(Self::Num(n)),
            _ => Some(Self::Text(raw.to_string())),
        }
    }

    pub fn as_num(&self) -> Option<u64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self::Num(n)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Num(n) => serializer.serialize_u64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct ItemIdVisitor;

impl<'de> Visitor<'de> for ItemIdVisitor {
    type Value = ItemId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a non-empty string item id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
        Ok(ItemId::Num(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
        u64::try_from(v)
            .map(ItemId::Num)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
        ItemId::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ItemIdVisitor)
    }
}

/// Kind of interaction recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "view")]
    View,
    #[serde(rename = "addtocart")]
    AddToCart,
    #[serde(rename = "transaction")]
    Transaction,
}

impl EventKind {
    /// Returns the wire name of the event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::AddToCart => "addtocart",
            Self::Transaction => "transaction",
        }
    }

    /// Returns the tracked label kind, if this event is one.
    pub fn label_kind(&self) -> Option<LabelKind> {
        match self {
            Self::View => None,
            Self::AddToCart => Some(LabelKind::AddToCart),
            Self::Transaction => Some(LabelKind::Transaction),
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "addtocart" => Ok(Self::AddToCart),
            "transaction" => Ok(Self::Transaction),
            other => Err(Error::InvalidEventKind(other.to_string())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction kinds that are predicted and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LabelKind {
    #[serde(rename = "addtocart")]
    AddToCart,
    #[serde(rename = "transaction")]
    Transaction,
}

impl LabelKind {
    /// All tracked kinds, in output order.
    pub const ALL: [LabelKind; 2] = [LabelKind::AddToCart, LabelKind::Transaction];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddToCart => "addtocart",
            Self::Transaction => "transaction",
        }
    }
}

impl FromStr for LabelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "addtocart" => Ok(Self::AddToCart),
            "transaction" => Ok(Self::Transaction),
            other => Err(Error::InvalidEventKind(other.to_string())),
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated event from the raw log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub timestamp: Timestamp,
    pub visitor_id: VisitorId,
    pub item_id: ItemId,
    pub kind: EventKind,
    pub transaction_id: Option<TransactionId>,
}

impl Event {
    pub fn new(timestamp: Timestamp, visitor_id: VisitorId, item_id: ItemId, kind: EventKind) -> Self {
        Self {
            timestamp,
            visitor_id,
            item_id,
            kind,
            transaction_id: None,
        }
    }

    /// Drops visitor and transaction ids.
    pub fn into_session_event(self) -> SessionEvent {
        SessionEvent {
            item_id: self.item_id,
            timestamp: self.timestamp,
            kind: self.kind,
        }
    }
}

/// An event as it appears inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "itemid")]
    pub item_id: ItemId,
    pub timestamp: Timestamp,
    #[serde(rename = "event")]
    pub kind: EventKind,
}

impl SessionEvent {
    pub fn new(item_id: impl Into<ItemId>, timestamp: Timestamp, kind: EventKind) -> Self {
        Self {
            item_id: item_id.into(),
            timestamp,
            kind,
        }
    }
}

/// Flat session row as persisted in the train and test CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub timestamp: Timestamp,
    pub kind: EventKind,
    pub item_id: ItemId,
    pub session_id: SessionId,
}

impl SessionRow {
    pub fn event(&self) -> SessionEvent {
        SessionEvent {
            item_id: self.item_id.clone(),
            timestamp: self.timestamp,
            kind: self.kind,
        }
    }
}
