//! Session kind and partition routing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a weighing session, carrying its partition identity.
///
/// The `prod_` / `rompes_` id prefix is the *wire encoding* of this tag,
/// written once at creation time; internally all routing dispatches on the
/// enum, never on string inspection of other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Incremental weighing: many device readings aggregated into a total.
    Product,
    /// Single-shot weighing for the secondary produce stream: one declared
    /// weight, one photo, no reading history.
    Rompes,
}

impl SessionKind {
    /// Id prefix for product-partition sessions.
    pub const PRODUCT_PREFIX: &'static str = "prod_";
    /// Id prefix for rompes-partition sessions.
    pub const ROMPES_PREFIX: &'static str = "rompes_";

    /// Returns the id prefix written at creation time.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Product => Self::PRODUCT_PREFIX,
            Self::Rompes => Self::ROMPES_PREFIX,
        }
    }

    /// Returns the canonical lowercase name (`product` / `rompes`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Rompes => "rompes",
        }
    }

    /// Parses a session type name as supplied by clients.
    ///
    /// Returns `None` for anything other than the two recognized values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "product" => Some(Self::Product),
            "rompes" => Some(Self::Rompes),
            _ => None,
        }
    }

    /// Resolves a session reference to its partition by prefix inspection.
    ///
    /// References with no recognized prefix are legacy product ids; treating
    /// them as product-partition is an explicit backward-compatibility rule,
    /// not a default by accident.
    pub fn from_ref(session_ref: &str) -> Self {
        if session_ref.starts_with(Self::ROMPES_PREFIX) {
            Self::Rompes
        } else {
            Self::Product
        }
    }

    /// Mints a new prefixed session id for this partition.
    pub fn new_id(&self) -> String {
        format!("{}{}", self.prefix(), Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
