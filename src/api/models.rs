use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Code reported in [`ApiResult::Failure`] when no HTTP response was received.
pub const TRANSPORT_ERROR_CODE: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    Native,
    Master,
    Slave,
}

/// Administrative record of a zone.
///
/// Only the fields the client reasons about are modelled; everything else the
/// server returns (serial, soa_edit, rrsets, ...) is kept in `extra` and sent
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub kind: ZoneKind,
    #[serde(default)]
    pub masters: Vec<String>,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Zone {
    pub fn new(name: impl Into<String>, kind: ZoneKind) -> Self {
        Self {
            name: name.into(),
            kind,
            masters: Vec::new(),
            nameservers: Vec::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub content: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(default)]
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<u64>,
}

/// One entry of a PATCH request against a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRSetChange {
    pub name: String,
    pub r#type: String,
    pub changetype: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl RRSetChange {
    /// Replaces every record matching `name` and `rtype` with `records`.
    pub fn replace(
        name: impl Into<String>,
        rtype: impl Into<String>,
        ttl: u32,
        records: Vec<Record>,
    ) -> Self {
        Self {
            name: name.into(),
            r#type: rtype.into(),
            changetype: ChangeType::Replace,
            ttl: Some(ttl),
            records,
            comments: Vec::new(),
        }
    }

    /// Removes every record matching `name` and `rtype`.
    pub fn delete(name: impl Into<String>, rtype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            r#type: rtype.into(),
            changetype: ChangeType::Delete,
            ttl: None,
            records: Vec::new(),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRSetPatch {
    pub rrsets: Vec<RRSetChange>,
}

impl From<RRSetChange> for RRSetPatch {
    fn from(change: RRSetChange) -> Self {
        Self {
            rrsets: vec![change],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Outcome of every client operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    Success(Value),
    Failure { error_code: i64, message: String },
}

impl ApiResult {
    pub fn failure(error_code: i64, message: impl Into<String>) -> Self {
        Self::Failure {
            error_code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(self) -> Option<Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error_code, .. } => Some(*error_code),
        }
    }
}
