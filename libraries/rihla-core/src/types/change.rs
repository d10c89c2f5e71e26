use serde::{Deserialize, Serialize};

/// Kind of row change delivered on a change feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One change-feed notification for a named resource.
///
/// The record payload is opaque to the synchronization core; any event on a
/// resource means "data may be stale, refetch".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub resource: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(default)]
    pub record: Option<serde_json::Value>,
}

impl ChangeEvent {
    pub fn new(resource: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            resource: resource.into(),
            kind,
            record: None,
        }
    }
}
