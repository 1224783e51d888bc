//! Shared value types used inside payloads.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use questlog_domain::QuestId;

// =============================================================================
// Quest id selector
// =============================================================================

/// A payload field that carries either one quest id or a list of them.
///
/// Handlers never branch on the shape; they call `into_ids()` and work on the
/// list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestIdSelector {
    One(QuestId),
    Many(Vec<QuestId>),
}

impl QuestIdSelector {
    pub fn into_ids(self) -> Vec<QuestId> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }

    pub fn ids(&self) -> &[QuestId] {
        match self {
            Self::One(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }
}

impl From<QuestId> for QuestIdSelector {
    fn from(id: QuestId) -> Self {
        Self::One(id)
    }
}

impl From<Vec<QuestId>> for QuestIdSelector {
    fn from(ids: Vec<QuestId>) -> Self {
        Self::Many(ids)
    }
}

// =============================================================================
// Render options
// =============================================================================

/// Options forwarded untouched to view renders.
///
/// Anything that is not a JSON object decodes as empty options rather than
/// failing the whole envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RenderOptions(Map<String, Value>);

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set `key` only if the caller did not already choose a value.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.entry(key.into()).or_insert_with(|| value.into());
        self
    }

    /// Options used for log renders: `force` defaults to true.
    pub fn forced(self) -> Self {
        self.with_default("force", true)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RenderOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Ok(Self::default()),
        }
    }
}
