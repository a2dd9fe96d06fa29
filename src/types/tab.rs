use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform-assigned tab identifier. Unique among open tabs only; platforms
/// reuse ids after a tab closes.
pub type TabId = i64;

/// A browser tab, either open or archived after being wrangled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Milliseconds since epoch. Present only on archived records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<i64>,
    /// Remaining host fields (`favIconUrl`, `windowId`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabRecord {
    pub fn new(id: TabId, url: Option<&str>, title: Option<&str>) -> Self {
        Self {
            id,
            url: url.map(str::to_string),
            title: title.map(str::to_string),
            closed_at: None,
            extra: Map::new(),
        }
    }
}

/// Anything the host may hand over when reporting tab activity.
#[derive(Debug, Clone, Copy)]
pub enum TabRef<'a> {
    Id(TabId),
    Tab(&'a TabRecord),
    /// Untyped payload straight from the host: a number or an object with `id`.
    Json(&'a Value),
}

impl TabRef<'_> {
    /// Resolves the tab id, or `None` when the payload carries no integer id.
    pub fn resolve(&self) -> Option<TabId> {
        match self {
            TabRef::Id(id) => Some(*id),
            TabRef::Tab(tab) => Some(tab.id),
            TabRef::Json(Value::Object(map)) => map.get("id").and_then(tab_id_from_json),
            TabRef::Json(value) => tab_id_from_json(value),
        }
    }
}

/// Reads a tab id from a JSON number. Integral floats such as `3.0` count,
/// since hosts that only have doubles send ids that way.
pub fn tab_id_from_json(value: &Value) -> Option<TabId> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as TabId)
    })
}

impl From<TabId> for TabRef<'_> {
    fn from(id: TabId) -> Self {
        TabRef::Id(id)
    }
}

impl<'a> From<&'a TabRecord> for TabRef<'a> {
    fn from(tab: &'a TabRecord) -> Self {
        TabRef::Tab(tab)
    }
}

impl<'a> From<&'a Value> for TabRef<'a> {
    fn from(value: &'a Value) -> Self {
        TabRef::Json(value)
    }
}
