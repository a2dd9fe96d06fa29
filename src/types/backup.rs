use serde::{Deserialize, Serialize};

use super::tab::TabRecord;

/// Everything written to an export file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub saved_tabs: Vec<TabRecord>,
    pub total_tabs_removed: u64,
    pub total_tabs_unwrangled: u64,
    pub total_tabs_wrangled: u64,
}

/// A validated backup ready to be applied.
///
/// Fields absent from the file stay `None`; applying a `None` counter resets
/// it to its default and a `None` archive empties it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBundle {
    pub saved_tabs: Option<Vec<TabRecord>>,
    pub total_tabs_removed: Option<u64>,
    pub total_tabs_unwrangled: Option<u64>,
    pub total_tabs_wrangled: Option<u64>,
}

impl From<ExportBundle> for ImportBundle {
    fn from(bundle: ExportBundle) -> Self {
        Self {
            saved_tabs: Some(bundle.saved_tabs),
            total_tabs_removed: Some(bundle.total_tabs_removed),
            total_tabs_unwrangled: Some(bundle.total_tabs_unwrangled),
            total_tabs_wrangled: Some(bundle.total_tabs_wrangled),
        }
    }
}
