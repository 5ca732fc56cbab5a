//! Exit-node candidate list construction.

use serde::{Deserialize, Serialize};

use crate::config;

/// One selectable entry in the exit-node dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitNodeOption {
    /// Position in the list. Older stored lists call this field `data`.
    #[serde(alias = "data")]
    pub id: u32,
    pub label: String,
}

impl ExitNodeOption {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// The "no exit node" placeholder that always heads the list.
    pub fn sentinel() -> Self {
        Self::new(config::SENTINEL_ID, config::SENTINEL_LABEL)
    }

    pub fn is_sentinel(&self) -> bool {
        self.label == config::SENTINEL_LABEL
    }
}

/// A list holding only the sentinel entry.
pub fn sentinel_list() -> Vec<ExitNodeOption> {
    vec![ExitNodeOption::sentinel()]
}

/// Rebuild the candidate list from a raw remote result.
///
/// Starts from the sentinel, drops `null`/empty entries and any label already
/// present, and numbers the survivors by their position.
pub fn build_candidate_list<I, S>(raw: I) -> Vec<ExitNodeOption>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut options = sentinel_list();
    for entry in raw {
        let Some(entry) = entry else {
            continue;
        };
        let label = entry.as_ref();
        if label.is_empty() || options.iter().any(|o| o.label == label) {
            tracing::debug!("Skipping exit node candidate {label:?}");
            continue;
        }
        let Ok(id) = u32::try_from(options.len()) else {
            tracing::warn!("Exit node candidate list full, dropping {label:?}");
            break;
        };
        options.push(ExitNodeOption::new(id, label));
    }
    options
}

/// Map a selected label to the node IP to store. The sentinel means "none".
pub fn node_ip_for_label(label: &str) -> String {
    if label == config::SENTINEL_LABEL {
        String::new()
    } else {
        label.to_string()
    }
}

/// Id of the entry whose label matches the stored node IP, or the sentinel id.
pub fn selected_option_id(options: &[ExitNodeOption], node_ip: &str) -> u32 {
    options
        .iter()
        .find(|o| !node_ip.is_empty() && o.label == node_ip)
        .map(|o| o.id)
        .unwrap_or(config::SENTINEL_ID)
}
