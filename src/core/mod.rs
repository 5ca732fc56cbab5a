//! Core state model: typed preferences, exit-node candidates, device status
//! and the derived view the presentation layer binds to.
//!
//! - [`Preferences`] : typed `{ value }` envelopes over an injected [`KeyValueStore`](crate::db::KeyValueStore)
//! - [`ExitNodeOption`] : candidate list entries, always headed by the sentinel
//! - [`DeviceStatusTable`] : row-major table rebuilt from column-major poll results
//! - [`DerivedView`] : enablement flags, recomputed from a snapshot on every read

pub mod device_status;
pub mod exit_nodes;
pub mod preferences;
pub mod view;

pub use device_status::{DeviceStatusTable, StatusColumns};
pub use exit_nodes::ExitNodeOption;
pub use preferences::{PrefKey, PreferenceSnapshot, Preferences};
pub use view::{derive_view, DerivedView};
