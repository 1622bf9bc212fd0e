//! Tracking data model.
//!
//! - [`status`] - [`TrackingStatus`] and the `Pending`-by-default lookup
//! - [`item`] - parsed document items the engine reads
//! - [`state`] - persisted per-item and per-file records
//! - [`validation`] - structural checks applied at every load boundary

pub mod item;
pub mod state;
pub mod status;
pub mod validation;

pub use item::{find_item, walk, Descendants, ItemKind, SourceSpan, TrackableItem};
pub use state::{
    create_empty_app_state, create_file_tracking_state, create_item_tracking_state, AppState,
    FileTrackingState, ItemTrackingState, APP_STATE_VERSION, MIN_APP_STATE_VERSION,
};
pub use status::{status_of, ParseStatusError, StatusMap, TrackingStatus};
pub use validation::{
    describe_file_state_problem, is_app_state, is_file_tracking_state, is_item_tracking_state,
};
