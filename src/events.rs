/// Emitted after every mutation with the fresh [`crate::models::TaskListView`].
pub const EVENT_STATE_UPDATED: &str = "state_updated";
