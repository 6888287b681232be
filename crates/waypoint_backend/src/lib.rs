mod env;
mod launch_env;
mod memory_store;
mod sqlite_store;
#[cfg(test)]
mod test_support;

pub use launch_env::{
    EnvLinkSource, EnvPushSource, EnvShareSource, WAYPOINT_INITIAL_PUSH_ENV,
    WAYPOINT_INITIAL_URL_ENV, WAYPOINT_SHARE_PATH_ENV, WAYPOINT_SHARE_TEXT_ENV,
};
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
