mod config;
mod engine;
mod startup;
mod storage;
#[cfg(test)]
mod test_support;

pub use config::{
    EngineConfig, EngineOptions, WAYPOINT_PLATFORM_ENV, WAYPOINT_RESTARTABLE_TABS_ENV,
    WAYPOINT_ROUTE_STATE_KEY_ENV,
};
pub use engine::{Engine, EngineHandle};
pub use startup::StartupServices;
