mod adapters;
pub use adapters::{
    ConfigValue, KeyValueStore, LinkSource, NoShareSupport, Platform, PushSource, ShareSource,
};

mod effects;
pub use effects::Effect;

mod intent;
pub use intent::{PushPayload, Resolution, SharePayload, StartupIntent, StartupSources};

mod route;
pub use route::{
    CONVERSATION_ID_PARAM, CONVERSATION_ROUTE_NAME, RoutePath, RoutePolicy, RouteSegment,
    RouteTarget, default_restartable_tabs,
};

mod persistence;
pub use persistence::{PersistedRouteRecord, RouteBlobError, RoutePersistence};

pub mod paths;

pub const DEFAULT_ROUTE_STATE_KEY: &str = "ui.routeState2";
