use anyhow::{Context as _, anyhow};
use std::path::PathBuf;
use waypoint_domain::paths::{WAYPOINT_DB_PATH_ENV, WAYPOINT_ROOT_ENV, default_root, sqlite_path};
use waypoint_domain::{DEFAULT_ROUTE_STATE_KEY, Platform, RoutePolicy};

pub const WAYPOINT_PLATFORM_ENV: &str = "WAYPOINT_PLATFORM";
pub const WAYPOINT_ROUTE_STATE_KEY_ENV: &str = "WAYPOINT_ROUTE_STATE_KEY";
pub const WAYPOINT_RESTARTABLE_TABS_ENV: &str = "WAYPOINT_RESTARTABLE_TABS";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineOptions {
    pub platform: Platform,
    pub route_state_key: String,
    pub route_policy: RoutePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            route_state_key: DEFAULT_ROUTE_STATE_KEY.to_owned(),
            route_policy: RoutePolicy::default(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    pub options: EngineOptions,
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Unset or blank
    /// variables fall back to defaults, except path overrides, where a blank
    /// value is rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let trimmed = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let path_override = |name: &str| -> anyhow::Result<Option<PathBuf>> {
            match lookup(name) {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Err(anyhow!("{name} is set but empty")),
                Some(raw) => Ok(Some(PathBuf::from(raw.trim()))),
            }
        };

        let db_path = match path_override(WAYPOINT_DB_PATH_ENV)? {
            Some(path) => path,
            None => {
                let root = match path_override(WAYPOINT_ROOT_ENV)? {
                    Some(root) => root,
                    None => {
                        let home = trimmed("HOME")
                            .with_context(|| format!("HOME is not set; set {WAYPOINT_ROOT_ENV}"))?;
                        default_root(&PathBuf::from(home))
                    }
                };
                sqlite_path(&root)
            }
        };

        let mut options = EngineOptions::default();

        if let Some(raw) = trimmed(WAYPOINT_PLATFORM_ENV) {
            options.platform = Platform::parse(&raw)
                .ok_or_else(|| anyhow!("unsupported {WAYPOINT_PLATFORM_ENV}: {raw}"))?;
        }

        if let Some(key) = trimmed(WAYPOINT_ROUTE_STATE_KEY_ENV) {
            options.route_state_key = key;
        }

        if let Some(raw) = trimmed(WAYPOINT_RESTARTABLE_TABS_ENV) {
            options.route_policy.restartable_tabs = raw
                .split(',')
                .map(str::trim)
                .filter(|tab| !tab.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }

        Ok(Self { db_path, options })
    }
}
