//! Launch sources that read pending startup payloads from the process
//! environment. Used by the `waypoint` binary and by shells that hand the
//! OS launch payload over through env vars.

use crate::env::optional_trimmed_from_env;
use waypoint_domain::{LinkSource, PushPayload, PushSource, SharePayload, ShareSource};

pub const WAYPOINT_INITIAL_PUSH_ENV: &str = "WAYPOINT_INITIAL_PUSH";
pub const WAYPOINT_INITIAL_URL_ENV: &str = "WAYPOINT_INITIAL_URL";
pub const WAYPOINT_SHARE_PATH_ENV: &str = "WAYPOINT_SHARE_PATH";
pub const WAYPOINT_SHARE_TEXT_ENV: &str = "WAYPOINT_SHARE_TEXT";

#[derive(Clone, Copy, Debug)]
pub struct EnvPushSource {
    pub var: &'static str,
}

impl Default for EnvPushSource {
    fn default() -> Self {
        Self {
            var: WAYPOINT_INITIAL_PUSH_ENV,
        }
    }
}

impl PushSource for EnvPushSource {
    fn initial_push(&self) -> Result<Option<PushPayload>, String> {
        let Some(raw) = optional_trimmed_from_env(self.var) else {
            return Ok(None);
        };
        serde_json::from_str::<PushPayload>(&raw)
            .map(Some)
            .map_err(|e| format!("invalid {}: {e}", self.var))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EnvLinkSource {
    pub var: &'static str,
}

impl Default for EnvLinkSource {
    fn default() -> Self {
        Self {
            var: WAYPOINT_INITIAL_URL_ENV,
        }
    }
}

impl LinkSource for EnvLinkSource {
    fn initial_url(&self) -> Result<Option<String>, String> {
        Ok(optional_trimmed_from_env(self.var))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EnvShareSource {
    pub path_var: &'static str,
    pub text_var: &'static str,
}

impl Default for EnvShareSource {
    fn default() -> Self {
        Self {
            path_var: WAYPOINT_SHARE_PATH_ENV,
            text_var: WAYPOINT_SHARE_TEXT_ENV,
        }
    }
}

impl ShareSource for EnvShareSource {
    fn share_data(&self) -> Result<Option<SharePayload>, String> {
        let path = optional_trimmed_from_env(self.path_var);
        let text = std::env::var(self.text_var).ok();
        Ok(SharePayload::from_parts(path.as_deref(), text.as_deref()))
    }
}
