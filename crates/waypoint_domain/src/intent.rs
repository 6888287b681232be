use crate::{PersistedRouteRecord, RouteBlobError};
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_user: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SharePayload {
    LocalPath(PathBuf),
    Text(String),
}

impl SharePayload {
    /// Normalizes a raw intent-handler answer. A local path wins over text;
    /// blank fields count as absent.
    pub fn from_parts(local_path: Option<&str>, text: Option<&str>) -> Option<Self> {
        if let Some(path) = local_path.map(str::trim).filter(|p| !p.is_empty()) {
            return Some(SharePayload::LocalPath(PathBuf::from(path)));
        }
        text.filter(|t| !t.trim().is_empty())
            .map(|t| SharePayload::Text(t.to_owned()))
    }
}

/// What the app should open into after a cold start.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StartupIntent {
    FromPush {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        follow_user: Option<String>,
    },
    FromLink {
        url: String,
    },
    FromShare {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        local_path: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    FromPersistedRoute {
        route_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
    },
    #[default]
    None,
}

impl StartupIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            StartupIntent::FromPush { .. } => "push",
            StartupIntent::FromLink { .. } => "link",
            StartupIntent::FromShare { .. } => "share",
            StartupIntent::FromPersistedRoute { .. } => "persisted_route",
            StartupIntent::None => "none",
        }
    }

    pub fn was_from_push(&self) -> bool {
        matches!(self, StartupIntent::FromPush { .. })
    }
}

/// Results of the four startup probes, gathered before any decision is made.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StartupSources {
    pub push: Option<PushPayload>,
    pub link: Option<String>,
    pub share: Option<SharePayload>,
    /// Raw persisted-route blob; empty when nothing was stored or the read failed.
    pub route_state: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolution {
    pub intent: StartupIntent,
    /// Set when the persisted route was consulted and could not be decoded.
    pub discarded_route_state: Option<RouteBlobError>,
}

impl StartupSources {
    /// Picks exactly one source, push > link > share > persisted route.
    pub fn resolve(self) -> Resolution {
        let intent = |intent| Resolution {
            intent,
            discarded_route_state: None,
        };

        if let Some(push) = self.push {
            return intent(StartupIntent::FromPush {
                conversation_id: push.conversation_id,
                follow_user: push.follow_user,
            });
        }

        if let Some(url) = self.link.filter(|url| !url.trim().is_empty()) {
            return intent(StartupIntent::FromLink { url });
        }

        if let Some(share) = self.share {
            return intent(match share {
                SharePayload::LocalPath(path) => StartupIntent::FromShare {
                    local_path: Some(path),
                    text: None,
                },
                SharePayload::Text(text) => StartupIntent::FromShare {
                    local_path: None,
                    text: Some(text),
                },
            });
        }

        match PersistedRouteRecord::from_blob(&self.route_state) {
            Ok(Some(record)) => intent(StartupIntent::FromPersistedRoute {
                route_name: record.route_name,
                conversation_id: record.conversation_id,
            }),
            Ok(None) => intent(StartupIntent::None),
            Err(err) => Resolution {
                intent: StartupIntent::None,
                discarded_route_state: Some(err),
            },
        }
    }
}
