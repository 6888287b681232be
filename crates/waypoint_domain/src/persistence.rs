use crate::{CONVERSATION_ROUTE_NAME, Effect, RoutePath, RoutePolicy, RouteTarget};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouteBlobError {
    Malformed(String),
}

impl std::fmt::Display for RouteBlobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteBlobError::Malformed(message) => {
                write!(f, "malformed persisted route: {message}")
            }
        }
    }
}

impl std::error::Error for RouteBlobError {}

/// Where the user was when the last restartable route was committed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersistedRouteRecord {
    pub route_name: String,
    pub conversation_id: Option<String>,
}

#[derive(serde::Serialize)]
struct RouteBlobOut<'a> {
    param: RouteParamOut<'a>,
    #[serde(rename = "routeName")]
    route_name: &'a str,
}

#[derive(serde::Serialize)]
struct RouteParamOut<'a> {
    #[serde(
        rename = "selectedConversationIDKey",
        skip_serializing_if = "Option::is_none"
    )]
    selected_conversation_id_key: Option<&'a str>,
}

impl PersistedRouteRecord {
    pub fn tab(route_name: impl Into<String>) -> Self {
        Self {
            route_name: route_name.into(),
            conversation_id: None,
        }
    }

    pub fn conversation(conversation_id: impl Into<String>) -> Self {
        Self {
            route_name: CONVERSATION_ROUTE_NAME.to_owned(),
            conversation_id: Some(conversation_id.into()),
        }
    }

    pub fn to_blob(&self) -> String {
        let out = RouteBlobOut {
            param: RouteParamOut {
                selected_conversation_id_key: self.conversation_id.as_deref(),
            },
            route_name: &self.route_name,
        };
        // Serializing a struct of strings cannot fail.
        serde_json::to_string(&out).unwrap_or_default()
    }

    /// `Ok(None)` means there is nothing to restore: an empty blob, or valid
    /// JSON without a usable `routeName`.
    pub fn from_blob(blob: &str) -> Result<Option<Self>, RouteBlobError> {
        if blob.trim().is_empty() {
            return Ok(None);
        }

        let value: serde_json::Value = serde_json::from_str(blob)
            .map_err(|err| RouteBlobError::Malformed(err.to_string()))?;

        let Some(route_name) = value
            .get("routeName")
            .and_then(serde_json::Value::as_str)
            .filter(|name| !name.is_empty())
        else {
            return Ok(None);
        };

        let conversation_id = value
            .get("param")
            .and_then(|param| param.get("selectedConversationIDKey"))
            .and_then(serde_json::Value::as_str)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);

        Ok(Some(Self {
            route_name: route_name.to_owned(),
            conversation_id,
        }))
    }
}

/// Route persistence writer state. Owns the last-write cache used to
/// suppress rewriting the same tab.
#[derive(Clone, Debug, Default)]
pub struct RoutePersistence {
    last_written: Option<String>,
}

impl RoutePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn last_written(&self) -> Option<&str> {
        self.last_written.as_deref()
    }

    pub fn route_changed(&mut self, path: &RoutePath, policy: &RoutePolicy) -> Option<Effect> {
        let record = match policy.classify(path) {
            RouteTarget::Conversation { conversation_id } => {
                PersistedRouteRecord::conversation(conversation_id)
            }
            RouteTarget::Tab { tab } => {
                if self.last_written.as_deref() == Some(tab.as_str()) {
                    return None;
                }
                PersistedRouteRecord::tab(tab)
            }
            RouteTarget::Skip => return None,
        };

        let blob = record.to_blob();
        self.last_written = Some(record.route_name);
        Some(Effect::WriteRouteState { blob })
    }

    pub fn logged_out(&mut self) -> Effect {
        self.last_written = None;
        Effect::ClearRouteState
    }
}
