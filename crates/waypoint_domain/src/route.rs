use std::collections::BTreeMap;

/// Route name written for a specific conversation.
pub const CONVERSATION_ROUTE_NAME: &str = "conversation";
/// Leaf parameter carrying the selected conversation id.
pub const CONVERSATION_ID_PARAM: &str = "conversationIDKey";

const DEFAULT_TAB_DEPTH: usize = 2;
const DEFAULT_CONVERSATION_TAB: &str = "tabs.chatTab";
const DEFAULT_CONVERSATION_LEAF: &str = "chatConversation";

pub fn default_restartable_tabs() -> Vec<String> {
    [
        "tabs.peopleTab",
        "tabs.chatTab",
        "tabs.teamsTab",
        "tabs.fsTab",
        "tabs.walletsTab",
    ]
    .into_iter()
    .map(ToOwned::to_owned)
    .collect()
}

/// One committed navigation segment.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawRouteSegment")]
pub struct RouteSegment {
    #[serde(rename = "routeName")]
    pub route_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl RouteSegment {
    pub fn new(route_name: impl Into<String>) -> Self {
        Self {
            route_name: route_name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawRouteSegment {
    Name(String),
    Full {
        #[serde(rename = "routeName")]
        route_name: String,
        #[serde(default)]
        params: BTreeMap<String, String>,
    },
}

impl From<RawRouteSegment> for RouteSegment {
    fn from(raw: RawRouteSegment) -> Self {
        match raw {
            RawRouteSegment::Name(route_name) => RouteSegment::new(route_name),
            RawRouteSegment::Full { route_name, params } => RouteSegment { route_name, params },
        }
    }
}

/// Full navigation path from the root navigator down to the focused leaf.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RoutePath(pub Vec<RouteSegment>);

impl RoutePath {
    pub fn new(segments: Vec<RouteSegment>) -> Self {
        Self(segments)
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(RouteSegment::new).collect())
    }

    pub fn segment(&self, depth: usize) -> Option<&RouteSegment> {
        self.0.get(depth)
    }

    pub fn leaf(&self) -> Option<&RouteSegment> {
        self.0.last()
    }
}

/// Which routes are safe to resume into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutePolicy {
    /// Index of the tab segment. The real top of a path is the root of the
    /// tab, not the tab itself.
    pub tab_depth: usize,
    pub conversation_tab: String,
    pub conversation_leaf: String,
    pub restartable_tabs: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            tab_depth: DEFAULT_TAB_DEPTH,
            conversation_tab: DEFAULT_CONVERSATION_TAB.to_owned(),
            conversation_leaf: DEFAULT_CONVERSATION_LEAF.to_owned(),
            restartable_tabs: default_restartable_tabs(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouteTarget {
    Conversation { conversation_id: String },
    Tab { tab: String },
    Skip,
}

impl RoutePolicy {
    pub fn is_restartable_tab(&self, tab: &str) -> bool {
        self.restartable_tabs.iter().any(|t| t == tab)
    }

    pub fn classify(&self, path: &RoutePath) -> RouteTarget {
        let Some(tab) = path.segment(self.tab_depth) else {
            return RouteTarget::Skip;
        };

        // A conversation leaf without an id is the chat tab itself.
        if tab.route_name == self.conversation_tab
            && let Some(leaf) = path.leaf()
            && leaf.route_name == self.conversation_leaf
            && let Some(id) = leaf.param(CONVERSATION_ID_PARAM).filter(|id| !id.is_empty())
        {
            return RouteTarget::Conversation {
                conversation_id: id.to_owned(),
            };
        }

        if self.is_restartable_tab(&tab.route_name) {
            return RouteTarget::Tab {
                tab: tab.route_name.clone(),
            };
        }

        RouteTarget::Skip
    }
}
