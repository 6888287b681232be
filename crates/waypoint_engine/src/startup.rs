use crate::storage::StorageWriter;
use std::sync::Arc;
use waypoint_domain::{
    Effect, KeyValueStore, LinkSource, NoShareSupport, Platform, PushSource, ShareSource,
    StartupIntent, StartupSources,
};

/// External collaborators consulted at cold start.
#[derive(Clone)]
pub struct StartupServices {
    pub push: Arc<dyn PushSource>,
    pub link: Arc<dyn LinkSource>,
    pub share: Arc<dyn ShareSource>,
    pub store: Arc<dyn KeyValueStore>,
}

impl StartupServices {
    pub fn new(
        push: Arc<dyn PushSource>,
        link: Arc<dyn LinkSource>,
        share: Arc<dyn ShareSource>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            push,
            link,
            share,
            store,
        }
    }

    /// Platforms without a share extension never report a share.
    pub fn for_platform(mut self, platform: Platform) -> Self {
        if !platform.supports_share_extension() {
            self.share = Arc::new(NoShareSupport);
        }
        self
    }
}

async fn probe<T, F>(name: &'static str, query: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<Option<T>, String> + Send + 'static,
{
    match tokio::task::spawn_blocking(query).await {
        Ok(Ok(found)) => found,
        Ok(Err(err)) => {
            tracing::debug!(probe = name, error = %err, "startup probe failed");
            None
        }
        Err(err) => {
            tracing::debug!(probe = name, error = %err, "startup probe panicked");
            None
        }
    }
}

pub(crate) async fn gather_sources(
    services: &StartupServices,
    route_state_key: &str,
) -> StartupSources {
    let push = services.push.clone();
    let link = services.link.clone();
    let share = services.share.clone();
    let store = services.store.clone();
    let key = route_state_key.to_owned();

    let (push, link, share, route_state) = tokio::join!(
        probe("push", move || push.initial_push()),
        probe("link", move || link.initial_url()),
        probe("share", move || share.share_data()),
        probe("route_state", move || {
            store.get_value(&key).map(|value| Some(value.into_text()))
        }),
    );

    StartupSources {
        push,
        link,
        share,
        route_state: route_state.unwrap_or_default(),
    }
}

/// Runs the four probes, issues the defensive clear of the persisted route
/// and picks the startup intent. Never fails; the worst case is `None`.
pub(crate) async fn resolve_startup_intent(
    services: &StartupServices,
    route_state_key: &str,
    storage: &StorageWriter,
) -> StartupIntent {
    let sources = gather_sources(services, route_state_key).await;

    // Clear before anything downstream can act on the route, so a bad route
    // cannot be replayed by the next cold start.
    storage.apply(Effect::ClearRouteState);

    let resolution = sources.resolve();
    if let Some(err) = &resolution.discarded_route_state {
        tracing::debug!(error = %err, "discarding persisted route");
    }
    tracing::info!(intent = resolution.intent.kind(), "startup intent resolved");
    resolution.intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeSource, Fixture};
    use waypoint_domain::{ConfigValue, DEFAULT_ROUTE_STATE_KEY, PushPayload, SharePayload};

    async fn resolve(fixture: &Fixture, services: StartupServices) -> StartupIntent {
        let storage =
            StorageWriter::spawn(fixture.store.clone(), DEFAULT_ROUTE_STATE_KEY.to_owned());
        let intent = resolve_startup_intent(&services, DEFAULT_ROUTE_STATE_KEY, &storage).await;
        storage.flush().await.unwrap();
        intent
    }

    #[tokio::test]
    async fn all_sources_empty_resolves_to_none_and_clears() {
        let fixture = Fixture::empty();
        let intent = resolve(&fixture, fixture.services()).await;

        assert_eq!(intent, StartupIntent::None);
        assert_eq!(fixture.route_writes(), vec![ConfigValue::empty()]);
        assert_eq!(fixture.push.calls(), 1);
        assert_eq!(fixture.link.calls(), 1);
        assert_eq!(fixture.share.calls(), 1);
    }

    #[tokio::test]
    async fn persisted_tab_is_restored_and_cleared() {
        let fixture = Fixture::with_route_state(r#"{"routeName":"tabs.chatTab","param":{}}"#);
        let intent = resolve(&fixture, fixture.services()).await;

        assert_eq!(
            intent,
            StartupIntent::FromPersistedRoute {
                route_name: "tabs.chatTab".to_owned(),
                conversation_id: None,
            }
        );
        assert_eq!(
            fixture.store.value(DEFAULT_ROUTE_STATE_KEY),
            Some(ConfigValue::empty())
        );
    }

    #[tokio::test]
    async fn malformed_route_state_resolves_to_none_with_one_clear() {
        let fixture = Fixture::with_route_state("{\"routeName\": tabs");
        let intent = resolve(&fixture, fixture.services()).await;

        assert_eq!(intent, StartupIntent::None);
        assert_eq!(fixture.route_writes(), vec![ConfigValue::empty()]);
    }

    #[tokio::test]
    async fn persisted_conversation_carries_its_id() {
        let fixture = Fixture::with_route_state(
            r#"{"param":{"selectedConversationIDKey":"c7"},"routeName":"conversation"}"#,
        );
        let intent = resolve(&fixture, fixture.services()).await;

        assert_eq!(
            intent,
            StartupIntent::FromPersistedRoute {
                route_name: "conversation".to_owned(),
                conversation_id: Some("c7".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn push_beats_link_and_persisted_route() {
        let fixture = Fixture {
            push: FakeSource::some(PushPayload {
                conversation_id: Some("c1".to_owned()),
                follow_user: None,
            }),
            link: FakeSource::some("keybase://chat/bob".to_owned()),
            ..Fixture::with_route_state(r#"{"routeName":"tabs.fsTab","param":{}}"#)
        };
        let intent = resolve(&fixture, fixture.services()).await;

        assert_eq!(
            intent,
            StartupIntent::FromPush {
                conversation_id: Some("c1".to_owned()),
                follow_user: None,
            }
        );
        assert_eq!(
            fixture.store.value(DEFAULT_ROUTE_STATE_KEY),
            Some(ConfigValue::empty())
        );
    }

    #[tokio::test]
    async fn failing_probes_contribute_nothing() {
        let fixture = Fixture {
            push: FakeSource::failing("push service unavailable"),
            link: FakeSource::some("keybase://team/acme".to_owned()),
            ..Fixture::empty()
        };
        fixture.store.set_fail_reads(true);
        let intent = resolve(&fixture, fixture.services()).await;

        assert_eq!(
            intent,
            StartupIntent::FromLink {
                url: "keybase://team/acme".to_owned()
            }
        );
        assert_eq!(fixture.route_writes(), vec![ConfigValue::empty()]);
    }

    #[tokio::test]
    async fn unreadable_store_resolves_to_none() {
        let fixture = Fixture::with_route_state(r#"{"routeName":"tabs.chatTab","param":{}}"#);
        fixture.store.set_fail_reads(true);
        let intent = resolve(&fixture, fixture.services()).await;

        assert_eq!(intent, StartupIntent::None);
    }

    #[tokio::test]
    async fn share_is_ignored_on_platforms_without_share_extension() {
        let fixture = Fixture {
            share: FakeSource::some(SharePayload::Text("hello".to_owned())),
            ..Fixture::empty()
        };

        let intent = resolve(&fixture, fixture.services().for_platform(Platform::Ios)).await;
        assert_eq!(intent, StartupIntent::None);
        assert_eq!(fixture.share.calls(), 0);

        let intent = resolve(&fixture, fixture.services().for_platform(Platform::Android)).await;
        assert_eq!(
            intent,
            StartupIntent::FromShare {
                local_path: None,
                text: Some("hello".to_owned()),
            }
        );
    }
}
