use crate::StartupServices;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use waypoint_backend::MemoryStore;
use waypoint_domain::{
    ConfigValue, DEFAULT_ROUTE_STATE_KEY, LinkSource, PushPayload, PushSource, SharePayload,
    ShareSource,
};

/// Launch source with a canned answer that counts how often it was probed.
/// A gated source blocks its probe until the gate is released.
pub(crate) struct FakeSource<T> {
    answer: Result<Option<T>, String>,
    calls: AtomicUsize,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
}

impl<T: Clone> FakeSource<T> {
    fn with_answer(answer: Result<Option<T>, String>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    pub(crate) fn some(value: T) -> Arc<Self> {
        Arc::new(Self::with_answer(Ok(Some(value))))
    }

    pub(crate) fn none() -> Arc<Self> {
        Arc::new(Self::with_answer(Ok(None)))
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self::with_answer(Err(message.to_owned())))
    }

    pub(crate) fn gated(value: Option<T>) -> (Arc<Self>, mpsc::Sender<()>) {
        let (release, gate) = mpsc::channel();
        let source = Self::with_answer(Ok(value));
        *source.gate.lock().unwrap() = Some(gate);
        (Arc::new(source), release)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<Option<T>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        self.answer.clone()
    }
}

impl PushSource for FakeSource<PushPayload> {
    fn initial_push(&self) -> Result<Option<PushPayload>, String> {
        self.answer()
    }
}

impl LinkSource for FakeSource<String> {
    fn initial_url(&self) -> Result<Option<String>, String> {
        self.answer()
    }
}

impl ShareSource for FakeSource<SharePayload> {
    fn share_data(&self) -> Result<Option<SharePayload>, String> {
        self.answer()
    }
}

pub(crate) struct Fixture {
    pub(crate) push: Arc<FakeSource<PushPayload>>,
    pub(crate) link: Arc<FakeSource<String>>,
    pub(crate) share: Arc<FakeSource<SharePayload>>,
    pub(crate) store: Arc<MemoryStore>,
}

impl Fixture {
    pub(crate) fn empty() -> Self {
        Self {
            push: FakeSource::none(),
            link: FakeSource::none(),
            share: FakeSource::none(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub(crate) fn with_route_state(blob: &str) -> Self {
        Self {
            store: Arc::new(MemoryStore::with_value(
                DEFAULT_ROUTE_STATE_KEY,
                ConfigValue::text(blob),
            )),
            ..Self::empty()
        }
    }

    pub(crate) fn services(&self) -> StartupServices {
        StartupServices::new(
            self.push.clone(),
            self.link.clone(),
            self.share.clone(),
            self.store.clone(),
        )
    }

    pub(crate) fn route_writes(&self) -> Vec<ConfigValue> {
        self.store
            .writes()
            .into_iter()
            .filter(|(key, _)| key == DEFAULT_ROUTE_STATE_KEY)
            .map(|(_, value)| value)
            .collect()
    }
}
