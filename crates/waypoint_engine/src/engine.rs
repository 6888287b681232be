use crate::EngineOptions;
use crate::startup::{self, StartupServices};
use crate::storage::{StorageOp, StorageWriter};
use anyhow::Context as _;
use tokio::sync::{mpsc, oneshot};
use waypoint_domain::{RoutePath, RoutePersistence, RoutePolicy, StartupIntent};

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Waits for the one startup resolution of this process.
    pub async fn startup_intent(&self) -> anyhow::Result<StartupIntent> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::GetStartupIntent { reply: tx })
            .await
            .context("engine unavailable")?;
        rx.await.context("engine stopped")
    }

    pub async fn try_startup_intent(&self) -> anyhow::Result<Option<StartupIntent>> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::TryStartupIntent { reply: tx })
            .await
            .context("engine unavailable")?;
        rx.await.context("engine stopped")
    }

    pub async fn route_changed(&self, path: RoutePath) -> anyhow::Result<()> {
        self.tx
            .send(EngineCommand::RouteChanged { path })
            .await
            .context("engine unavailable")
    }

    pub async fn logged_out(&self) -> anyhow::Result<()> {
        self.tx
            .send(EngineCommand::LoggedOut)
            .await
            .context("engine unavailable")
    }

    /// Resolves once every route-state write issued so far has finished.
    pub async fn flush(&self) -> anyhow::Result<()> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::Flush { reply: tx })
            .await
            .context("engine unavailable")?;
        rx.await.context("engine stopped")
    }
}

enum EngineCommand {
    GetStartupIntent {
        reply: oneshot::Sender<StartupIntent>,
    },
    TryStartupIntent {
        reply: oneshot::Sender<Option<StartupIntent>>,
    },
    RouteChanged {
        path: RoutePath,
    },
    LoggedOut,
    Flush {
        reply: oneshot::Sender<()>,
    },
    StartupResolved {
        intent: StartupIntent,
    },
}

enum StartupState {
    /// Storage operations issued before the startup clear are held here so
    /// the clear cannot wipe them.
    Resolving {
        waiters: Vec<oneshot::Sender<StartupIntent>>,
        deferred: Vec<StorageOp>,
    },
    Resolved(StartupIntent),
}

pub struct Engine {
    startup: StartupState,
    routes: RoutePersistence,
    policy: RoutePolicy,
    storage: StorageWriter,
}

impl Engine {
    /// Starts the engine and immediately begins resolving the startup intent.
    pub fn start(services: StartupServices, options: EngineOptions) -> EngineHandle {
        let (tx, mut rx) = mpsc::channel::<EngineCommand>(256);
        let services = services.for_platform(options.platform);
        let storage = StorageWriter::spawn(services.store.clone(), options.route_state_key.clone());

        let mut engine = Self {
            startup: StartupState::Resolving {
                waiters: Vec::new(),
                deferred: Vec::new(),
            },
            routes: RoutePersistence::new(),
            policy: options.route_policy,
            storage: storage.clone(),
        };

        let resolved_tx = tx.clone();
        let route_state_key = options.route_state_key;
        tokio::spawn(async move {
            let intent =
                startup::resolve_startup_intent(&services, &route_state_key, &storage).await;
            let _ = resolved_tx
                .send(EngineCommand::StartupResolved { intent })
                .await;
        });

        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                engine.handle(cmd);
            }
        });

        EngineHandle { tx }
    }

    fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::GetStartupIntent { reply } => match &mut self.startup {
                StartupState::Resolved(intent) => {
                    let _ = reply.send(intent.clone());
                }
                StartupState::Resolving { waiters, .. } => waiters.push(reply),
            },
            EngineCommand::TryStartupIntent { reply } => {
                let intent = match &self.startup {
                    StartupState::Resolved(intent) => Some(intent.clone()),
                    StartupState::Resolving { .. } => None,
                };
                let _ = reply.send(intent);
            }
            EngineCommand::RouteChanged { path } => {
                if let Some(effect) = self.routes.route_changed(&path, &self.policy) {
                    self.submit(StorageOp::Apply(effect));
                }
            }
            EngineCommand::LoggedOut => {
                let effect = self.routes.logged_out();
                self.submit(StorageOp::Apply(effect));
            }
            EngineCommand::Flush { reply } => self.submit(StorageOp::Flush(reply)),
            EngineCommand::StartupResolved { intent } => self.startup_resolved(intent),
        }
    }

    fn submit(&mut self, op: StorageOp) {
        match &mut self.startup {
            StartupState::Resolving { deferred, .. } => deferred.push(op),
            StartupState::Resolved(_) => self.storage.send(op),
        }
    }

    fn startup_resolved(&mut self, intent: StartupIntent) {
        let previous = std::mem::replace(&mut self.startup, StartupState::Resolved(intent.clone()));
        let StartupState::Resolving { waiters, deferred } = previous else {
            return;
        };

        for waiter in waiters {
            let _ = waiter.send(intent.clone());
        }
        for op in deferred {
            self.storage.send(op);
        }
    }
}
