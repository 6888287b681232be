use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use waypoint_domain::{Effect, KeyValueStore};

pub(crate) enum StorageOp {
    Apply(Effect),
    Flush(oneshot::Sender<()>),
}

/// Single writer for the persisted route. Operations run one at a time, in
/// the order they were sent; failures are logged and dropped.
#[derive(Clone)]
pub(crate) struct StorageWriter {
    tx: mpsc::UnboundedSender<StorageOp>,
}

impl StorageWriter {
    pub(crate) fn spawn(store: Arc<dyn KeyValueStore>, key: String) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<StorageOp>();

        tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                match op {
                    StorageOp::Apply(effect) => apply_effect(&store, &key, effect).await,
                    StorageOp::Flush(reply) => {
                        let _ = reply.send(());
                    }
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn send(&self, op: StorageOp) {
        if self.tx.send(op).is_err() {
            tracing::warn!("storage writer stopped; dropping route state operation");
        }
    }

    pub(crate) fn apply(&self, effect: Effect) {
        self.send(StorageOp::Apply(effect));
    }

    #[cfg(test)]
    pub(crate) async fn flush(&self) -> anyhow::Result<()> {
        use anyhow::Context as _;

        let (reply, done) = oneshot::channel();
        self.tx
            .send(StorageOp::Flush(reply))
            .map_err(|_| anyhow::anyhow!("storage writer stopped"))?;
        done.await.context("storage writer stopped")
    }
}

async fn apply_effect(store: &Arc<dyn KeyValueStore>, key: &str, effect: Effect) {
    let label = effect.label();
    let value = effect.value();
    let store = store.clone();
    let owned_key = key.to_owned();

    match tokio::task::spawn_blocking(move || store.set_value(&owned_key, value)).await {
        Ok(Ok(())) => tracing::debug!(op = label, key, "route state stored"),
        Ok(Err(err)) => tracing::warn!(op = label, key, error = %err, "route state write failed"),
        Err(err) => tracing::warn!(op = label, key, error = %err, "route state write panicked"),
    }
}
