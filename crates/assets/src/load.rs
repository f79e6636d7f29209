use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::model::ModelData;
use crate::source::AssetSource;
use crate::texture::TextureData;
use crate::AssetError;

/// Result of one asset load, delivered once.
///
/// Await it, or call [`PendingLoad::poll_ready`] from a frame loop to check
/// without blocking. After a result has been taken the load stays settled and
/// further polls return `None`.
#[derive(Debug)]
pub struct PendingLoad<T> {
    label: String,
    rx: oneshot::Receiver<Result<T, AssetError>>,
    settled: bool,
}

/// Completion side of a [`PendingLoad`].
#[derive(Debug)]
pub struct LoadSender<T> {
    tx: oneshot::Sender<Result<T, AssetError>>,
}

impl<T> LoadSender<T> {
    pub fn complete(self, result: Result<T, AssetError>) {
        // Receiver dropped: nobody wants the result anymore.
        let _ = self.tx.send(result);
    }
}

impl<T> PendingLoad<T> {
    pub fn channel(label: impl Into<String>) -> (LoadSender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            LoadSender { tx },
            Self {
                label: label.into(),
                rx,
                settled: false,
            },
        )
    }

    /// An already-completed load.
    pub fn ready(label: impl Into<String>, result: Result<T, AssetError>) -> Self {
        let (tx, rx) = Self::channel(label);
        tx.complete(result);
        rx
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Non-blocking check. Returns the result the first time it is available.
    pub fn poll_ready(&mut self) -> Option<Result<T, AssetError>> {
        if self.settled {
            return None;
        }
        let outcome = match self.rx.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(AssetError::Cancelled(self.label.clone())),
        };
        self.settled = true;
        Some(outcome)
    }
}

impl<T: Send + 'static> PendingLoad<T> {
    /// Run `work` on a detached worker thread.
    pub fn spawn<F>(label: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> Result<T, AssetError> + Send + 'static,
    {
        let (tx, pending) = Self::channel(label);
        let thread_name = format!("load:{}", pending.label);
        let spawned = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || tx.complete(work()));
        if let Err(err) = spawned {
            // The sender went down with the closure; the load reads as cancelled.
            tracing::error!(label = %pending.label, error = %err, "failed to spawn load worker");
        }
        pending
    }
}

impl<T> Future for PendingLoad<T> {
    type Output = Result<T, AssetError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(result) => {
                this.settled = true;
                Poll::Ready(result.unwrap_or_else(|oneshot::Canceled| {
                    Err(AssetError::Cancelled(this.label.clone()))
                }))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Starts texture and model loads against an [`AssetSource`].
#[derive(Clone)]
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("source", &self.source.describe())
            .finish()
    }
}

impl AssetLoader {
    pub fn new(source: impl AssetSource) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn source(&self) -> &dyn AssetSource {
        self.source.as_ref()
    }

    /// Read and decode an image off-thread.
    pub fn load_texture(&self, path: &str) -> PendingLoad<TextureData> {
        let source = Arc::clone(&self.source);
        let owned = path.to_string();
        tracing::debug!(path, "texture load started");
        PendingLoad::spawn(path, move || {
            let bytes = source.read(&owned)?;
            TextureData::decode(&owned, &bytes)
        })
    }

    /// Read and import a glTF model off-thread.
    pub fn load_model(&self, path: &str) -> PendingLoad<ModelData> {
        let source = Arc::clone(&self.source);
        let owned = path.to_string();
        tracing::debug!(path, "model load started");
        PendingLoad::spawn(path, move || {
            let bytes = source.read(&owned)?;
            ModelData::import(&owned, &bytes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::triangle_glb;
    use crate::source::MemorySource;
    use crate::texture::tests::png_bytes;
    use futures::executor::block_on;

    #[test]
    fn channel_poll_ready_delivers_once() {
        let (tx, mut pending) = PendingLoad::<u32>::channel("n");
        assert!(pending.poll_ready().is_none());
        assert!(!pending.is_settled());

        tx.complete(Ok(7));
        assert_eq!(pending.poll_ready().unwrap().unwrap(), 7);
        assert!(pending.is_settled());
        assert!(pending.poll_ready().is_none());
    }

    #[test]
    fn dropped_sender_reads_as_cancelled() {
        let (tx, mut pending) = PendingLoad::<u32>::channel("lost");
        drop(tx);
        let err = pending.poll_ready().unwrap().unwrap_err();
        assert!(matches!(err, AssetError::Cancelled(ref l) if l == "lost"));
    }

    #[test]
    fn spawned_work_can_be_awaited() {
        let pending = PendingLoad::spawn("sum", || Ok(2 + 2));
        assert_eq!(block_on(pending).unwrap(), 4);
    }

    #[test]
    fn loader_decodes_texture_and_model() {
        let source = MemorySource::new()
            .with("/assets/wood.png", png_bytes(2, 2, [1, 2, 3, 255]))
            .with("/assets/tri.glb", triangle_glb());
        let loader = AssetLoader::new(source);

        let tex = block_on(loader.load_texture("/assets/wood.png")).unwrap();
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.label, "/assets/wood.png");

        let model = block_on(loader.load_model("/assets/tri.glb")).unwrap();
        assert_eq!(model.meshes.len(), 1);
    }

    #[test]
    fn missing_asset_fails_the_load() {
        let loader = AssetLoader::new(MemorySource::new());
        let err = block_on(loader.load_texture("/assets/none.png")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }
}
