//! Extraction runtime command router.
//!
//! Runs extraction calls on a worker pool so UI threads never block on the
//! network. Each submitted URL is handled by its own task and answers exactly
//! once through a oneshot channel; the caller decides which context consumes
//! the result.

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::core::error_handling::{ExtractionError, ExtractionResult};
use crate::core::extractor::ResolutionExtractor;
use crate::core::models::{ResolutionList, VariantInfo};

/// Commands understood by the runtime router.
#[derive(Debug)]
pub enum RuntimeCommand {
    Resolutions {
        url: String,
        respond_to: oneshot::Sender<ExtractionResult<ResolutionList>>,
    },
    Variants {
        url: String,
        respond_to: oneshot::Sender<ExtractionResult<Vec<VariantInfo>>>,
    },
}

/// Handle exposed to UI code and the CLI.
#[derive(Clone)]
pub struct ExtractionRuntimeHandle {
    sender: mpsc::UnboundedSender<RuntimeCommand>,
}

impl ExtractionRuntimeHandle {
    pub fn new(sender: mpsc::UnboundedSender<RuntimeCommand>) -> Self {
        Self { sender }
    }

    fn dispatch<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<ExtractionResult<T>>) -> RuntimeCommand,
    ) -> oneshot::Receiver<ExtractionResult<T>> {
        let (tx, rx) = oneshot::channel();
        if let Err(mpsc::error::SendError(command)) = self.sender.send(build(tx)) {
            respond_unavailable(command);
        }
        rx
    }

    /// Queue an extraction without waiting.
    ///
    /// Safe to call from a non-async thread. Dropping the receiver discards a
    /// late result but does not abort the fetch.
    pub fn submit(
        &self,
        url: impl Into<String>,
    ) -> oneshot::Receiver<ExtractionResult<ResolutionList>> {
        let url = url.into();
        self.dispatch(|tx| RuntimeCommand::Resolutions {
            url,
            respond_to: tx,
        })
    }

    pub fn submit_variants(
        &self,
        url: impl Into<String>,
    ) -> oneshot::Receiver<ExtractionResult<Vec<VariantInfo>>> {
        let url = url.into();
        self.dispatch(|tx| RuntimeCommand::Variants {
            url,
            respond_to: tx,
        })
    }

    pub async fn extract(&self, url: impl Into<String>) -> ExtractionResult<ResolutionList> {
        self.submit(url).await.map_err(|_| dropped())?
    }

    pub async fn extract_variants(
        &self,
        url: impl Into<String>,
    ) -> ExtractionResult<Vec<VariantInfo>> {
        self.submit_variants(url).await.map_err(|_| dropped())?
    }
}

fn unavailable() -> ExtractionError {
    ExtractionError::fetch("", "extraction runtime unavailable")
}

fn dropped() -> ExtractionError {
    ExtractionError::fetch("", "extraction runtime dropped response")
}

fn respond_unavailable(command: RuntimeCommand) {
    match command {
        RuntimeCommand::Resolutions { respond_to, .. } => {
            let _ = respond_to.send(Err(unavailable()));
        }
        RuntimeCommand::Variants { respond_to, .. } => {
            let _ = respond_to.send(Err(unavailable()));
        }
    }
}

/// Spawn the router on the current tokio runtime, or on a dedicated thread
/// with its own runtime when called from outside one.
pub fn spawn_extraction_runtime(extractor: ResolutionExtractor) -> ExtractionRuntimeHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let router_future = router_loop(extractor, rx);

    match Handle::try_current() {
        Ok(handle) => {
            tracing::info!("[RUNTIME] Spawning extraction router in existing tokio runtime");
            handle.spawn(router_future);
        }
        Err(_) => {
            tracing::info!(
                "[RUNTIME] No tokio runtime found, starting dedicated extraction thread"
            );
            let spawned = std::thread::Builder::new()
                .name("extraction-runtime".into())
                .spawn(move || {
                    match tokio::runtime::Builder::new_multi_thread()
                        .enable_all()
                        .thread_name("extraction-worker")
                        .build()
                    {
                        Ok(runtime) => runtime.block_on(router_future),
                        Err(e) => tracing::error!("[RUNTIME] Failed to build runtime: {}", e),
                    }
                });
            if let Err(e) = spawned {
                tracing::error!("[RUNTIME] Failed to start extraction thread: {}", e);
            }
        }
    }

    ExtractionRuntimeHandle::new(tx)
}

async fn router_loop(
    extractor: ResolutionExtractor,
    mut rx: mpsc::UnboundedReceiver<RuntimeCommand>,
) {
    while let Some(cmd) = rx.recv().await {
        let extractor = extractor.clone();
        tokio::spawn(handle_command(extractor, cmd));
    }
    debug!("Extraction runtime channel closed, exiting router loop");
}

#[instrument(skip(extractor, command), fields(?command))]
async fn handle_command(extractor: ResolutionExtractor, command: RuntimeCommand) {
    match command {
        RuntimeCommand::Resolutions { url, respond_to } => {
            let result = extractor.extract_resolutions(&url).await;
            if respond_to.send(result).is_err() {
                debug!("[RUNTIME_CMD] Caller went away before result for {}", url);
            }
        }
        RuntimeCommand::Variants { url, respond_to } => {
            let result = extractor.extract_variants(&url).await;
            if respond_to.send(result).is_err() {
                debug!("[RUNTIME_CMD] Caller went away before variants for {}", url);
            }
        }
    }
}
