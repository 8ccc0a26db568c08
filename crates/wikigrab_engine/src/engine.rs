use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_error, engine_info};

use crate::crawl::{crawl, CrawlRequest, CrawlSettings};
use crate::fetch::{ChannelProgressSink, Fetcher, ReqwestFetcher};
use crate::run::RunContext;
use crate::{EngineEvent, FetchError};

enum EngineCommand {
    Start {
        request: CrawlRequest,
        ctx: RunContext,
    },
}

/// Owns the background worker that executes crawl runs one at a time.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    current: Option<RunContext>,
}

impl EngineHandle {
    pub fn new(settings: CrawlSettings) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.fetch.clone())?);
        Ok(Self::with_fetcher(fetcher, settings))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, settings: CrawlSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let sink = ChannelProgressSink::new(event_tx);
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start { request, ctx } => {
                        engine_info!("Starting crawl of {}", request.start_url);
                        runtime.block_on(crawl(
                            fetcher.as_ref(),
                            &request,
                            &settings,
                            &ctx,
                            &sink,
                        ));
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx,
            current: None,
        }
    }

    /// Queue a new run. Any run still in progress is cancelled so that it
    /// finishes promptly and the new one starts with fresh counters.
    pub fn start(&mut self, request: CrawlRequest) -> RunContext {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        let ctx = RunContext::new();
        self.current = Some(ctx.clone());
        let _ = self.cmd_tx.send(EngineCommand::Start {
            request,
            ctx: ctx.clone(),
        });
        ctx
    }

    pub fn stop(&self) {
        if let Some(ctx) = &self.current {
            ctx.cancel();
        }
    }

    /// Wait up to `timeout` for the next event. `Disconnected` means the
    /// worker thread has exited and no further events will arrive.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}
