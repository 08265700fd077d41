//! Mount/unmount lifecycle of the feed view.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::info;

use crate::composer;
use crate::config::FeedConfig;
use crate::feed::FeedController;
use crate::streaming::{EventStreamClient, StreamHandle, StreamUpdate};

const STREAM_BUFFER: usize = 256;

/// A mounted feed: the controller plus the push stream feeding it.
/// Exactly one stream connection exists while the session is mounted.
pub struct FeedSession {
    controller: FeedController,
    stream: Option<StreamHandle>,
    stream_rx: mpsc::Receiver<StreamUpdate>,
}

impl FeedSession {
    /// Open the push stream, read the post draft handoff and load posts
    pub async fn mount(config: FeedConfig) -> Self {
        Self::mount_with(FeedController::new(config)).await
    }

    pub async fn mount_with(mut controller: FeedController) -> Self {
        let (update_tx, stream_rx) = mpsc::channel(STREAM_BUFFER);
        let stream = EventStreamClient::for_api(controller.api(), controller.config()).spawn(update_tx);

        if let Some(draft) = composer::load_draft(&controller.config().data_dir) {
            info!("Loaded post draft");
            controller.apply_draft(&draft);
        }
        controller.load_posts().await;

        Self {
            controller,
            stream: Some(stream),
            stream_rx,
        }
    }

    pub fn controller(&self) -> &FeedController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FeedController {
        &mut self.controller
    }

    /// Process stream updates, timers and lookups until `shutdown` resolves
    pub async fn run_until<F, C>(&mut self, shutdown: F, on_change: C)
    where
        F: Future<Output = ()>,
        C: FnMut(&FeedController),
    {
        self.controller
            .run(&mut self.stream_rx, shutdown, on_change)
            .await;
    }

    /// Close the stream and cancel every pending typing timer
    pub async fn unmount(mut self) -> FeedController {
        if let Some(stream) = self.stream.take() {
            stream.close().await;
        }
        self.controller.teardown();
        self.controller
    }
}
