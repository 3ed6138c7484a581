//! Collected body stream

use crate::pagination::PageCounter;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Body bytes of one collected item, across every page
///
/// Bytes arrive from a background monitor task. Errors never show up in the
/// stream itself; the monitor reports them to the job.
pub struct CollectStream {
    rx: mpsc::Receiver<Bytes>,
    counter: PageCounter,
    monitor: JoinHandle<()>,
}

impl CollectStream {
    pub(crate) fn new(rx: mpsc::Receiver<Bytes>, counter: PageCounter, monitor: JoinHandle<()>) -> Self {
        Self {
            rx,
            counter,
            monitor,
        }
    }

    /// Page currently being read, starting at 1
    pub fn page_num(&self) -> u32 {
        self.counter.get()
    }

    /// Read the whole body, then wait for the monitor to finish reporting
    pub async fn read_all(mut self) -> Bytes {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk);
        }
        self.finish().await;
        buf.freeze()
    }

    /// Wait until the monitor has reported any errors
    ///
    /// Unread bytes are discarded.
    pub async fn finish(self) {
        let Self { rx, monitor, .. } = self;
        drop(rx);
        if let Err(e) = monitor.await {
            tracing::warn!(error = %e, "collect monitor task failed");
        }
    }
}

impl Stream for CollectStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl std::fmt::Debug for CollectStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectStream")
            .field("page_num", &self.counter.get())
            .finish_non_exhaustive()
    }
}
