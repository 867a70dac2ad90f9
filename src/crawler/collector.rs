//! Serialized result collectors
//!
//! A collector owns one ordered list of URLs (all broken links, or all working
//! ones) inside its own task. Everything else talks to it through a mailbox, so
//! the list is only ever touched by one request at a time.

use tokio::sync::{mpsc, oneshot};

/// Pending requests a collector buffers before senders wait
const MAILBOX_SIZE: usize = 100;

enum CollectorMessage {
    Record(String),
    Snapshot(oneshot::Sender<Vec<String>>),
}

/// Handle to a running collector task
///
/// Cloning the handle is cheap; the task exits once every handle is dropped.
#[derive(Clone)]
pub struct Collector {
    name: &'static str,
    mailbox: mpsc::Sender<CollectorMessage>,
}

impl Collector {
    /// Starts a collector task on the current runtime
    pub fn spawn(name: &'static str) -> Self {
        let (mailbox, inbox) = mpsc::channel(MAILBOX_SIZE);
        tokio::spawn(run(name, inbox));
        Self { name, mailbox }
    }

    /// Appends a URL
    ///
    /// Records sent from one task keep their order; records from different
    /// tasks interleave in arrival order.
    pub async fn record(&self, url: String) {
        if self
            .mailbox
            .send(CollectorMessage::Record(url))
            .await
            .is_err()
        {
            tracing::warn!("{} collector is gone, dropping record", self.name);
        }
    }

    /// Returns a copy of everything recorded so far
    ///
    /// The snapshot is queued behind every record already accepted, so it sees
    /// all of them.
    pub async fn snapshot(&self) -> Vec<String> {
        let (reply, response) = oneshot::channel();
        if self
            .mailbox
            .send(CollectorMessage::Snapshot(reply))
            .await
            .is_err()
        {
            return Vec::new();
        }
        response.await.unwrap_or_default()
    }
}

async fn run(name: &'static str, mut inbox: mpsc::Receiver<CollectorMessage>) {
    let mut links = Vec::new();

    while let Some(message) = inbox.recv().await {
        match message {
            CollectorMessage::Record(url) => {
                tracing::trace!("{} collector: adding {}", name, url);
                links.push(url);
            }
            CollectorMessage::Snapshot(reply) => {
                let _ = reply.send(links.clone());
            }
        }
    }

    tracing::trace!("{} collector closed with {} links", name, links.len());
}
