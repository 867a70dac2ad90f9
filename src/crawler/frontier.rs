//! Frontier deduplication
//!
//! The frontier task is the only owner of the visited set. URLs arrive through
//! an unbounded mailbox; the first time a canonical URL is seen it is pushed onto
//! the bounded work queue, every later time it is dropped.
//!
//! Workers hand discovered links over with [`Frontier::offer`], which never
//! waits. Only the frontier task itself waits when the work queue is full, and
//! since workers keep draining that queue the wait always ends.

use crate::crawler::completion::CompletionDetector;
use std::collections::HashSet;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// A URL waiting to be classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Canonical URL
    pub url: String,

    /// Rate-limit retries already spent on this URL
    pub attempt: u32,
}

impl WorkItem {
    /// Creates a first-attempt work item
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attempt: 0,
        }
    }

    /// The same URL, one retry later
    pub fn next_attempt(&self) -> Self {
        Self {
            url: self.url.clone(),
            attempt: self.attempt + 1,
        }
    }
}

enum FrontierMessage {
    Admit {
        url: String,
        reply: Option<oneshot::Sender<bool>>,
    },
    Requeue(WorkItem),
}

/// Handle to the running frontier task
#[derive(Clone)]
pub struct Frontier {
    mailbox: mpsc::UnboundedSender<FrontierMessage>,
    completion: CompletionDetector,
}

impl Frontier {
    /// Starts the frontier task feeding `queue`
    ///
    /// The returned handle resolves to the number of distinct URLs admitted once
    /// every `Frontier` handle has been dropped.
    pub fn spawn(
        queue: mpsc::Sender<WorkItem>,
        completion: CompletionDetector,
    ) -> (Self, JoinHandle<usize>) {
        let (mailbox, inbox) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(inbox, queue, completion.clone()));
        (
            Self {
                mailbox,
                completion,
            },
            handle,
        )
    }

    /// Offers a URL and waits for the verdict
    ///
    /// Returns true if the URL was seen for the first time and queued. Any
    /// number of concurrent calls for one URL yield exactly one `true`.
    pub async fn admit(&self, url: String) -> bool {
        let (reply, verdict) = oneshot::channel();
        if !self.send_admit(url, Some(reply)) {
            return false;
        }
        verdict.await.unwrap_or(false)
    }

    /// Offers a URL without waiting for the verdict
    pub fn offer(&self, url: String) {
        self.send_admit(url, None);
    }

    /// Queues an already admitted item again, skipping the visited check
    ///
    /// The caller must already have counted the item as outstanding work.
    pub fn requeue(&self, item: WorkItem) {
        if self.mailbox.send(FrontierMessage::Requeue(item)).is_err() {
            self.completion.work_done();
        }
    }

    fn send_admit(&self, url: String, reply: Option<oneshot::Sender<bool>>) -> bool {
        self.completion.work_added();
        if self
            .mailbox
            .send(FrontierMessage::Admit { url, reply })
            .is_err()
        {
            tracing::warn!("Frontier is gone, dropping offered URL");
            self.completion.work_done();
            return false;
        }
        true
    }
}

async fn run(
    mut inbox: mpsc::UnboundedReceiver<FrontierMessage>,
    queue: mpsc::Sender<WorkItem>,
    completion: CompletionDetector,
) -> usize {
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(message) = inbox.recv().await {
        match message {
            FrontierMessage::Admit { url, reply } => {
                let admitted = visited.insert(url.clone());
                if admitted {
                    tracing::debug!("Admitted {}", url);
                    enqueue(&queue, WorkItem::new(url), &completion).await;
                } else {
                    tracing::trace!("Already seen {}", url);
                    completion.work_done();
                }

                if let Some(reply) = reply {
                    let _ = reply.send(admitted);
                }
            }
            FrontierMessage::Requeue(item) => {
                tracing::debug!("Re-queueing {} (attempt {})", item.url, item.attempt);
                enqueue(&queue, item, &completion).await;
            }
        }
    }

    visited.len()
}

async fn enqueue(queue: &mpsc::Sender<WorkItem>, item: WorkItem, completion: &CompletionDetector) {
    if let Err(e) = queue.send(item).await {
        tracing::debug!("Work queue closed, dropping {}", e.0.url);
        completion.work_done();
    }
}
