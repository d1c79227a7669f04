use crate::model::Candidate;
use std::collections::{HashSet, VecDeque};
use tokio::sync::Mutex;

struct QueueInner {
    pending: VecDeque<Candidate>,
    seen: HashSet<(String, u16)>,
}

/// Work queue of pending candidates shared by all scan workers.
/// Multi-producer/multi-consumer: workers pop concurrently while
/// pessimistic expansion pushes new siblings from other workers.
///
/// The queue owns the run-wide (ip, port) seen-set, so a pair that was
/// ever enqueued can never be enqueued again — expansion cycles reach a
/// fixed point instead of looping.
pub struct ScanQueue {
    inner: Mutex<QueueInner>,
}

impl ScanQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                pending: VecDeque::new(),
                seen: HashSet::new(),
            }),
        }
    }

    /// Enqueue a candidate unless its (ip, port) was already seen.
    /// Returns whether the candidate was accepted.
    pub async fn push(&self, candidate: Candidate) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.seen.insert(candidate.key()) {
            return false;
        }
        inner.pending.push_back(candidate);
        true
    }

    /// Non-blocking pop; None means the queue is currently empty
    pub async fn pop(&self) -> Option<Candidate> {
        self.inner.lock().await.pending.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.pending.is_empty()
    }
}

impl Default for ScanQueue {
    fn default() -> Self {
        Self::new()
    }
}
