use crate::config::ScanConfig;
use crate::constants::FOSCAM_COMMON_PORTS;
use crate::errors::ScanError;
use crate::expand::{expand, ExpandPolicy};
use crate::model::{Camera, Candidate};
use crate::probe::{Prober, Verdict};
use crate::queue::ScanQueue;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Point-in-time view of a running scan
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub processed: usize,
    /// Expected candidate count. Grows while pessimistic expansion keeps
    /// discovering new work, so it is not fixed up front in that mode.
    pub total: usize,
    pub confirmed: usize,
    pub elapsed: Duration,
    /// elapsed/processed × (total−processed); None until the first
    /// candidate has been processed
    pub remaining: Option<Duration>,
}

/// Shared counters published by the orchestrator while a scan runs
pub struct ScanStats {
    processed: AtomicUsize,
    total: AtomicUsize,
    confirmed: AtomicUsize,
    started: Instant,
}

impl ScanStats {
    fn new() -> Self {
        Self {
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            confirmed: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    fn add_processed(&self, n: usize) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }

    fn add_total(&self, n: usize) {
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    fn add_confirmed(&self, n: usize) {
        self.confirmed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScanProgress {
        let processed = self.processed.load(Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);
        let confirmed = self.confirmed.load(Ordering::Relaxed);
        let elapsed = self.started.elapsed();

        let remaining = if processed > 0 && total >= processed {
            let per_candidate = elapsed.as_secs_f64() / processed as f64;
            Some(Duration::from_secs_f64(
                per_candidate * (total - processed) as f64,
            ))
        } else {
            None
        };

        ScanProgress {
            processed,
            total,
            confirmed,
            elapsed,
            remaining,
        }
    }
}

/// Receives progress samples at the orchestrator's cadence.
/// Implementations must tolerate being a no-op.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &ScanProgress);
}

/// Sink that discards every sample
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn report(&self, _progress: &ScanProgress) {}
}

/// In-place console progress line with estimated time remaining
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&self, progress: &ScanProgress) {
        let mut line = format!(
            "\rProgress: {}/{} probed - {} open cameras",
            progress.processed, progress.total, progress.confirmed
        );
        if let Some(remaining) = progress.remaining {
            line.push_str(&format!(" - {} remaining", format_hms(remaining)));
        }
        print!("{}   ", line);
        std::io::stdout().flush().ok();
    }
}

fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Final outcome of one scan run
#[derive(Debug)]
pub struct ScanReport {
    pub confirmed: Vec<Camera>,
    pub processed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

/// Confirmed cameras with their (ip, port) identity enforced on append
struct ResultSet {
    cameras: Vec<Camera>,
    keys: HashSet<(String, u16)>,
}

impl ResultSet {
    fn new() -> Self {
        Self {
            cameras: Vec::new(),
            keys: HashSet::new(),
        }
    }

    fn insert(&mut self, camera: Camera) -> bool {
        if !self.keys.insert(camera.key()) {
            return false;
        }
        self.cameras.push(camera);
        true
    }
}

/// Scan orchestrator: owns the worker pool that drains the candidate
/// queue through the prober and feeds confirmed hits back into the
/// expander. All state is scoped to one `run` call, so independent runs
/// can execute concurrently.
pub struct ScanEngine {
    prober: Prober,
    policy: ExpandPolicy,
    optimistic: bool,
    workers: usize,
}

impl ScanEngine {
    pub fn from_config(config: &ScanConfig) -> Result<Self, ScanError> {
        let prober = Prober::new(config.base_timeout_ms, config.max_attempts)?;
        let policy = ExpandPolicy {
            adjacent_depth: config.adjacent_depth,
            common_ports: config
                .common_ports
                .then(|| FOSCAM_COMMON_PORTS.to_vec()),
        };

        Ok(Self {
            prober,
            policy,
            optimistic: config.optimistic,
            workers: config.workers.max(1),
        })
    }

    /// Run a scan to completion: the run is done when the queue has
    /// drained and every worker has exited
    pub async fn run(&self, candidates: Vec<Candidate>, sink: Arc<dyn ProgressSink>) -> ScanReport {
        self.run_with_cancel(candidates, sink, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// Like `run`, but stops pulling new work once `cancel` is set;
    /// in-flight probes finish at their own timeout boundary
    pub async fn run_with_cancel(
        &self,
        candidates: Vec<Candidate>,
        sink: Arc<dyn ProgressSink>,
        cancel: Arc<AtomicBool>,
    ) -> ScanReport {
        let queue = Arc::new(ScanQueue::new());
        let stats = Arc::new(ScanStats::new());
        let no_known = HashSet::new();

        // Seed the queue. Optimistic crawl expands every raw candidate up
        // front; pessimistic leaves expansion to the confirming workers.
        for candidate in candidates {
            let siblings = if self.optimistic {
                expand(&candidate, &self.policy, &no_known)
            } else {
                Vec::new()
            };

            if queue.push(candidate).await {
                stats.add_total(1);
            }
            for sib in siblings {
                if queue.push(sib).await {
                    stats.add_total(1);
                }
            }
        }

        let results = Arc::new(Mutex::new(ResultSet::new()));
        let done = Arc::new(AtomicBool::new(false));

        let progress_handle = {
            let stats = stats.clone();
            let sink = sink.clone();
            let done = done.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(1));
                loop {
                    interval.tick().await;
                    if done.load(Ordering::Relaxed) {
                        break;
                    }
                    sink.report(&stats.snapshot());
                }
            })
        };

        let mut workers = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            workers.push(tokio::spawn(worker_loop(
                queue.clone(),
                self.prober.clone(),
                self.policy.clone(),
                self.optimistic,
                results.clone(),
                stats.clone(),
                cancel.clone(),
            )));
        }

        join_all(workers).await;
        done.store(true, Ordering::Relaxed);
        let _ = progress_handle.await;

        sink.report(&stats.snapshot());

        let confirmed = std::mem::take(&mut results.lock().await.cameras);
        let progress = stats.snapshot();

        ScanReport {
            confirmed,
            processed: progress.processed,
            total: progress.total,
            elapsed: progress.elapsed,
        }
    }
}

/// One worker: pop → probe → record/expand, until the queue is observed
/// empty. A fixed point is guaranteed because the queue's seen-set only
/// ever admits not-yet-seen (ip, port) pairs.
async fn worker_loop(
    queue: Arc<ScanQueue>,
    prober: Prober,
    policy: ExpandPolicy,
    optimistic: bool,
    results: Arc<Mutex<ResultSet>>,
    stats: Arc<ScanStats>,
    cancel: Arc<AtomicBool>,
) {
    let no_known = HashSet::new();

    loop {
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        let Some(candidate) = queue.pop().await else {
            break;
        };

        let verdict = prober.probe(Some(&candidate)).await;

        if verdict == Verdict::Confirmed {
            let camera = candidate.confirm(Utc::now());
            let fresh = results.lock().await.insert(camera);

            if fresh {
                stats.add_confirmed(1);

                // Pessimistic crawl discovers new work around each hit;
                // the queue's seen-set rejects anything already probed
                if !optimistic {
                    for sib in expand(&candidate, &policy, &no_known) {
                        if queue.push(sib).await {
                            stats.add_total(1);
                        }
                    }
                }
            }
        }

        stats.add_processed(1);
    }
}
