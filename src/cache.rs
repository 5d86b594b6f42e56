//! Tree synchronization cache
//!
//! Process-wide cache of [`MergeOutput`] keyed by protocol version.
//!
//! ## Concurrency Model
//! - Readers load an immutable [`CacheSnapshot`] through `ArcSwap`; they
//!   never lock and never see a half-built entry
//! - A single worker thread rebuilds entries and publishes a whole new
//!   snapshot; requests reach it over a bounded crossbeam channel
//! - Registry changes bump the snapshot generation; stale entries keep
//!   being served until their rebuild is published
//! - After every rebuild, live subscribers at that version get the new
//!   output (fire-and-forget per subscriber)

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use arc_swap::ArcSwap;
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::error::{Result, SpliceError};
use crate::merge::MergeOutput;
use crate::registry::{CommandRegistry, RegistryObserver};

/// Receives refreshed merge output for one protocol version
pub trait TreeSubscriber: Send + Sync {
    fn protocol_version(&self) -> i32;

    /// Resend the merged tree built from `output`
    fn refresh_tree(&self, output: &Arc<MergeOutput>) -> Result<()>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    generation: u64,
    output: Arc<MergeOutput>,
}

/// Immutable view of the cache at one point in time
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    generation: u64,
    entries: HashMap<i32, CacheEntry>,
}

impl CacheSnapshot {
    /// Bumped on every registry change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, protocol: i32) -> Option<&Arc<MergeOutput>> {
        self.entries.get(&protocol).map(|entry| &entry.output)
    }

    /// Whether the entry for `protocol` reflects the latest registry state
    pub fn is_current(&self, protocol: i32) -> bool {
        self.entries
            .get(&protocol)
            .is_some_and(|entry| entry.generation == self.generation)
    }

    pub fn versions(&self) -> Vec<i32> {
        self.entries.keys().copied().collect()
    }
}

enum Request {
    Rebuild(i32),
    Sync(Sender<()>),
    Shutdown,
}

struct Shared {
    registry: Arc<dyn CommandRegistry>,
    escape_prefix: String,
    snapshot: ArcSwap<CacheSnapshot>,
    subscribers: Mutex<Vec<Weak<dyn TreeSubscriber>>>,
    requests: Sender<Request>,
}

impl Shared {
    fn schedule(&self, protocol: i32) {
        match self.requests.try_send(Request::Rebuild(protocol)) {
            Ok(()) => tracing::trace!("Scheduled tree rebuild for protocol {}", protocol),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Rebuild queue full, dropping request for protocol {}", protocol)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("Rebuild worker gone, dropping request for protocol {}", protocol)
            }
        }
    }

    fn invalidate(&self) {
        let previous = self.snapshot.rcu(|current| {
            let mut next = CacheSnapshot::clone(current);
            next.generation += 1;
            next
        });
        tracing::info!(
            "Command registry changed, tree cache generation {} -> {}",
            previous.generation,
            previous.generation + 1
        );

        let mut versions = previous.versions();
        for protocol in self.live_versions() {
            if !versions.contains(&protocol) {
                versions.push(protocol);
            }
        }
        for protocol in versions {
            self.schedule(protocol);
        }
    }

    fn rebuild(&self, protocol: i32) -> Result<Arc<MergeOutput>> {
        let generation = self.snapshot.load().generation;
        let roots = self.registry.roots();
        let output = Arc::new(MergeOutput::build(protocol, &roots, &self.escape_prefix)?);

        self.snapshot.rcu(|current| {
            let mut next = CacheSnapshot::clone(current);
            let newer_exists = next
                .entries
                .get(&protocol)
                .is_some_and(|entry| entry.generation > generation);
            if !newer_exists {
                next.entries.insert(
                    protocol,
                    CacheEntry {
                        generation,
                        output: Arc::clone(&output),
                    },
                );
            }
            next
        });
        tracing::debug!(
            "Published tree for protocol {} (generation {}, {} roots)",
            protocol,
            generation,
            output.roots.len()
        );

        self.push(protocol, &output);
        Ok(output)
    }

    fn push(&self, protocol: i32, output: &Arc<MergeOutput>) {
        let targets: Vec<Arc<dyn TreeSubscriber>> = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|subscriber| subscriber.protocol_version() == protocol)
                .collect()
        };

        for subscriber in targets {
            if let Err(e) = subscriber.refresh_tree(output) {
                tracing::warn!("Failed to push refreshed tree for protocol {}: {}", protocol, e);
            }
        }
    }

    fn live_versions(&self) -> Vec<i32> {
        let mut versions: Vec<i32> = self
            .subscribers
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|subscriber| subscriber.protocol_version())
            .collect();
        versions.sort_unstable();
        versions.dedup();
        versions
    }
}

/// Shared cache of merge output with a background rebuild worker
pub struct TreeCache {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl TreeCache {
    /// Create the cache and start its rebuild worker
    pub fn new(
        registry: Arc<dyn CommandRegistry>,
        escape_prefix: impl Into<String>,
        queue_capacity: usize,
    ) -> Result<Self> {
        let (requests, receiver) = bounded(queue_capacity.max(1));
        let shared = Arc::new(Shared {
            registry,
            escape_prefix: escape_prefix.into(),
            snapshot: ArcSwap::from_pointee(CacheSnapshot::default()),
            subscribers: Mutex::new(Vec::new()),
            requests,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("cmdsplice-tree-cache".to_string())
            .spawn(move || run_worker(worker_shared, receiver))?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Current merge output for `protocol`
    ///
    /// Never blocks. A stale entry is still returned (and a rebuild
    /// scheduled); with no entry at all the rebuild is scheduled and
    /// `RegistryUnavailable` returned.
    pub fn lookup(&self, protocol: i32) -> Result<Arc<MergeOutput>> {
        let snapshot = self.shared.snapshot.load();
        match snapshot.get(protocol) {
            Some(output) => {
                if !snapshot.is_current(protocol) {
                    self.shared.schedule(protocol);
                }
                Ok(Arc::clone(output))
            }
            None => {
                self.shared.schedule(protocol);
                Err(SpliceError::RegistryUnavailable { protocol })
            }
        }
    }

    /// Immutable handle to the whole cache
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.shared.snapshot.load_full()
    }

    /// Rebuild on the calling thread, publish, and push to subscribers
    pub fn rebuild_now(&self, protocol: i32) -> Result<Arc<MergeOutput>> {
        self.shared.rebuild(protocol)
    }

    /// Queue a rebuild for the worker
    pub fn schedule_rebuild(&self, protocol: i32) {
        self.shared.schedule(protocol);
    }

    /// Mark every entry stale and queue rebuilds for all versions in use
    pub fn invalidate(&self) {
        self.shared.invalidate();
    }

    /// Observer to hand to [`CommandRegistry::subscribe`]
    pub fn registry_observer(&self) -> RegistryObserver {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        Arc::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.invalidate();
            }
        })
    }

    /// Receive pushes for the subscriber's protocol version
    pub fn subscribe(&self, subscriber: &Arc<dyn TreeSubscriber>) {
        self.shared.subscribers.lock().push(Arc::downgrade(subscriber));
    }

    pub fn unsubscribe(&self, subscriber: &Arc<dyn TreeSubscriber>) {
        let target = Arc::downgrade(subscriber);
        self.shared
            .subscribers
            .lock()
            .retain(|weak| weak.strong_count() > 0 && !Weak::ptr_eq(weak, &target));
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared
            .subscribers
            .lock()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Block until every request queued before this call is processed
    pub fn sync(&self) -> Result<()> {
        let (ack, done) = bounded(1);
        self.shared
            .requests
            .send(Request::Sync(ack))
            .map_err(|_| SpliceError::Network("tree cache worker stopped".to_string()))?;
        done.recv()
            .map_err(|_| SpliceError::Network("tree cache worker stopped".to_string()))
    }
}

impl Drop for TreeCache {
    fn drop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // The last owner can be released on the worker itself; it must not
        // wait on its own queue.
        if worker.thread().id() == std::thread::current().id() {
            let _ = self.shared.requests.try_send(Request::Shutdown);
            return;
        }
        let _ = self.shared.requests.send(Request::Shutdown);
        if worker.join().is_err() {
            tracing::warn!("Tree cache worker panicked");
        }
    }
}

fn run_worker(shared: Arc<Shared>, receiver: Receiver<Request>) {
    tracing::debug!("Tree cache worker started");
    while let Ok(request) = receiver.recv() {
        match request {
            Request::Rebuild(protocol) => {
                // Duplicate requests collapse once the entry is current.
                if shared.snapshot.load().is_current(protocol) {
                    continue;
                }
                if let Err(e) = shared.rebuild(protocol) {
                    tracing::warn!("Tree rebuild for protocol {} failed: {}", protocol, e);
                }
            }
            Request::Sync(ack) => {
                let _ = ack.send(());
            }
            Request::Shutdown => break,
        }
    }
    tracing::debug!("Tree cache worker stopped");
}
