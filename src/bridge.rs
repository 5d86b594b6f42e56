//! Bridge Module
//!
//! Ties the tree cache, the external command engine, and per-connection
//! sessions together.
//!
//! ## Responsibilities
//! - Own the process-wide tree cache and keep it subscribed to the registry
//! - Hand executor and suggestion engine to sessions
//! - Open a session for every logged-in connection

use std::sync::Arc;

use crate::cache::TreeCache;
use crate::config::Config;
use crate::error::Result;
use crate::network::{Connection, Session};
use crate::protocol::ProtocolTable;
use crate::registry::CommandRegistry;
use crate::source::{CommandExecutor, SuggestionEngine};

/// The command bridge
///
/// ## Concurrency Model
/// - Sessions run on their connection's thread, one packet at a time
/// - The tree cache is the only shared mutable state; reads are lock-free
///   snapshot loads, writes happen on the cache worker
pub struct Bridge {
    config: Config,
    protocols: ProtocolTable,
    cache: TreeCache,
    executor: Arc<dyn CommandExecutor>,
    suggester: Arc<dyn SuggestionEngine>,
}

impl Bridge {
    /// Validate the config, start the tree cache, and subscribe it to
    /// registry changes
    pub fn new(
        config: Config,
        protocols: ProtocolTable,
        registry: Arc<dyn CommandRegistry>,
        executor: Arc<dyn CommandExecutor>,
        suggester: Arc<dyn SuggestionEngine>,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        let cache = TreeCache::new(
            Arc::clone(&registry),
            config.escape_prefix.clone(),
            config.rebuild_queue_capacity,
        )?;
        registry.subscribe(cache.registry_observer());

        tracing::info!(
            "Bridge ready: escape prefix {:?}, min protocol {}",
            config.escape_prefix,
            config.min_protocol_version
        );

        Ok(Arc::new(Self {
            config,
            protocols,
            cache,
            executor,
            suggester,
        }))
    }

    /// Build the tree for every known protocol version on this thread
    ///
    /// Optional; without it the first connection at each version gets its
    /// tree from the asynchronous rebuild.
    pub fn prime(&self) -> Result<()> {
        let versions: Vec<i32> = self
            .protocols
            .versions()
            .filter(|v| *v >= self.config.min_protocol_version)
            .collect();
        for protocol in versions {
            self.cache.rebuild_now(protocol)?;
        }
        Ok(())
    }

    /// Start intercepting a freshly logged-in connection
    pub fn open_session(self: &Arc<Self>, conn: Arc<dyn Connection>) -> Result<Arc<Session>> {
        Session::open(Arc::clone(self), conn)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn protocols(&self) -> &ProtocolTable {
        &self.protocols
    }

    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    pub fn executor(&self) -> &dyn CommandExecutor {
        self.executor.as_ref()
    }

    pub fn suggester(&self) -> &dyn SuggestionEngine {
        self.suggester.as_ref()
    }
}
