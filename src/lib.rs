//! # cmdsplice
//!
//! Inline command bridge for Minecraft protocol proxies:
//! - Splices an external command engine's roots into the client's
//!   Declare Commands tree
//! - Intercepts escape-prefixed chat and command text and hands it to the
//!   external executor
//! - Answers tab completion and chat preview from the external engine
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Proxy transport (external)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ packets, one connection at a time
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Session (DispatchTable)                    │
//! │           pass / cancel / cancel-and-respond                │
//! └───────┬───────────────────┬─────────────────────┬───────────┘
//!         │                   │                     │
//!         ▼                   ▼                     ▼
//!  ┌─────────────┐    ┌───────────────┐     ┌──────────────┐
//!  │  Executor   │    │  Translator   │     │ Merge Engine │
//!  │ (external)  │    │ (suggestions) │     │   (splice)   │
//!  └─────────────┘    └───────────────┘     └──────┬───────┘
//!                                                  │
//!                                                  ▼
//!                                          ┌──────────────┐
//!                                          │  Tree Cache  │
//!                                          │  (ArcSwap)   │
//!                                          └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod registry;
pub mod source;
pub mod merge;
pub mod translate;
pub mod cache;
pub mod network;
pub mod bridge;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SpliceError, Result};
pub use config::Config;
pub use bridge::Bridge;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cmdsplice
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
