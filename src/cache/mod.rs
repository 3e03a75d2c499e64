//! Cache-aside subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → key.rs (namespace + identity + rounded numbers → key)
//!     → aside.rs (store read; hit returns early)
//!     → on miss: compute (usually CircuitBreaker::execute)
//!     → aside.rs (store write with TTL)
//! ```
//!
//! # Design Decisions
//! - Entries are JSON and are never deleted explicitly; TTL is the only eviction
//! - The cache fails open: store trouble costs a recompute, never a failed request

pub mod aside;
pub mod key;

pub use aside::{CacheAside, CacheConfig};
pub use key::{quantize, CacheKey, KeyPart};
