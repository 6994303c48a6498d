// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # LoRa P2P - two-layer protocol stack for LoRa-class radios
//!
//! A small peer-to-peer stack for long-range, low-bandwidth radio links
//! (~255-byte physical frames). Nodes carry an 8-bit address (0xFF is
//! broadcast); an application on one node sends a variable-length byte
//! payload to another node, or to all nodes, optionally with per-hop
//! acknowledgement.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Application (User Code)                |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  TransportLayer                         |
//! |  fragmentation / reassembly / ACKs      |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  NetworkLayer                           |
//! |  [from, to] addressing + dest filter    |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  LinkDriver (radio hardware)            |
//! +-----------------------------------------+
//! ```
//!
//! ## Example
//!
//! ```
//! use lora_p2p::{MemoryMedium, NetworkLayer, TransportLayer};
//!
//! let medium = MemoryMedium::new();
//!
//! let mut network = NetworkLayer::new(medium.endpoint());
//! network.set_node_id(1);
//! let mut sender = TransportLayer::new(network);
//!
//! let mut network = NetworkLayer::new(medium.endpoint());
//! network.set_node_id(2);
//! let mut receiver = TransportLayer::new(network);
//!
//! sender.send(2, b"hello", false).unwrap();
//!
//! let mut buf = [0u8; 64];
//! let (len, meta) = receiver.recv(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"hello");
//! assert_eq!(meta.from, 1);
//! ```
//!
//! ## Design Constraints
//!
//! - **No heap allocations** on the data path (fixed 255-byte buffers)
//! - **Blocking I/O** - both layers are synchronous; callers use threads
//!   for concurrent send and receive duties
//! - **Fail fast** - no retransmission; a lost ACK surfaces as an error
//!   and the caller decides whether to retry

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Transport layer configuration
pub mod config;

/// Error types
pub mod error;

/// Link layer abstraction (radio driver contract + in-memory medium)
pub mod link;

/// Network layer (addressing, destination filtering)
pub mod network;

/// Transport layer (fragmentation, reassembly, reliability)
pub mod transport;

// Re-exports for convenience
pub use crate::config::TransportConfig;
pub use crate::error::{Error, Result};
pub use crate::link::{LinkDriver, MemoryLink, MemoryMedium, SignalQuality, MAX_LINK_FRAME};
pub use crate::network::{Incoming, NetworkLayer, NetworkStats, BROADCAST_ID};
pub use crate::transport::{TransportLayer, TransportStats};

/// Version of the stack
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
