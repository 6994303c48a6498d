// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport layer configuration

use std::time::Duration;

/// Transport protocol timing and validation knobs.
///
/// The defaults reproduce the stock protocol behavior: a 1 second
/// acknowledgement wait and a 1 millisecond grace period between
/// fragments. Tighten `ack_timeout` for fast links or test rigs.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// How long a reliable send waits for the peer's ACK before failing
    /// with `Error::Timeout`. There is no retransmission; the caller
    /// decides whether to retry.
    pub ack_timeout: Duration,

    /// Pause between consecutive fragments of a multi-frame payload, and
    /// before each outgoing ACK, so the peer can drain its radio buffer.
    pub grace_period: Duration,

    /// Reject ACKs whose sender is not the addressed peer. Skipped for
    /// broadcast sends, where any peer may answer.
    pub verify_ack_source: bool,

    /// Surface `Error::InvalidFrame` on reassembly protocol violations
    /// (e.g. a CONTINUE with no prior STARTER) instead of silently
    /// discarding the partial payload and resynchronizing.
    pub strict: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(1),
            grace_period: Duration::from_millis(1),
            verify_ack_source: true,
            strict: false,
        }
    }
}
