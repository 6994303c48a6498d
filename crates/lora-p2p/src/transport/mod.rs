// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport layer: fragmentation, reassembly and stop-and-wait reliability
//!
//! Splits arbitrary-length payloads into link-sized fragments, reassembles
//! them on the receiver, and optionally runs a stop-and-wait handshake in
//! which every fragment is individually acknowledged.
//!
//! ## Protocol
//!
//! - A payload that fits one frame travels as a single `STAND_ALONE`
//! - Larger payloads travel as `STARTER` + `CONTINUE`* + `FINISHER`,
//!   concatenated in arrival order on the receiver
//! - With the RELIABLE flag set, the sender waits up to the configured
//!   ACK timeout after every fragment and fails fast on loss; there is
//!   no retransmission at this layer
//! - A 1 ms grace period separates consecutive fragments and precedes
//!   each outgoing ACK so the peer can drain its radio buffer

pub mod frame;

use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::link::{LinkDriver, MAX_LINK_FRAME};
use crate::network::{Incoming, NetworkLayer, BROADCAST_ID};
use frame::FrameKind;
use std::thread;

/// Transport layer counters
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportStats {
    /// Complete payloads sent
    pub payloads_sent: u32,
    /// Fragments sent (including stand-alone frames)
    pub fragments_sent: u32,
    /// Complete payloads reassembled and returned
    pub payloads_received: u32,
    /// Fragments accepted by the reassembler
    pub fragments_received: u32,
    /// Acknowledgements emitted
    pub acks_sent: u32,
    /// Acknowledgements consumed by reliable sends
    pub acks_received: u32,
}

/// Reassembly state across fragments of one receive transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Idle,
    Collecting,
}

/// Fragmenting datagram layer on top of [`NetworkLayer`].
///
/// Owns one link-frame-sized staging buffer, used for both outgoing
/// fragments and ACK receipt; a single instance must not have `send` and
/// `recv` in flight at the same time (the `&mut self` receivers enforce
/// this within one thread).
pub struct TransportLayer<L: LinkDriver> {
    network: NetworkLayer<L>,
    config: TransportConfig,
    buf: [u8; MAX_LINK_FRAME],
    stats: TransportStats,
}

impl<L: LinkDriver> TransportLayer<L> {
    /// Create a transport layer with the default protocol timing.
    pub fn new(network: NetworkLayer<L>) -> Self {
        Self::with_config(network, TransportConfig::default())
    }

    /// Create a transport layer with explicit configuration.
    pub fn with_config(network: NetworkLayer<L>, config: TransportConfig) -> Self {
        Self {
            network,
            config,
            buf: [0u8; MAX_LINK_FRAME],
            stats: TransportStats::default(),
        }
    }

    /// Borrow the underlying network layer (diagnostic use).
    pub fn network(&self) -> &NetworkLayer<L> {
        &self.network
    }

    /// Mutably borrow the underlying network layer.
    pub fn network_mut(&mut self) -> &mut NetworkLayer<L> {
        &mut self.network
    }

    /// Counters snapshot.
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Largest payload that still travels as a single frame.
    ///
    /// Anything longer is split into `STARTER` + `CONTINUE`* + `FINISHER`.
    pub fn max_fragment_payload(&self) -> usize {
        self.network.mtu().saturating_sub(frame::HEADER_LEN)
    }

    /// Send a payload of any length to the given destination.
    ///
    /// With `reliable` set, every fragment must be acknowledged by the
    /// peer within the configured timeout; the first missing or malformed
    /// ACK aborts the send (`Error::Timeout` / `Error::InvalidFrame`).
    /// The caller decides whether to retry; a failed reliable send may
    /// leave the peer holding a partial payload.
    pub fn send(&mut self, to: u8, payload: &[u8], reliable: bool) -> Result<()> {
        let capacity = self.max_fragment_payload();
        if capacity == 0 {
            return Err(Error::InvalidSize);
        }

        log::debug!(
            "[TRANSPORT] sending {} byte payload to {} (reliable = {})",
            payload.len(),
            to,
            reliable
        );

        let mut remaining = payload;
        let mut first = true;
        loop {
            let take = remaining.len().min(capacity);
            let (chunk, rest) = remaining.split_at(take);
            remaining = rest;
            let last = remaining.is_empty();

            let kind = match (first, last) {
                (true, true) => FrameKind::StandAlone,
                (true, false) => FrameKind::Starter,
                (false, true) => FrameKind::Finisher,
                (false, false) => FrameKind::Continue,
            };
            first = false;

            self.buf[0] = frame::header_byte(kind, reliable);
            self.buf[frame::HEADER_LEN..frame::HEADER_LEN + take].copy_from_slice(chunk);

            self.network
                .send(to, &self.buf[..frame::HEADER_LEN + take])?;
            self.stats.fragments_sent += 1;

            if reliable {
                self.wait_ack(to)?;
            }

            if last {
                break;
            }

            // grace time so the recipient can sort things out before the
            // next fragment arrives
            thread::sleep(self.config.grace_period);
        }

        self.stats.payloads_sent += 1;
        Ok(())
    }

    /// Block until a complete payload addressed to this node arrives.
    ///
    /// Returns the reassembled length and the metadata of the first frame
    /// of the transaction. Fragments carrying the RELIABLE flag are each
    /// acknowledged back to their sender; an ACK send failure aborts the
    /// receive. A payload larger than `buf` fails with
    /// `Error::InvalidSize`.
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<(usize, Incoming)> {
        log::debug!("[TRANSPORT] ready to receive up to {} bytes", buf.len());

        let mut state = RxState::Idle;
        let mut written = 0usize;
        let mut first_meta: Option<Incoming> = None;

        loop {
            let (len, meta) = self.network.recv(&mut self.buf, None)?;

            let decoded = if len >= frame::HEADER_LEN {
                FrameKind::from_header(self.buf[0])
            } else {
                None
            };

            // A STARTER always begins a new transaction; there is no
            // cross-session framing, so a stale partial payload from an
            // interrupted train is discarded.
            if state == RxState::Collecting && decoded == Some(FrameKind::Starter) {
                log::warn!(
                    "[TRANSPORT] starter from {} interrupts reassembly, discarding partial payload",
                    meta.from
                );
                state = RxState::Idle;
                written = 0;
                first_meta = None;
            }

            let kind = match (state, decoded) {
                (RxState::Idle, Some(kind @ (FrameKind::StandAlone | FrameKind::Starter)))
                | (RxState::Collecting, Some(kind @ (FrameKind::Continue | FrameKind::Finisher))) => {
                    kind
                }
                _ => {
                    if self.config.strict {
                        log::error!(
                            "[TRANSPORT] unexpected {:?} frame from {} while {:?}",
                            decoded,
                            meta.from,
                            state
                        );
                        return Err(Error::InvalidFrame);
                    }
                    log::warn!(
                        "[TRANSPORT] dropping unexpected {:?} frame from {} while {:?}",
                        decoded,
                        meta.from,
                        state
                    );
                    state = RxState::Idle;
                    written = 0;
                    first_meta = None;
                    continue;
                }
            };

            let payload_len = len - frame::HEADER_LEN;
            if written + payload_len > buf.len() {
                log::error!(
                    "[TRANSPORT] receive buffer of {} bytes cannot hold reassembled payload",
                    buf.len()
                );
                return Err(Error::InvalidSize);
            }
            buf[written..written + payload_len]
                .copy_from_slice(&self.buf[frame::HEADER_LEN..len]);
            written += payload_len;
            self.stats.fragments_received += 1;

            if first_meta.is_none() {
                first_meta = Some(meta);
            }

            if frame::is_reliable(self.buf[0]) {
                // grace time before the ACK so the sender is back in
                // receive mode
                thread::sleep(self.config.grace_period);
                self.network.send(meta.from, &frame::ACK_FRAME)?;
                self.stats.acks_sent += 1;
            }

            match kind {
                FrameKind::StandAlone | FrameKind::Finisher => {
                    self.stats.payloads_received += 1;
                    log::debug!("[TRANSPORT] got payload ({} bytes)", written);
                    return Ok((written, first_meta.unwrap_or(meta)));
                }
                _ => state = RxState::Collecting,
            }
        }
    }

    /// Wait for the peer's ACK after a reliable fragment.
    fn wait_ack(&mut self, to: u8) -> Result<()> {
        let (len, meta) = match self
            .network
            .recv(&mut self.buf, Some(self.config.ack_timeout))
        {
            Ok(received) => received,
            Err(err) => {
                log::error!("[TRANSPORT] no ack from {}: {}", to, err);
                return Err(err);
            }
        };

        if !frame::is_ack_frame(&self.buf[..len]) {
            log::error!(
                "[TRANSPORT] expected ack from {}, got {} byte frame",
                to,
                len
            );
            return Err(Error::InvalidFrame);
        }

        if self.config.verify_ack_source && to != BROADCAST_ID && meta.from != to {
            log::error!(
                "[TRANSPORT] ack from unexpected node {} (wanted {})",
                meta.from,
                to
            );
            return Err(Error::InvalidFrame);
        }

        self.stats.acks_received += 1;
        Ok(())
    }
}
