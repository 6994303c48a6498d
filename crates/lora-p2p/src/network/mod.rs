// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Network layer: node addressing and destination filtering
//!
//! Wraps a [`LinkDriver`] and gives every node an 8-bit address. Outgoing
//! payloads get a 2-byte `[from, to]` header; incoming frames addressed to
//! neither this node nor the broadcast id are silently dropped and the
//! receive loop keeps listening. Signal metrics (RSSI/SNR) of accepted
//! frames are surfaced to the caller.

mod header;

pub use header::{NetHeader, BROADCAST_ID, HEADER_LEN};

use crate::error::{Error, Result};
use crate::link::{LinkDriver, MAX_LINK_FRAME};
use std::time::Duration;

/// Metadata of an accepted incoming frame.
///
/// Shared by the network and transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incoming {
    /// Sender node id as received on the wire
    pub from: u8,
    /// Destination node id as received on the wire (0xFF = broadcast)
    pub to: u8,
    /// RSSI of the incoming transmission
    pub rssi: i16,
    /// SNR of the incoming transmission
    pub snr: i8,
}

/// Network layer counters
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkStats {
    /// Frames handed to the link driver
    pub frames_sent: u32,
    /// Frames accepted and returned to the caller
    pub frames_received: u32,
    /// Frames dropped by the destination filter
    pub frames_filtered: u32,
}

/// Addressing layer on top of a raw frame link.
///
/// The node id starts at 0; set it before use. The id 0xFF is reserved
/// for broadcast and must not be assigned to a node.
pub struct NetworkLayer<L: LinkDriver> {
    link: L,
    node_id: u8,
    tx_buf: [u8; MAX_LINK_FRAME],
    rx_buf: [u8; MAX_LINK_FRAME],
    stats: NetworkStats,
}

impl<L: LinkDriver> NetworkLayer<L> {
    /// Create a network layer over a link driver.
    pub fn new(link: L) -> Self {
        Self {
            link,
            node_id: 0,
            tx_buf: [0u8; MAX_LINK_FRAME],
            rx_buf: [0u8; MAX_LINK_FRAME],
            stats: NetworkStats::default(),
        }
    }

    /// Borrow the underlying link driver (diagnostic use).
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link driver.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Effective network MTU: the link MTU minus the 2-byte header.
    ///
    /// This is the maximum payload size `send` accepts. The link MTU is
    /// clamped to `MAX_LINK_FRAME`, the size of the internal buffers.
    pub fn mtu(&self) -> usize {
        self.link.mtu().min(MAX_LINK_FRAME).saturating_sub(HEADER_LEN)
    }

    /// This node's address.
    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    /// Set this node's address. Callers must not pass 0xFF.
    pub fn set_node_id(&mut self, node_id: u8) {
        log::debug!("[NET] node id set to {}", node_id);
        self.node_id = node_id;
    }

    /// Counters snapshot.
    pub fn stats(&self) -> NetworkStats {
        self.stats
    }

    /// Send a payload to the given destination.
    ///
    /// Prepends the `[my_id, to]` header and hands the composite frame to
    /// the link driver. Fails with `Error::InvalidSize` when the payload
    /// exceeds the network MTU; link errors are surfaced verbatim.
    pub fn send(&mut self, to: u8, payload: &[u8]) -> Result<()> {
        let mtu = self.mtu();
        if payload.len() > mtu {
            log::error!(
                "[NET] payload of {} bytes exceeds network MTU of {}",
                payload.len(),
                mtu
            );
            return Err(Error::InvalidSize);
        }

        log::debug!("[NET] sending {} bytes to {}", payload.len(), to);

        let header = NetHeader::new(self.node_id, to);
        let header_len = header.encode(&mut self.tx_buf)?;
        let total = header_len + payload.len();
        self.tx_buf[header_len..total].copy_from_slice(payload);

        self.link.send(&self.tx_buf[..total])?;
        self.stats.frames_sent += 1;
        Ok(())
    }

    /// Send a payload to every node in range.
    pub fn broadcast(&mut self, payload: &[u8]) -> Result<()> {
        self.send(BROADCAST_ID, payload)
    }

    /// Receive the next frame addressed to this node (or broadcast).
    ///
    /// Frames for other destinations are dropped and the loop re-receives
    /// with the same `timeout`; only a link error (including
    /// `Error::Timeout`) terminates the loop. On success the header is
    /// stripped and the payload copied into `buf`; a caller buffer too
    /// small for the payload fails with `Error::InvalidSize`.
    pub fn recv(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<(usize, Incoming)> {
        loop {
            let (len, signal) = self.link.recv(&mut self.rx_buf, timeout)?;

            // runt frames are noise, skip them
            if len < HEADER_LEN {
                log::debug!("[NET] dropping runt frame of {} bytes", len);
                continue;
            }

            let header = NetHeader::decode(&self.rx_buf[..len])?;
            log::debug!(
                "[NET] got frame (size = {}, from = {}, to = {})",
                len,
                header.from,
                header.to
            );

            // is it for us ?
            if header.to != self.node_id && !header.is_broadcast() {
                self.stats.frames_filtered += 1;
                continue;
            }

            let payload_len = len - HEADER_LEN;
            if payload_len > buf.len() {
                log::error!(
                    "[NET] receive buffer of {} bytes cannot hold {} byte payload",
                    buf.len(),
                    payload_len
                );
                return Err(Error::InvalidSize);
            }

            buf[..payload_len].copy_from_slice(&self.rx_buf[HEADER_LEN..len]);
            self.stats.frames_received += 1;

            log::debug!("[NET] received {} bytes from {}", payload_len, header.from);

            return Ok((
                payload_len,
                Incoming {
                    from: header.from,
                    to: header.to,
                    rssi: signal.rssi,
                    snr: signal.snr,
                },
            ));
        }
    }
}
