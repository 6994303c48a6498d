// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory radio medium for development and testing.
//!
//! [`MemoryMedium`] models a shared radio channel: every frame transmitted
//! by one endpoint is delivered to every *other* endpoint, like an open
//! band. A sender does not hear its own transmission. Endpoints report a
//! fixed, configurable RSSI/SNR.

use super::{LinkDriver, SignalQuality, MAX_LINK_FRAME};
use crate::error::{Error, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

struct MediumInner {
    endpoints: Vec<(usize, Sender<Vec<u8>>)>,
    next_id: usize,
}

/// Shared in-process radio channel.
///
/// Clone-free: hand out endpoints with [`MemoryMedium::endpoint`], each of
/// which can be moved to its own thread.
pub struct MemoryMedium {
    inner: Arc<Mutex<MediumInner>>,
    mtu: usize,
    signal: SignalQuality,
}

impl MemoryMedium {
    /// Create a medium with the typical LoRa frame limit (255 bytes).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MediumInner {
                endpoints: Vec::new(),
                next_id: 0,
            })),
            mtu: MAX_LINK_FRAME,
            signal: SignalQuality { rssi: -60, snr: 9 },
        }
    }

    /// Override the advertised MTU (clamped to `MAX_LINK_FRAME`).
    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu.min(MAX_LINK_FRAME);
        self
    }

    /// Override the signal quality reported for every reception.
    pub fn with_signal(mut self, signal: SignalQuality) -> Self {
        self.signal = signal;
        self
    }

    /// Mint a new endpoint attached to this medium.
    pub fn endpoint(&self) -> MemoryLink {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.endpoints.push((id, tx));

        MemoryLink {
            id,
            medium: Arc::clone(&self.inner),
            rx,
            mtu: self.mtu,
            signal: self.signal,
        }
    }
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

/// One radio attached to a [`MemoryMedium`].
pub struct MemoryLink {
    id: usize,
    medium: Arc<Mutex<MediumInner>>,
    rx: Receiver<Vec<u8>>,
    mtu: usize,
    signal: SignalQuality,
}

impl LinkDriver for MemoryLink {
    fn mtu(&self) -> usize {
        self.mtu
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() > self.mtu {
            return Err(Error::InvalidSize);
        }

        let mut inner = self.medium.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop endpoints whose receiver is gone while delivering
        let own_id = self.id;
        inner
            .endpoints
            .retain(|(id, tx)| *id == own_id || tx.send(frame.to_vec()).is_ok());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<(usize, SignalQuality)> {
        let frame = match timeout {
            Some(deadline) => self.rx.recv_timeout(deadline).map_err(|err| match err {
                RecvTimeoutError::Timeout => Error::Timeout,
                RecvTimeoutError::Disconnected => Error::Link(-1),
            })?,
            None => self.rx.recv().map_err(|_| Error::Link(-1))?,
        };

        if frame.len() > buf.len() {
            return Err(Error::InvalidSize);
        }

        buf[..frame.len()].copy_from_slice(&frame);
        Ok((frame.len(), self.signal))
    }
}
