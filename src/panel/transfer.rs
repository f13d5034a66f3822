use std::sync::mpsc::{self, Receiver, SyncSender};

use crate::foundation::error::{WarholError, WarholResult};

/// Number of transfer buffers cycling between painter and transport.
pub const TRANSFER_BUFFERS: usize = 2;

/// Band-sized staging buffer handed to the panel transport.
#[derive(Debug)]
pub struct TransferBuffer {
    index: u8,
    bytes: Box<[u8]>,
    len: usize,
}

impl TransferBuffer {
    /// Allocate a zeroed buffer of `capacity` bytes.
    pub fn allocate(index: u8, capacity: usize) -> WarholResult<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|e| WarholError::allocation(format!("transfer buffer of {capacity} bytes: {e}")))?;
        bytes.resize(capacity, 0);
        Ok(Self {
            index,
            bytes: bytes.into_boxed_slice(),
            len: 0,
        })
    }

    /// Which of the buffers this is.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Maximum payload.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Payload written by the last [`TransferBuffer::prepare`].
    pub fn filled(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Mark `len` bytes as payload and return them for writing.
    pub fn prepare(&mut self, len: usize) -> WarholResult<&mut [u8]> {
        if len > self.bytes.len() {
            return Err(WarholError::validation(format!(
                "band of {len} bytes exceeds transfer buffer of {}",
                self.bytes.len()
            )));
        }
        self.len = len;
        Ok(&mut self.bytes[..len])
    }
}

/// Completion signal a transport fires when it is done reading a buffer.
///
/// Safe to call from any thread, including an interrupt-style callback: it never blocks and
/// never allocates.
#[derive(Clone, Debug)]
pub struct FlushCompletion {
    tx: SyncSender<TransferBuffer>,
}

impl FlushCompletion {
    pub(crate) fn channel() -> (Self, Receiver<TransferBuffer>) {
        let (tx, rx) = mpsc::sync_channel(TRANSFER_BUFFERS);
        (Self { tx }, rx)
    }

    /// Return `buffer` to the painter.
    pub fn notify(&self, buffer: TransferBuffer) {
        if let Err(e) = self.tx.try_send(buffer) {
            tracing::error!(error = %e, "transfer completion dropped");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/panel/transfer.rs"]
mod tests;
