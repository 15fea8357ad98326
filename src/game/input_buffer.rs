//! Lock-free pointer input buffer
//!
//! Uses crossbeam-channel so an input thread can submit pointer samples
//! without blocking; the round drains the channel once per tick.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::util::vec2::Vec2;

/// Pointer sample in screen pixels. `None` means the pointer was released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub screen: Option<Vec2>,
}

/// Lock-free input buffer using a bounded channel
pub struct InputBuffer {
    sender: Sender<PointerInput>,
    receiver: Receiver<PointerInput>,
    capacity: usize,
}

impl InputBuffer {
    /// Create a new input buffer with given capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Create a new sender handle for an input source
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Drain all pending samples and keep only the most recent one
    pub fn latest(&self) -> Option<PointerInput> {
        self.receiver.try_iter().last()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        // A few seconds of 120 Hz pointer events
        Self::new(512)
    }
}

/// Clonable sender handle for input sources
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<PointerInput>,
}

impl InputSender {
    /// Submit a sample (non-blocking)
    #[inline]
    pub fn try_send(&self, screen: Option<Vec2>) -> Result<(), InputBufferError> {
        self.sender
            .try_send(PointerInput { screen })
            .map_err(|e| match e {
                TrySendError::Full(_) => InputBufferError::Full,
                TrySendError::Disconnected(_) => InputBufferError::Disconnected,
            })
    }
}

/// Input buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputBufferError {
    /// Buffer is full (backpressure)
    #[error("input buffer is full")]
    Full,
    /// Round was dropped
    #[error("input buffer disconnected")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_sample_wins() {
        let buffer = InputBuffer::new(10);
        let sender = buffer.sender();
        sender.try_send(Some(Vec2::new(1.0, 1.0))).unwrap();
        sender.try_send(Some(Vec2::new(2.0, 2.0))).unwrap();
        sender.try_send(None).unwrap();
        sender.try_send(Some(Vec2::new(3.0, 3.0))).unwrap();

        assert_eq!(buffer.pending_count(), 4);
        let latest = buffer.latest().unwrap();
        assert_eq!(latest.screen, Some(Vec2::new(3.0, 3.0)));
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_none());
    }

    #[test]
    fn test_release_is_a_sample() {
        let buffer = InputBuffer::new(4);
        let sender = buffer.sender();
        sender.try_send(Some(Vec2::ZERO)).unwrap();
        sender.try_send(None).unwrap();
        assert_eq!(buffer.latest(), Some(PointerInput { screen: None }));
    }

    #[test]
    fn test_backpressure() {
        let buffer = InputBuffer::new(2);
        let sender = buffer.sender();
        assert!(sender.try_send(None).is_ok());
        assert!(sender.try_send(None).is_ok());
        assert_eq!(sender.try_send(None), Err(InputBufferError::Full));

        assert_eq!(buffer.latest(), Some(PointerInput { screen: None }));
        assert!(buffer.is_empty());
        assert!(sender.try_send(None).is_ok());
    }

    #[test]
    fn test_disconnected_after_drop() {
        let buffer = InputBuffer::new(2);
        let sender = buffer.sender();
        drop(buffer);
        assert_eq!(sender.try_send(None), Err(InputBufferError::Disconnected));
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(InputBuffer::default().capacity(), 512);
    }
}
