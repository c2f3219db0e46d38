//! One-shot effect channel between a controller and its view.
//!
//! # Invariants
//! - At most one live receiver; `subscribe` detaches the previous one.
//! - Effects emitted while nobody listens are dropped, never replayed.
//! - Each effect is delivered at most once.

use futures::Stream;
use log::{debug, warn};
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Default queue depth per subscriber.
pub const DEFAULT_EFFECT_BUFFER: usize = 64;

/// Producer half, owned by a controller.
pub struct EffectSender<E> {
    name: &'static str,
    capacity: usize,
    slot: Mutex<Option<mpsc::Sender<E>>>,
}

impl<E> EffectSender<E> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            slot: Mutex::new(None),
        }
    }

    /// Attaches a fresh receiver, detaching any earlier one.
    pub fn subscribe(&self) -> EffectReceiver<E> {
        let (tx, rx) = mpsc::channel(self.capacity);
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        EffectReceiver { rx }
    }

    /// Delivers `effect` to the live receiver. Returns `false` if dropped.
    pub fn emit(&self, effect: E) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = slot.as_ref() else {
            debug!(
                "event=effect_dropped module=controller controller={} reason=no_subscriber",
                self.name
            );
            return false;
        };
        match tx.try_send(effect) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    "event=effect_dropped module=controller controller={} reason=buffer_full",
                    self.name
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                *slot = None;
                debug!(
                    "event=effect_dropped module=controller controller={} reason=subscriber_gone",
                    self.name
                );
                false
            }
        }
    }

    /// Detaches the receiver; it sees end-of-stream after draining.
    pub fn close(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Consumer half, held by the view.
pub struct EffectReceiver<E> {
    rx: mpsc::Receiver<E>,
}

impl<E> EffectReceiver<E> {
    /// Next effect, or `None` once detached or the controller is gone.
    pub async fn recv(&mut self) -> Option<E> {
        self.rx.recv().await
    }

    /// Next already-queued effect, without waiting.
    pub fn try_recv(&mut self) -> Option<E> {
        self.rx.try_recv().ok()
    }
}

impl<E> Stream for EffectReceiver<E> {
    type Item = E;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
