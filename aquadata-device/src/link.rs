//! Connection lifecycle state and the surface the radio glue plugs into

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Attachment state of the BLE central.
///
/// One flag, flipped only by attach/detach events and read before every
/// emission. Handles are cheap clones over the same flag so the radio glue
/// and the engine observe the same state without a process-wide global.
#[derive(Debug, Clone, Default)]
pub struct LinkState(Arc<AtomicBool>);

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn set_attached(&self, attached: bool) {
        self.0.store(attached, Ordering::Relaxed);
    }
}

/// Outbound notification channel (the TX characteristic).
///
/// Fragmenting a record over the radio MTU is the implementation's
/// concern; the engine hands over one complete record at a time.
pub trait Transmitter {
    /// Error type for notification delivery
    type Error;

    /// Deliver one newline-terminated record to the attached central
    fn notify(&mut self, record: &[u8]) -> Result<(), Self::Error>;
}

/// Time source driving the poll loop and periodic emission.
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;

    /// Block the single execution context for `ms` milliseconds
    fn sleep_ms(&mut self, ms: u32);
}

/// Events the radio glue delivers into the engine.
///
/// One handler object instead of per-callback subclasses: GAP
/// connect/disconnect and writes to the RX characteristic all land here.
/// The platform dispatches callbacks one at a time, so implementations can
/// assume no overlap. After `on_detach` returns, the glue must restart
/// advertising so a central can reattach without a power cycle.
pub trait LinkEvents {
    fn on_attach(&mut self);
    fn on_detach(&mut self);
    fn on_inbound_fragment(&mut self, fragment: &[u8]);
}
