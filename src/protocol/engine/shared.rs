//! Single mutual-exclusion boundary around an [`Engine`] for targets where the
//! timer and receive handlers may preempt each other.
//!
//! The whole engine sits behind one lock; no operation takes a finer one.
//! Pick the raw mutex to match the execution contexts:
//! `CriticalSectionRawMutex` across interrupts and threads,
//! `NoopRawMutex` when everything already runs at one priority.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::core::{Ticks, Value};
use crate::protocol::engine::{Engine, FrameDisposition};
use crate::protocol::transport::traits::hal::TtcanHal;

/// Engine shared between execution contexts.
///
/// HAL callbacks run while the lock is held and must not lock the same
/// engine again.
pub struct SharedEngine<'s, M: RawMutex, H: TtcanHal> {
    inner: Mutex<M, RefCell<Engine<'s, H>>>,
}

impl<'s, M: RawMutex, H: TtcanHal> SharedEngine<'s, M, H> {
    pub fn new(engine: Engine<'s, H>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Engine<'s, H>) -> R) -> R {
        self.inner.lock(|cell| {
            let mut engine = cell.borrow_mut();
            f(&mut engine)
        })
    }

    /// Receive-interrupt entry point.
    pub fn process_frame_at(
        &self,
        header: u32,
        payload: Value,
        raw_ticks: Ticks,
    ) -> FrameDisposition {
        self.lock(|engine| engine.process_frame_at(header, payload, raw_ticks))
    }

    /// Timer-interrupt entry point.
    pub fn on_slot_timer(&self) {
        self.lock(|engine| engine.on_slot_timer())
    }

    pub fn start(&self) {
        self.lock(|engine| engine.start())
    }

    pub fn is_active(&self) -> bool {
        self.lock(|engine| engine.is_active())
    }

    pub fn clock_correction(&self) -> i32 {
        self.lock(|engine| engine.clock_correction())
    }

    /// Give the engine back.
    pub fn into_inner(self) -> Engine<'s, H> {
        self.inner.into_inner().into_inner()
    }
}
