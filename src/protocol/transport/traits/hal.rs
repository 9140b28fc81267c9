//! Hardware abstraction contract of the engine. Lets the library plug into any
//! CAN controller driver, timer peripheral, and application value store.
//!
//! Every method is called from the engine's own execution context (typically
//! an interrupt handler) and must return without blocking. Implementations
//! must not call back into the engine; the `&mut` borrow held by the engine
//! during the call makes that impossible in safe code.
use crate::core::{DataId, Ticks, Value};
use crate::error::{ConfigurationError, HalCallback};
use crate::protocol::transport::frame_header::FrameHeader;

/// Contract between the engine and its host platform.
pub trait TtcanHal {
    /// Push a value onto the bus under the given header. Must complete or
    /// queue the frame before returning.
    fn transmit(&mut self, header: FrameHeader, value: Value);

    /// Request a timer interrupt `ticks` from now.
    fn arm_timer(&mut self, ticks: Ticks);

    /// Fetch the current application value for `data_id`.
    fn read_value(&mut self, data_id: DataId) -> Value;

    /// Deliver a received value to the application.
    fn write_value(&mut self, data_id: DataId, value: Value);
}

impl<H: TtcanHal + ?Sized> TtcanHal for &mut H {
    fn transmit(&mut self, header: FrameHeader, value: Value) {
        (**self).transmit(header, value)
    }

    fn arm_timer(&mut self, ticks: Ticks) {
        (**self).arm_timer(ticks)
    }

    fn read_value(&mut self, data_id: DataId) -> Value {
        (**self).read_value(data_id)
    }

    fn write_value(&mut self, data_id: DataId, value: Value) {
        (**self).write_value(data_id, value)
    }
}

//==================================================================================FN_HAL
/// Transmit callback: header, value, context.
pub type TransmitFn<C> = fn(FrameHeader, Value, &mut C);
/// Timer callback: ticks until the interrupt, context.
pub type ArmTimerFn<C> = fn(Ticks, &mut C);
/// Value source callback: data identifier, context.
pub type ReadValueFn<C> = fn(DataId, &mut C) -> Value;
/// Value sink callback: data identifier, value, context.
pub type WriteValueFn<C> = fn(DataId, Value, &mut C);

/// [`TtcanHal`] assembled from four plain function pointers and a context
/// value handed to each of them.
///
/// Suited to board support code written as free functions. The context is
/// owned by the adapter and reachable through [`FnHal::context`].
pub struct FnHal<C> {
    transmit: TransmitFn<C>,
    arm_timer: ArmTimerFn<C>,
    read_value: ReadValueFn<C>,
    write_value: WriteValueFn<C>,
    context: C,
}

impl<C> FnHal<C> {
    /// Bind the four callbacks. Every binding is mandatory: a missing one is
    /// reported instead of being replaced by a no-op.
    pub fn new(
        transmit: Option<TransmitFn<C>>,
        arm_timer: Option<ArmTimerFn<C>>,
        read_value: Option<ReadValueFn<C>>,
        write_value: Option<WriteValueFn<C>>,
        context: C,
    ) -> Result<Self, ConfigurationError> {
        let missing = ConfigurationError::MissingCallback;
        Ok(Self {
            transmit: transmit.ok_or(missing(HalCallback::Transmit))?,
            arm_timer: arm_timer.ok_or(missing(HalCallback::ArmTimer))?,
            read_value: read_value.ok_or(missing(HalCallback::ReadValue))?,
            write_value: write_value.ok_or(missing(HalCallback::WriteValue))?,
            context,
        })
    }

    /// Shared access to the context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Exclusive access to the context.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Give the context back.
    pub fn into_context(self) -> C {
        self.context
    }
}

impl<C> TtcanHal for FnHal<C> {
    fn transmit(&mut self, header: FrameHeader, value: Value) {
        (self.transmit)(header, value, &mut self.context)
    }

    fn arm_timer(&mut self, ticks: Ticks) {
        (self.arm_timer)(ticks, &mut self.context)
    }

    fn read_value(&mut self, data_id: DataId) -> Value {
        (self.read_value)(data_id, &mut self.context)
    }

    fn write_value(&mut self, data_id: DataId, value: Value) {
        (self.write_value)(data_id, value, &mut self.context)
    }
}
