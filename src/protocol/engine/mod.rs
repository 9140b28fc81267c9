//! Per-node time-triggered engine: schedule state machine, frame processing
//! and transmission, and the clock synchronisation fed by reference frames.
//!
//! The engine never waits and never allocates. A host scheduler drives it:
//!
//! * the timer interrupt calls [`Engine::on_slot_timer`] at every slot boundary
//!   (or the finer-grained [`Engine::advance_slot`] / [`Engine::transmit_next_frame`]);
//! * the receive interrupt latches the arrival time and calls
//!   [`Engine::process_frame_at`] (or [`Engine::record_action_time`] followed by
//!   [`Engine::process_frame`]).
//!
//! Both paths must be serialised by the caller, for instance by running them
//! in the same interrupt priority or through [`shared::SharedEngine`].
pub mod shared;

use embassy_time::Duration;

use crate::core::{
    is_start_of_schedule, network_time, DataId, NodeId, Ticks, Value, MAX_SLOTS, NTU_NANOS,
    START_OF_SCHEDULE_FLAG, UNASSIGNED_NODE,
};
use crate::error::ConfigurationError;
use crate::protocol::schedule::{LocalSchedule, ScheduleEntry};
use crate::protocol::sync::{accumulator::ErrorAccumulator, ClockSync};
use crate::protocol::transport::frame_header::{FrameHeader, MAX_DATA_ID};
use crate::protocol::transport::traits::hal::{
    ArmTimerFn, FnHal, ReadValueFn, TransmitFn, TtcanHal, WriteValueFn,
};
use crate::protocol::transport::DEFAULT_FRAME_OFFSET_TICKS;

//==================================================================================ENGINE_CONFIG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Identity and timing parameters of a node, fixed for the engine's lifetime.
pub struct EngineConfig {
    /// Identifier of this node in the schedule.
    pub local_node_id: NodeId,
    /// Nominal slot length in ticks.
    pub slot_duration: Ticks,
    /// Number of slots in one schedule cycle.
    pub schedule_length: u16,
    /// Delay between the start of a frame on the bus and the latch of its
    /// arrival, removed by [`Engine::latch_arrival`].
    pub frame_offset: Ticks,
}

impl EngineConfig {
    /// Configuration with the default frame offset.
    pub const fn new(local_node_id: NodeId, slot_duration: Ticks, schedule_length: u16) -> Self {
        Self {
            local_node_id,
            slot_duration,
            schedule_length,
            frame_offset: DEFAULT_FRAME_OFFSET_TICKS,
        }
    }

    /// Override the frame offset (see [`DEFAULT_FRAME_OFFSET_TICKS`]).
    pub const fn with_frame_offset(mut self, frame_offset: Ticks) -> Self {
        self.frame_offset = frame_offset;
        self
    }

    /// Check the node identity and timing parameters.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.local_node_id == UNASSIGNED_NODE {
            return Err(ConfigurationError::UnassignedNodeId);
        }
        if self.slot_duration == 0 {
            return Err(ConfigurationError::ZeroSlotDuration);
        }
        if self.schedule_length == 0 {
            return Err(ConfigurationError::EmptySchedule);
        }
        if self.schedule_length as usize > MAX_SLOTS {
            return Err(ConfigurationError::ScheduleTooLong {
                length: self.schedule_length,
                max: MAX_SLOTS,
            });
        }
        Ok(())
    }

    /// Ticks in one full schedule cycle.
    pub const fn cycle_ticks(&self) -> u64 {
        self.slot_duration as u64 * self.schedule_length as u64
    }

    /// Slot length as wall-clock time, assuming network time unit ticks.
    pub fn slot_period(&self) -> Duration {
        Duration::from_nanos(self.slot_duration as u64 * NTU_NANOS)
    }
}

//==================================================================================FRAME_DISPOSITION
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// What [`Engine::process_frame`] did with a frame.
pub enum FrameDisposition {
    /// Reference frame of the current slot; its deviation was accumulated.
    Reference { slot_index: u16, deviation: i32 },
    /// Start-of-schedule frame that brought an inactive node into the cycle.
    /// `network_time` is the value as sent, without the frame offset.
    StartOfSchedule { network_time: Value },
    /// Data frame handed to the application.
    Data { data_id: DataId },
}

//==================================================================================ENGINE
/// Time-triggered protocol engine of one node.
pub struct Engine<'s, H: TtcanHal> {
    config: EngineConfig,
    /// Slot-indexed table, exactly `schedule_length` entries.
    schedule: &'s [ScheduleEntry],
    local_schedule: LocalSchedule,
    local_schedule_index: u16,
    is_active: bool,
    transmitted: bool,
    action_time: Ticks,
    sync: ClockSync,
    hal: H,
}

impl<'s, C> Engine<'s, FnHal<C>> {
    /// Build an engine from four optional callbacks and their shared context.
    /// Any missing callback fails the construction.
    #[allow(clippy::too_many_arguments)]
    pub fn with_callbacks(
        config: EngineConfig,
        schedule: &'s [ScheduleEntry],
        transmit: Option<TransmitFn<C>>,
        arm_timer: Option<ArmTimerFn<C>>,
        read_value: Option<ReadValueFn<C>>,
        write_value: Option<WriteValueFn<C>>,
        context: C,
    ) -> Result<Self, ConfigurationError> {
        let hal = FnHal::new(transmit, arm_timer, read_value, write_value, context)?;
        Self::new(config, schedule, hal)
    }
}

impl<'s, H: TtcanHal> Engine<'s, H> {
    /// Bind a configuration, a schedule and a HAL.
    ///
    /// The engine starts inactive, at slot 0, with an empty synchronisation
    /// round. Nothing is sent and no timer is armed. Every entry within the
    /// cycle must carry a data identifier that fits the frame header.
    pub fn new(
        config: EngineConfig,
        schedule: &'s [ScheduleEntry],
        hal: H,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let length = config.schedule_length as usize;
        let schedule = schedule
            .get(..length)
            .ok_or(ConfigurationError::ScheduleTableTooShort {
                length: config.schedule_length,
                available: schedule.len(),
            })?;
        if let Some((slot, entry)) = schedule
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.data_id > MAX_DATA_ID)
        {
            return Err(ConfigurationError::DataIdTooWide {
                slot: slot as u16,
                data_id: entry.data_id,
            });
        }

        Ok(Self {
            config,
            schedule,
            local_schedule: LocalSchedule::derive(schedule, config.local_node_id),
            local_schedule_index: 0,
            is_active: false,
            transmitted: false,
            action_time: 0,
            sync: ClockSync::new(),
            hal,
        })
    }

    //==================================================================================ACCESSORS
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn local_node_id(&self) -> NodeId {
        self.config.local_node_id
    }

    pub fn slot_duration(&self) -> Ticks {
        self.config.slot_duration
    }

    pub fn schedule_length(&self) -> u16 {
        self.config.schedule_length
    }

    /// Current slot within the cycle.
    pub fn schedule_index(&self) -> u16 {
        self.local_schedule_index
    }

    pub fn schedule(&self) -> &'s [ScheduleEntry] {
        self.schedule
    }

    pub fn local_schedule(&self) -> &LocalSchedule {
        &self.local_schedule
    }

    /// Whether the node may transmit.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Whether the current slot's frame has already been sent.
    pub fn has_transmitted(&self) -> bool {
        self.transmitted
    }

    pub fn action_time(&self) -> Ticks {
        self.action_time
    }

    pub fn accumulator(&self) -> &ErrorAccumulator {
        self.sync.accumulator()
    }

    pub fn clock_sync(&self) -> &ClockSync {
        &self.sync
    }

    pub fn clock_sync_mut(&mut self) -> &mut ClockSync {
        &mut self.sync
    }

    /// Last FTA correction in ticks.
    pub fn clock_correction(&self) -> i32 {
        self.sync.correction()
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn into_hal(self) -> H {
        self.hal
    }

    /// Ticks from the start of the current slot to the start of the next slot
    /// this node owns, `None` when it owns none.
    pub fn ticks_until_next_transmission(&self) -> Option<u64> {
        self.local_schedule
            .slots_until_next_owned(self.local_schedule_index, self.config.schedule_length)
            .map(|slots| slots as u64 * self.config.slot_duration as u64)
    }

    //==================================================================================SYNCHRONISATION
    /// Record one deviation in the current round.
    pub fn accumulate(&mut self, deviation: i32) {
        self.sync.accumulate(deviation);
    }

    /// Close the current round and return its fault-tolerant average.
    pub fn evaluate(&mut self) -> i32 {
        self.sync.evaluate()
    }

    /// Store an arrival time already corrected for the frame offset: ticks
    /// elapsed on the local timer between the previous slot boundary and the
    /// start of the received frame.
    pub fn record_action_time(&mut self, ticks: Ticks) {
        self.action_time = ticks;
    }

    /// Store a raw latched arrival time, removing the configured frame offset.
    pub fn latch_arrival(&mut self, raw_ticks: Ticks) {
        self.action_time = raw_ticks.saturating_sub(self.config.frame_offset);
    }

    //==================================================================================RX_PATH
    /// Latch the arrival of a frame and process it.
    pub fn process_frame_at(
        &mut self,
        header: u32,
        payload: Value,
        raw_ticks: Ticks,
    ) -> FrameDisposition {
        self.latch_arrival(raw_ticks);
        self.process_frame(header, payload)
    }

    /// Interpret one frame observed on the bus.
    ///
    /// * An inactive node receiving a start-of-schedule frame in slot 0 joins
    ///   the cycle.
    /// * The reference frame of the current slot contributes
    ///   `slot_duration - action_time` to the synchronisation round.
    /// * Both deliver the network time they carry, advanced by the frame
    ///   offset, under the reference slot's data identifier.
    /// * Any other frame, including one whose slot index lies outside the
    ///   schedule, is delivered to the application.
    pub fn process_frame(&mut self, header: u32, payload: Value) -> FrameDisposition {
        let header = FrameHeader(header);
        let slot_index = header.slot_index();

        if !self.is_active
            && slot_index == 0
            && is_start_of_schedule(payload)
            && self.is_peer_reference(0)
        {
            return self.join_schedule(payload);
        }

        if slot_index == self.local_schedule_index as u32 && self.is_peer_reference(slot_index) {
            let deviation = self.deviation();
            #[cfg(feature = "defmt")]
            defmt::trace!(
                "Reference frame slot {}: deviation {} ticks",
                slot_index,
                deviation
            );
            self.sync.accumulate(deviation);
            self.deliver_network_time(slot_index as usize, payload);
            return FrameDisposition::Reference {
                slot_index: self.local_schedule_index,
                deviation,
            };
        }

        let data_id = header.data_id();
        #[cfg(feature = "defmt")]
        defmt::trace!("Data frame slot {}: data id {}", slot_index, data_id);
        self.hal.write_value(data_id, payload);
        FrameDisposition::Data { data_id }
    }

    /// Slot within the schedule whose frame is a reference sent by a peer.
    fn is_peer_reference(&self, slot_index: u32) -> bool {
        let local = self.config.local_node_id;
        usize::try_from(slot_index)
            .ok()
            .and_then(|index| self.schedule.get(index))
            .is_some_and(|entry| entry.is_reference && !entry.is_free() && !entry.is_owned_by(local))
    }

    /// Hand the time carried by a reference frame to the application. The
    /// frame offset covers the time the frame spent on the bus.
    fn deliver_network_time(&mut self, slot_index: usize, payload: Value) {
        let Some(entry) = self.schedule.get(slot_index) else {
            return;
        };
        let time = network_time(payload.wrapping_add(self.config.frame_offset as Value));
        self.hal.write_value(entry.data_id, time);
    }

    /// Expected minus observed arrival, positive when the frame came early.
    fn deviation(&self) -> i32 {
        let deviation = self.config.slot_duration as i64 - self.action_time as i64;
        deviation.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Align an unsynchronised node on a start-of-schedule frame: slot 0 is in
    /// progress, so the next boundary is the rest of that slot away.
    fn join_schedule(&mut self, payload: Value) -> FrameDisposition {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "Start of schedule received, node {} joins the cycle",
            self.config.local_node_id
        );
        self.is_active = true;
        self.local_schedule_index = 0;
        self.transmitted = false;
        self.sync = ClockSync::new();
        let remaining = self
            .config
            .slot_duration
            .saturating_sub(self.config.frame_offset)
            .max(1);
        self.hal.arm_timer(remaining);
        self.deliver_network_time(0, payload);
        FrameDisposition::StartOfSchedule {
            network_time: network_time(payload),
        }
    }

    //==================================================================================TX_PATH
    /// Send the current slot's frame if this node owns the slot.
    ///
    /// Does nothing while inactive, in slots owned by others, or when the
    /// slot's frame was already sent. Returns `true` when a frame was handed
    /// to the HAL.
    pub fn transmit_next_frame(&mut self) -> bool {
        if !self.is_active || self.transmitted {
            return false;
        }
        let index = self.local_schedule_index;
        let Some(entry) = self.schedule.get(index as usize).copied() else {
            return false;
        };
        if !entry.is_owned_by(self.config.local_node_id) {
            return false;
        }

        let mut value = self.hal.read_value(entry.data_id);
        if index == 0 && entry.is_reference {
            // Time master announcing the start of the cycle.
            value |= START_OF_SCHEDULE_FLAG;
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("Transmit slot {}: data id {}", index, entry.data_id);
        self.hal.transmit(FrameHeader::new(index, entry.data_id), value);
        self.transmitted = true;
        true
    }

    //==================================================================================SCHEDULE
    /// Move to the next slot. Returns `true` when the cycle wrapped to slot 0.
    pub fn advance_slot(&mut self) -> bool {
        self.local_schedule_index = (self.local_schedule_index + 1) % self.config.schedule_length;
        self.transmitted = false;
        self.local_schedule_index == 0
    }

    /// Slot boundary handler for the timer interrupt.
    ///
    /// Arms the next boundary, applying any pending FTA correction once, moves
    /// to the next slot, closes the synchronisation round when the cycle
    /// wraps, and transmits if the new slot is owned.
    pub fn on_slot_timer(&mut self) {
        let correction = self.sync.take_pending_correction();
        let ticks = (self.config.slot_duration as i64 - correction as i64)
            .clamp(1, Ticks::MAX as i64) as Ticks;
        self.hal.arm_timer(ticks);

        if self.advance_slot() {
            self.sync.evaluate();
        }
        self.transmit_next_frame();
    }

    /// Start the cycle as time master: activate, go to slot 0, arm the end of
    /// the slot and send slot 0 if owned.
    pub fn start(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::info!("Node {} starts the schedule", self.config.local_node_id);
        self.local_schedule_index = 0;
        self.is_active = true;
        self.transmitted = false;
        self.hal.arm_timer(self.config.slot_duration);
        self.transmit_next_frame();
    }

    /// Stop transmitting until the next start or start-of-schedule frame.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
