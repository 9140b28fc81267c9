//! Full schedule cycles of a callback-driven node: slot order, ownership,
//! start-of-schedule marking and frame timing.
use gttcan::core::{is_start_of_schedule, network_time, DataId, Ticks, Value};
use gttcan::error::ScheduleError;
use gttcan::protocol::engine::{Engine, EngineConfig};
use gttcan::protocol::schedule::{ScheduleEntry, ScheduleTable};
use gttcan::protocol::transport::can_frame::{frame_fits_slot, TtFrame};
use gttcan::protocol::transport::frame_header::{FrameHeader, MAX_DATA_ID};
use gttcan::protocol::transport::traits::hal::{
    ArmTimerFn, FnHal, ReadValueFn, TransmitFn, WriteValueFn,
};
use gttcan::protocol::transport::TICKS_PER_BIT_1MBIT;

const SLOT: Ticks = 2_000;
const MASTER: u8 = 1;

/// Board support state reached by the callbacks.
#[derive(Default)]
struct Board {
    sent: Vec<(FrameHeader, Value)>,
    armed: Vec<Ticks>,
    received: Vec<(DataId, Value)>,
}

fn transmit(header: FrameHeader, value: Value, board: &mut Board) {
    board.sent.push((header, value));
}

fn arm_timer(ticks: Ticks, board: &mut Board) {
    board.armed.push(ticks);
}

fn read_value(data_id: DataId, _: &mut Board) -> Value {
    data_id as Value * 100
}

fn write_value(data_id: DataId, value: Value, board: &mut Board) {
    board.received.push((data_id, value));
}

/// Five slots: master owns 0, 1 and 4, slot 2 is free, slot 3 belongs to node 5.
fn five_slot_table() -> ScheduleTable<8> {
    let mut table = ScheduleTable::new();
    for entry in [
        ScheduleEntry::reference(MASTER, 1),
        ScheduleEntry::data(MASTER, 2),
        ScheduleEntry::free(),
        ScheduleEntry::data(5, 3),
        ScheduleEntry::data(MASTER, 4),
    ] {
        table.push(entry).expect("table has room");
    }
    table
}

fn node(node_id: u8, table: &[ScheduleEntry]) -> Engine<'_, FnHal<Board>> {
    let config = EngineConfig::new(node_id, SLOT, table.len() as u16);
    Engine::with_callbacks(
        config,
        table,
        Some(transmit as TransmitFn<Board>),
        Some(arm_timer as ArmTimerFn<Board>),
        Some(read_value as ReadValueFn<Board>),
        Some(write_value as WriteValueFn<Board>),
        Board::default(),
    )
    .expect("valid node")
}

#[test]
/// Two cycles send exactly the owned slots, in order, once each.
fn master_sends_owned_slots_in_order() {
    let table = five_slot_table();
    let mut master = node(MASTER, table.as_slice());
    master.start();
    for _ in 0..10 {
        master.on_slot_timer();
    }

    let board = master.hal().context();
    let slots: Vec<u32> = board.sent.iter().map(|(h, _)| h.slot_index()).collect();
    assert_eq!(slots, [0, 1, 4, 0, 1, 4, 0]);
    for (header, value) in &board.sent {
        let expected_sos = header.slot_index() == 0;
        assert_eq!(is_start_of_schedule(*value), expected_sos);
        assert_eq!(network_time(*value), header.data_id() as Value * 100);
    }
    // No reference was heard: every boundary is nominal.
    assert_eq!(board.armed.len(), 11);
    assert!(board.armed.iter().all(|&ticks| ticks == SLOT));
    assert!(board.received.is_empty());
}

#[test]
/// A node that owns nothing never reads nor transmits.
fn listener_never_transmits() {
    let table = five_slot_table();
    let mut listener = node(9, table.as_slice());
    assert!(listener.local_schedule().is_empty());
    assert_eq!(listener.ticks_until_next_transmission(), None);
    listener.start();
    for _ in 0..7 {
        listener.on_slot_timer();
    }
    assert!(listener.hal().context().sent.is_empty());
}

#[test]
/// Distance to the next owned slot follows the cycle and wraps.
fn next_transmission_follows_cycle() {
    let table = five_slot_table();
    let mut peer = node(5, table.as_slice());
    let mut distances = Vec::new();
    for _ in 0..5 {
        distances.push(peer.ticks_until_next_transmission());
        peer.advance_slot();
    }
    let slot = SLOT as u64;
    assert_eq!(
        distances,
        [
            Some(3 * slot),
            Some(2 * slot),
            Some(slot),
            Some(5 * slot),
            Some(4 * slot)
        ]
    );
}

#[test]
/// Every frame of a cycle fits its slot at 1 Mbit/s, none would in half a slot.
fn frames_fit_their_slots() {
    let table = five_slot_table();
    let mut master = node(MASTER, table.as_slice());
    master.start();
    for _ in 0..4 {
        master.on_slot_timer();
    }
    for &(header, value) in &master.hal().context().sent {
        let frame = TtFrame::new(header, value);
        assert!(frame_fits_slot(&frame, TICKS_PER_BIT_1MBIT, SLOT));
        assert!(!frame_fits_slot(&frame, TICKS_PER_BIT_1MBIT, SLOT / 2));
    }
}

#[test]
/// The table builder rejects overflow and identifiers wider than the header.
fn table_builder_limits() {
    let full = ScheduleTable::<2>::new()
        .with(ScheduleEntry::data(1, 1))
        .and_then(|t| t.with(ScheduleEntry::data(2, 2)))
        .expect("two entries fit");
    assert_eq!(full.len(), 2);
    assert_eq!(
        full.with(ScheduleEntry::data(3, 3)).map(|t| t.len()),
        Err(ScheduleError::Full { capacity: 2 })
    );

    let mut table = ScheduleTable::<4>::new();
    assert_eq!(
        table.push(ScheduleEntry::data(1, MAX_DATA_ID + 1)),
        Err(ScheduleError::DataIdTooWide {
            data_id: MAX_DATA_ID + 1
        })
    );
    assert!(table.is_empty());
}
