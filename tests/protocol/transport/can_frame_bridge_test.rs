//! Mapping between engine frames and `embedded_can` driver frames.
mod helpers {
    include!("../../helpers/mod.rs");
}

use embedded_can::{ExtendedId, Frame, Id, StandardId};
use gttcan::core::START_OF_SCHEDULE_FLAG;
use gttcan::infra::bits::{calculate_stuffing_bits, EXTENDED_FRAME_OVERHEAD_BITS};
use gttcan::protocol::engine::{Engine, EngineConfig, FrameDisposition};
use gttcan::protocol::schedule::ScheduleEntry;
use gttcan::protocol::transport::can_frame::TtFrame;
use gttcan::protocol::transport::frame_header::FrameHeader;
use helpers::{MockCanFrame, RecordingHal};

#[test]
/// Header becomes the extended identifier, value the little-endian payload.
fn engine_frame_to_driver_frame() {
    let frame = TtFrame::new(FrameHeader::new(3, 0x155), 0x0807_0605_0403_0201);
    let can: MockCanFrame = frame.to_can().expect("header fits 29 bits");

    assert!(can.is_extended());
    assert!(!can.is_remote_frame());
    assert_eq!(
        can.id(),
        Id::Extended(ExtendedId::new((3 << 14) | 0x155).unwrap())
    );
    assert_eq!(can.dlc(), 8);
    assert_eq!(can.data(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(TtFrame::from_can(&can), Some(frame));
}

#[test]
/// Slot indices past the 29-bit identifier range cannot be sent.
fn oversized_header_is_rejected() {
    let frame = TtFrame::new(FrameHeader::new(0x8000, 1), 0);
    assert_eq!(frame.to_can::<MockCanFrame>(), None);
    let frame = TtFrame::new(FrameHeader::new(0x7FFF, 1), 0);
    assert!(frame.to_can::<MockCanFrame>().is_some());
}

#[test]
/// Frames outside the time-triggered schedule are ignored.
fn standard_and_remote_frames_are_ignored() {
    let standard = MockCanFrame::new(StandardId::new(0x123).unwrap(), &[1, 2]).unwrap();
    assert_eq!(TtFrame::from_can(&standard), None);

    let remote = MockCanFrame::new_remote(ExtendedId::new(0x4001).unwrap(), 8).unwrap();
    assert_eq!(TtFrame::from_can(&remote), None);
}

#[test]
/// Short payloads are zero-extended.
fn short_payload_is_zero_extended() {
    let can = MockCanFrame::new(ExtendedId::new(0x4001).unwrap(), &[0xAA, 0xBB]).unwrap();
    let frame = TtFrame::from_can(&can).expect("extended data frame");
    assert_eq!(frame.header.slot_index(), 1);
    assert_eq!(frame.header.data_id(), 1);
    assert_eq!(frame.value, 0xBBAA);
}

#[test]
/// The start-of-schedule flag travels in the last payload byte.
fn start_of_schedule_survives_the_driver() {
    let frame = TtFrame::new(FrameHeader::new(0, 0), START_OF_SCHEDULE_FLAG | 42);
    let can: MockCanFrame = frame.to_can().unwrap();
    assert_eq!(can.data()[7], 0x80);

    static CYCLE: [ScheduleEntry; 2] = [
        ScheduleEntry::reference(1, 0),
        ScheduleEntry::data(2, 1),
    ];
    let config = EngineConfig::new(2, 5_000, 2);
    let mut follower = Engine::new(config, &CYCLE, RecordingHal::default()).unwrap();
    let received = TtFrame::from_can(&can).unwrap();
    assert_eq!(
        follower.process_frame_at(received.header.raw(), received.value, 1_600),
        FrameDisposition::StartOfSchedule { network_time: 42 }
    );
}

#[test]
/// Wire length is the extended overhead, the payload and its stuff bits.
fn wire_bits_include_stuffing() {
    let value = 0u64;
    let frame = TtFrame::new(FrameHeader::new(1, 1), value);
    let stuffing = calculate_stuffing_bits(&value.to_le_bytes());
    assert_eq!(stuffing, 12);
    assert_eq!(frame.wire_bits(), EXTENDED_FRAME_OVERHEAD_BITS + 64 + 12);
    assert_eq!(frame.transmission_ticks(10), frame.wire_bits() * 10);
}
