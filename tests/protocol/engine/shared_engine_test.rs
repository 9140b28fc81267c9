//! Timer and receive handlers running concurrently against one engine behind
//! a critical-section mutex.
mod helpers {
    include!("../../helpers/mod.rs");
}

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
use gttcan::core::{Ticks, Value};
use gttcan::protocol::engine::shared::SharedEngine;
use gttcan::protocol::engine::{Engine, EngineConfig, FrameDisposition};
use gttcan::protocol::schedule::ScheduleEntry;
use gttcan::protocol::transport::frame_header::FrameHeader;
use helpers::RecordingHal;
use static_cell::StaticCell;

const SLOT: Ticks = 10_000;
const BOUNDARIES: usize = 12;
const PEER_FRAMES: u64 = 20;

/// Slot 0: local time master, slot 1: peer data, slot 2: local data, slot 3: peer data.
static CYCLE: [ScheduleEntry; 4] = [
    ScheduleEntry::reference(1, 0),
    ScheduleEntry::data(2, 21),
    ScheduleEntry::data(1, 22),
    ScheduleEntry::data(2, 23),
];

type SharedNode = SharedEngine<'static, CriticalSectionRawMutex, RecordingHal>;

static NODE: StaticCell<SharedNode> = StaticCell::new();

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
/// Interleaved slot timers and receptions leave the engine consistent.
async fn timer_and_receive_handlers_share_engine() {
    let hal = RecordingHal::with_values(&[(0, 1), (22, 2)]);
    let engine = Engine::new(EngineConfig::new(1, SLOT, 4), &CYCLE, hal).expect("valid node");
    let node: &'static SharedNode = NODE.init(SharedEngine::new(engine));

    node.start();
    assert!(node.is_active());

    let timer = tokio::spawn(async move {
        for _ in 0..BOUNDARIES {
            node.on_slot_timer();
            tokio::task::yield_now().await;
        }
    });

    let receiver = tokio::spawn(async move {
        for value in 0..PEER_FRAMES {
            // Far outside the cycle: always delivered as data.
            let header = FrameHeader::new(300, 23).raw();
            let disposition = node.process_frame_at(header, value as Value, 5_000);
            assert_eq!(disposition, FrameDisposition::Data { data_id: 23 });
            tokio::task::yield_now().await;
        }
    });

    timer.await.expect("timer task");
    receiver.await.expect("receive task");

    node.lock(|engine| {
        assert_eq!(engine.schedule_index() as usize, BOUNDARIES % 4);
        let hal = engine.hal();
        // Slot 0 and slot 2 of three full cycles, plus the starting slot 0.
        assert_eq!(hal.sent.len(), 1 + 2 * (BOUNDARIES / 4));
        assert_eq!(hal.armed.len(), 1 + BOUNDARIES);
        assert_eq!(hal.received.len(), PEER_FRAMES as usize);
        let values: Vec<Value> = hal.received.iter().map(|&(_, v)| v).collect();
        assert_eq!(values, (0..PEER_FRAMES).collect::<Vec<_>>());
    });
    assert_eq!(node.clock_correction(), 0);
}

#[test]
/// Single-context use: the lock is a no-op and the engine can be recovered.
fn noop_mutex_round_trip() {
    let engine = Engine::new(
        EngineConfig::new(2, SLOT, 4),
        &CYCLE,
        RecordingHal::default(),
    )
    .expect("valid node");
    let shared: SharedEngine<'_, NoopRawMutex, _> = SharedEngine::new(engine);

    let sos = FrameHeader::new(0, 0).raw();
    let disposition = shared.process_frame_at(sos, 1 << 63, 2_000);
    assert_eq!(
        disposition,
        FrameDisposition::StartOfSchedule { network_time: 0 }
    );
    shared.on_slot_timer();

    let engine = shared.into_inner();
    assert!(engine.is_active());
    assert_eq!(engine.schedule_index(), 1);
    // Slot 1 is owned by node 2: sent from the timer handler.
    assert_eq!(engine.hal().sent.len(), 1);
}
