//! Property tests: random host activity never breaks pool bookkeeping.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use audiopool_audio::{AudioPoolManager, SimulatedHost};
use audiopool_core::{Platform, PoolConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Play(u8),
    Tick(u16),
    Fail(usize),
    StopAll,
    Pump,
    PauseBgm,
    InterruptEnd,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u8>().prop_map(Op::Play),
        2 => (1u16..1500).prop_map(Op::Tick),
        1 => any::<usize>().prop_map(Op::Fail),
        1 => Just(Op::StopAll),
        3 => Just(Op::Pump),
        1 => Just(Op::PauseBgm),
        1 => Just(Op::InterruptEnd),
    ]
}

proptest! {
    #[test]
    fn prop_pool_stays_partitioned(
        max in 2usize..8,
        ops in prop::collection::vec(op(), 1..80),
    ) {
        let host = SimulatedHost::new(Platform::Unknown)
            .with_clip_length(Duration::from_millis(700));
        let mut manager = AudioPoolManager::new(host.clone(), PoolConfig::new(max)).unwrap();
        manager.play_bgm_default("theme.mp3");
        let capacity = manager.capacity();

        for op in ops {
            match op {
                Op::Play(clip) => {
                    manager.play_effect(&format!("clip{clip}.mp3")).unwrap();
                }
                Op::Tick(millis) => host.tick(Duration::from_millis(u64::from(millis))),
                Op::Fail(pick) => {
                    let channels = manager.channels();
                    host.fail(channels[pick % channels.len()], "injected");
                }
                Op::StopAll => manager.stop_all_effects(),
                Op::Pump => {
                    manager.pump_events();
                }
                Op::PauseBgm => manager.pause_bgm(),
                Op::InterruptEnd => host.interrupt_end(),
            }

            prop_assert_eq!(manager.pool_len(), capacity);
            prop_assert_eq!(
                manager.idle_count() + manager.in_flight().len(),
                manager.pool_len()
            );
            if let Err(violation) = manager.check_invariants() {
                return Err(TestCaseError::fail(violation));
            }
        }

        manager.pump_events();
        prop_assert_eq!(host.live(), capacity + 1);
    }

    #[test]
    fn prop_full_pool_evicts_oldest(max in 2usize..8, extra in 1usize..10) {
        let host = SimulatedHost::new(Platform::Unknown);
        let mut manager = AudioPoolManager::new(host, PoolConfig::new(max)).unwrap();
        let capacity = manager.capacity();

        let mut started = Vec::new();
        for i in 0..capacity {
            started.push(manager.play_effect(&format!("fill{i}")).unwrap());
        }

        for i in 0..extra {
            let expected = manager.in_flight()[0];
            let got = manager.play_effect(&format!("extra{i}")).unwrap();
            prop_assert_eq!(got, expected);
            prop_assert_eq!(manager.in_flight().last().copied(), Some(got));
        }
        prop_assert_eq!(manager.in_flight()[0], started[extra % capacity]);
    }
}
