//! Concurrent guard transfers through `lock_pair`.
//!
//! Threads repeatedly move tokens between adjacent rooms of a corridor in
//! both directions. Every transfer removes from `from` and adds to `to`
//! under one pair lock, so the total population is conserved and no room
//! ever reports more guards than its capacity.

use std::sync::Arc;
use std::thread;

use heist_core::ActorId;
use heist_test_utils::line_building;

const THREADS: u32 = 8;
const MOVES: usize = 5_000;

#[test]
fn transfers_conserve_population_and_respect_capacity() {
    let building = Arc::new(line_building(5));
    for t in 0..THREADS {
        assert!(building.start().lock().add_guard(ActorId(t)));
    }

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let building = Arc::clone(&building);
            thread::spawn(move || {
                let me = ActorId(t);
                let mut here = building.start_id();
                for step in 0..MOVES {
                    let neighbours = building.room(here).neighbours();
                    let to = neighbours[(step + t as usize) % neighbours.len()];
                    let mut pair = building.lock_pair(here, to);
                    assert!(pair.from.contains_guard(me));
                    assert!(pair.to.guard_count() <= pair.to.capacity());
                    if pair.to.add_guard(me) {
                        assert!(pair.from.remove_guard(me));
                        here = to;
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let total: usize = building.rooms().map(|r| r.snapshot().guard_count()).sum();
    assert_eq!(total, THREADS as usize);
}
