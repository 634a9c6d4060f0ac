//! End-to-end countdown: the UI pattern of reading engine state on each
//! periodic-signal tick, composed the way a display layer would.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tomatina_core::timer::DurationSource;
use tomatina_core::{Demand, PeriodicSignal, Phase, TimerEngine};

struct FixedMinutes(i64);

impl DurationSource for FixedMinutes {
    fn timer_duration_min(&self) -> Option<i64> {
        Some(self.0)
    }
}

#[test]
fn ticks_drive_monotonic_elapsed_readings() {
    let engine = Rc::new(RefCell::new(TimerEngine::with_thread_deadlines(Arc::new(
        FixedMinutes(25),
    ))));
    engine.borrow_mut().start();

    let readings: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&readings);
    let display = Rc::clone(&engine);

    let mut ticks = PeriodicSignal::new(50)
        .subscribe(move || {
            let mut engine = display.borrow_mut();
            assert!(matches!(engine.phase(), Phase::Active { .. }));
            sink.borrow_mut()
                .push(engine.elapsed_time().unwrap().num_milliseconds());
        })
        .unwrap();

    ticks.pump_for(Duration::from_millis(300));
    ticks.cancel();
    engine.borrow_mut().stop();

    let readings = readings.borrow();
    assert!(readings.len() >= 3, "only {} readings", readings.len());
    assert!(readings.windows(2).all(|w| w[0] <= w[1]), "elapsed went backward");
    assert_eq!(engine.borrow_mut().phase(), Phase::Idle);
}

#[test]
fn paused_engine_reads_frozen_elapsed_across_ticks() {
    let engine = Rc::new(RefCell::new(TimerEngine::with_thread_deadlines(Arc::new(
        FixedMinutes(25),
    ))));
    engine.borrow_mut().start();
    std::thread::sleep(Duration::from_millis(30));
    engine.borrow_mut().pause();
    let banked = engine.borrow_mut().elapsed_time().unwrap();

    let display = Rc::clone(&engine);
    let mut ticks = PeriodicSignal::new(50)
        .subscribe(move || {
            let mut engine = display.borrow_mut();
            assert!(engine.is_paused());
            assert_eq!(engine.elapsed_time().unwrap(), banked);
        })
        .unwrap();

    ticks.pump_for(Duration::from_millis(150));
    ticks.request(Demand::None);
    assert_eq!(ticks.pump(), 0);
}
