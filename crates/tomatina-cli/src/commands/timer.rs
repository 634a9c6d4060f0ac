use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use tomatina_core::timer::DurationSource;
use tomatina_core::{Phase, PeriodicSignal, SettingsStore, TimerEngine};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a pomodoro countdown in the terminal until it completes
    Run {
        /// Override the configured duration in minutes for this run
        #[arg(long)]
        minutes: Option<i64>,
        /// Display refresh rate in Hz (0 = default)
        #[arg(long, default_value = "4")]
        rate: u32,
    },
}

struct FixedDuration(i64);

impl DurationSource for FixedDuration {
    fn timer_duration_min(&self) -> Option<i64> {
        Some(self.0)
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run { minutes, rate } => run_countdown(minutes, rate),
    }
}

fn run_countdown(minutes: Option<i64>, rate: u32) -> Result<(), Box<dyn std::error::Error>> {
    let source: Arc<dyn DurationSource> = match minutes {
        Some(m) => Arc::new(FixedDuration(m)),
        None => Arc::new(SettingsStore::open()?),
    };

    let engine = Rc::new(RefCell::new(TimerEngine::with_thread_deadlines(source)));
    engine.borrow_mut().start();

    if engine.borrow_mut().phase() == Phase::Idle {
        return Err(
            "no timer duration configured; \
             set one with `tomatina config set timer_duration 25` or pass --minutes"
                .into(),
        );
    }

    let display = Rc::clone(&engine);
    let mut ticks = PeriodicSignal::new(rate).subscribe(move || {
        let mut engine = display.borrow_mut();
        if let (Some(remaining), Some(pct)) =
            (engine.time_remaining(), engine.percentage_complete())
        {
            print!("\r{remaining}  {:5.1}%  ", pct * 100.0);
            let _ = std::io::stdout().flush();
        }
    })?;

    // The deadline returns the engine to idle on its own; we just keep the
    // display fed until it does.
    while engine.borrow_mut().phase() != Phase::Idle {
        ticks.pump_for(Duration::from_millis(250));
    }
    ticks.cancel();

    println!("\rpomodoro complete          ");
    Ok(())
}
