use crate::assertion::AssertionStats;
use crate::error::{TbError, TbResult};
use crate::phase::Phase;
use crate::pins::{PinIn, PinOut};
use crate::sim::SimHandle;
use crate::tb_obj::TbObj;
use crate::trigger::Trigger;
use crate::value::Val;

/// Evaluates a check inside a phase and returns `TbResult<()>`.
///
/// Without a message the stringified condition is reported.
#[macro_export]
macro_rules! check {
    ($tb:expr, $phase:expr, $cond:expr) => {
        $tb.check($phase, $cond, || stringify!($cond).to_string())
    };
    ($tb:expr, $phase:expr, $cond:expr, $($arg:tt)+) => {
        $tb.check($phase, $cond, || format!($($arg)+))
    };
}

/*
 * CLOCK
 */
#[derive(Clone)]
pub struct Clock {
    sim: SimHandle,
    high: u64,
    low: u64,
}

impl Clock {
    pub fn new(sim: &SimHandle, period: u64, unit: &str) -> TbResult<Self> {
        let steps = sim.steps(period as f64, unit)?;
        if steps < 2 {
            return Err(TbError::Config(format!(
                "clock period {}{} is shorter than two simulation steps",
                period, unit
            )));
        }
        let high = steps / 2;
        let low = steps - high;
        if steps % 2 != 0 {
            sim.log(&format!("Warning: Clock period {period}{unit} not dividable by 2 at simulator precision. High time will be {high} steps; low time will be {low} steps."));
        }
        Ok(Clock {
            sim: sim.clone(),
            high,
            low,
        })
    }

    pub fn period_steps(&self) -> u64 {
        self.high + self.low
    }

    /// Toggles the clock forever. Started once per run.
    pub async fn start(self) -> Val {
        loop {
            self.sim.set_clk(false);
            Trigger::timer_steps(&self.sim, self.low).await;
            self.sim.set_clk(true);
            Trigger::timer_steps(&self.sim, self.high).await;
        }
    }
}

/*
 * HARNESS
 */
/// The driver's only view of the device: drive inputs, advance whole cycles, sample
/// settled outputs, check.
#[derive(Clone)]
pub struct Harness {
    sim: SimHandle,
    stats: TbObj<AssertionStats>,
}

impl Harness {
    pub fn new(sim: SimHandle, stats: TbObj<AssertionStats>) -> Self {
        Self { sim, stats }
    }

    pub fn sim(&self) -> &SimHandle {
        &self.sim
    }

    pub fn drive(&self, pins: PinIn) {
        self.sim.drive(pins);
    }

    /// Waits for `n` rising clock edges and returns the outputs once they settled.
    pub async fn cycles(&self, n: u32) -> PinOut {
        for _ in 0..n {
            Trigger::rising_edge(&self.sim).await;
        }
        Trigger::read_only(&self.sim).await;
        self.sim.outputs()
    }

    /// Drives `pins` for exactly one clock cycle.
    pub async fn cycle(&self, pins: PinIn) -> PinOut {
        self.drive(pins);
        self.cycles(1).await
    }

    pub fn check(&self, phase: Phase, ok: bool, msg: impl FnOnce() -> String) -> TbResult<()> {
        self.stats.with_mut(|s| s.record(phase, ok));
        if ok {
            Ok(())
        } else {
            let msg = msg();
            self.sim.log(&format!("FAIL: {}: {}", phase, msg));
            Err(TbError::Assertion { phase, msg })
        }
    }

    pub fn log(&self, msg: &str) {
        self.sim.log(msg);
    }

    pub fn pass(&self, phase: Phase) {
        self.stats.with_mut(|s| s.complete(phase));
        self.log(phase.pass_msg());
    }
}
