pub mod assertion;
pub mod config;
pub mod error;
pub mod executor;
mod junit;
pub mod logic;
pub mod loopback;
pub mod model;
pub mod phase;
pub mod pins;
pub mod prelude;
pub mod sim;
pub mod sim_if;
pub mod tb_obj;
pub mod testbench;
pub mod trigger;
mod value;

use std::time;

use assertion::AssertionStats;
use config::TbConfig;
use executor::{Executor, JoinHandle};
use sim::SimHandle;
use sim_if::Dut;
use tb_obj::TbObj;
use test::TbTests;
use testbench::{Clock, Harness};

pub use error::{TbError, TbResult};
pub use value::Val;

/// Outcome of a whole run, next to the per test results stored in the `TbTests`.
#[derive(Debug, Clone)]
pub struct Summary {
    pub sim_time_ns: f64,
    pub real_secs: f64,
    pub posedges: u64,
    pub stats: AssertionStats,
}

/// Runs `tests` in order against `dut`, on one kernel and one free running clock.
///
/// Every test runs, whatever the previous one returned. Results end up in `tests`; the
/// returned error is reserved for the kernel itself (bad clock, stalled simulation).
pub fn run_tests(config: &TbConfig, dut: Box<dyn Dut + Send>, tests: &TbTests) -> TbResult<Summary> {
    config.validate()?;
    let sim = SimHandle::new(dut, config.precision);
    let stats = TbObj::new(AssertionStats::default());
    let exec = Executor::new();
    let clock = Clock::new(&sim, config.clock_period, &config.clock_unit)?;

    let start = time::Instant::now();
    let runner = start_of_simulation(&sim, &exec, clock, tests, &stats);
    sim::run(&sim, &exec, runner)?;

    let summary = Summary {
        sim_time_ns: sim.sim_time_ns(),
        real_secs: start.elapsed().as_secs_f64(),
        posedges: sim.posedges(),
        stats: stats.get().clone(),
    };
    end_of_simulation(&sim, tests, &summary);
    Ok(summary)
}

fn start_of_simulation(
    sim: &SimHandle,
    exec: &Executor,
    clock: Clock,
    tests: &TbTests,
    stats: &TbObj<AssertionStats>,
) -> JoinHandle {
    sim.log(&format!(
        "Running {} test(s) against {}, clock period {} steps",
        tests.len(),
        sim.dut_name(),
        clock.period_steps()
    ));
    exec.spawn(clock.start());

    // Tests run back to back inside one task, each awaiting the previous one's completion.
    let tests = tests.clone();
    let tb = Harness::new(sim.clone(), stats.clone());
    exec.spawn(async move {
        for test in tests.iter() {
            let (name, generator) = test.with_mut(|t| (t.name.clone(), t.generator));
            tb.log(&format!("TEST {} started", name));
            let time_start = time::Instant::now();
            let sim_time_start = tb.sim().sim_time_ns();

            let result = (generator)(tb.clone()).await;

            match &result {
                Ok(val) => tb.log(&format!("TEST {} passed: {}", name, val)),
                Err(e) => tb.log(&format!("TEST {} failed: {}", name, e)),
            }
            test.with_mut(|t| {
                t.time_secs = time_start.elapsed().as_secs_f64();
                t.sim_time_ns = tb.sim().sim_time_ns() - sim_time_start;
                t.set_result(result);
            });
        }
        Val::None
    })
}

fn end_of_simulation(sim: &SimHandle, tests: &TbTests, summary: &Summary) {
    let mut table = prettytable::Table::new();
    table.set_titles(prettytable::Row::new(
        ["test", "result", "time [s]", "sim time [ns]", "speed [ns/s]"]
            .iter()
            .map(|h| prettytable::Cell::new(h))
            .collect(),
    ));
    for test in tests.iter() {
        let t = test.get();
        let result_str = if t.passed() { "passed" } else { "failed" };
        let sim_speed = t.sim_time_ns / t.time_secs;
        sim.log(&format!(
            "TEST {}: Result={}, Time={:.3}, SimTime={}ns, SimSpeed={:.3}ns/s",
            t.name, result_str, t.time_secs, t.sim_time_ns, sim_speed
        ));
        table.add_row(prettytable::Row::new(vec![
            prettytable::Cell::new(&t.name),
            prettytable::Cell::new(result_str),
            prettytable::Cell::new(&format!("{:.3}", t.time_secs)),
            prettytable::Cell::new(&format!("{}", t.sim_time_ns)),
            prettytable::Cell::new(&format!("{:.3}", sim_speed)),
        ]));
    }
    table.printstd();

    sim.log("TOTAL SIMULATION");
    sim.log(&format!("Simulation time: {} ns", summary.sim_time_ns));
    sim.log(&format!("Clock cycles: {}", summary.posedges));
    sim.log(&format!("Real time: {:.3} s", summary.real_secs));
    sim.log(&format!(
        "Simulation speed: {:.3} ns/s",
        summary.sim_time_ns / summary.real_secs
    ));

    for p in phase::Phase::ALL {
        if summary.stats.get(p).checked > 0 {
            sim.log(&summary.stats.result_str(p));
        }
    }
    summary.stats.table().printstd();
}

/// Entry point behind `run_with_model!`: runs, writes the JUnit report and returns the
/// process exit code.
pub fn model_init(config: TbConfig, dut: Box<dyn Dut + Send>, tests: TbTests) -> i32 {
    if let Err(e) = run_tests(&config, dut, &tests) {
        eprintln!("simulation aborted: {}", e);
        return 2;
    }
    if let Some(path) = config.results.as_deref() {
        if let Err(e) = junit::create_junit_xml(path, &config.suite, &tests) {
            eprintln!("{}", e);
        }
    }
    match tests.all_passed() {
        true => 0,
        false => 1,
    }
}

#[macro_export]
macro_rules! run_with_model {
    ($model:expr; $( $i:ident ),+ $(,)?) => {
        #[allow(clippy::vec_init_then_push)]
        fn main() {
            // add tests to execution vector
            let mut tests = $crate::test::TbTests::new();
            $(tests.push($crate::test::Test::new(stringify!($i), |tb| {
                $crate::prelude::FutureExt::boxed($i(tb))
            }));)+

            let config = match $crate::config::TbConfig::from_env() {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(2);
                }
            };
            std::process::exit($crate::model_init(config, Box::new($model), tests));
        }
    }
}
