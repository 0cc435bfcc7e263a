use futures::future::BoxFuture;
use tiletb::loopback::{test_loopback, test_loopback_reordered};
use tiletb::model::{LoopbackTile, Mode};
use tiletb::prelude::*;
use tiletb::test::TestFn;
use tiletb::Summary;

fn config() -> TbConfig {
    TbConfig {
        results: None,
        ..TbConfig::default()
    }
}

fn loopback(tb: Harness) -> BoxFuture<'static, TbResult> {
    test_loopback(tb).boxed()
}

fn reordered(tb: Harness) -> BoxFuture<'static, TbResult> {
    test_loopback_reordered(tb).boxed()
}

fn tests(which: &[(&str, TestFn)]) -> TbTests {
    let mut tests = TbTests::new();
    for (name, f) in which {
        tests.push(Test::new(name, *f));
    }
    tests
}

fn both() -> TbTests {
    tests(&[
        ("test_loopback", loopback as TestFn),
        ("test_loopback_reordered", reordered as TestFn),
    ])
}

fn canonical() -> TbTests {
    tests(&[("test_loopback", loopback as TestFn)])
}

fn run(dut: impl Dut + Send + 'static, tests: &TbTests) -> Summary {
    tiletb::run_tests(&config(), Box::new(dut), tests).expect("kernel error")
}

fn result(tests: &TbTests, n: usize) -> TbResult {
    let t = tests.iter().nth(n).expect("test registered").get();
    t.result.clone().expect("test ran")
}

fn failed_phase(tests: &TbTests, n: usize) -> Phase {
    match result(tests, n) {
        Err(TbError::Assertion { phase, .. }) => phase,
        other => panic!("expected an assertion failure, got {:?}", other),
    }
}

#[test]
fn both_variants_pass_on_the_model() {
    let tests = both();
    let summary = run(LoopbackTile::new(), &tests);
    assert!(tests.all_passed(), "{:?}", tests);
    assert_eq!(summary.stats.total().failed, 0);
}

#[test]
fn every_phase_checks_what_it_should() {
    let tests = both();
    let summary = run(LoopbackTile::new(), &tests);
    let stats = &summary.stats;
    // tile select only runs in the canonical order
    assert_eq!(stats.get(Phase::TileSelect).checked, 3);
    // F0, E0 and the 16 nibble sweep, twice
    assert_eq!(stats.get(Phase::AndBuffer).checked, 2 * 18);
    // 2 resets x 4 inputs x 7 bits, twice
    assert_eq!(stats.get(Phase::Broadcast).checked, 2 * 56);
    // 56 pairs x (loopback + 2 levels x 2 bits), twice
    assert_eq!(stats.get(Phase::RaceBits).checked, 2 * 56 * 5);
    assert_eq!(stats.get(Phase::Bypass).checked, 2 * 5);
    assert_eq!(stats.get(Phase::ClockDiv).checked, 2 * 2);
    // init has no checks but still reports its end
    assert_eq!(stats.get(Phase::Init).checked, 0);
    for phase in Phase::ALL {
        let runs = if phase == Phase::TileSelect { 1 } else { 2 };
        assert_eq!(stats.get(phase).completed, runs, "{}", phase);
    }
}

#[test]
fn nibble_sweep_catches_what_the_literals_miss() {
    let tests = canonical();
    let summary = run(Faulty::new(Fault::StatusFromOuterBits), &tests);
    assert_eq!(failed_phase(&tests, 0), Phase::AndBuffer);
    // F0, E0 and nibbles 0..=8 pass before 0x90 trips the check
    assert_eq!(summary.stats.get(Phase::AndBuffer).checked, 2 + 10);
}

#[test]
fn clock_runs_at_the_configured_period() {
    let tests = canonical();
    let summary = run(LoopbackTile::new(), &tests);
    // 10 us clock, first edge after half a period
    let expected_ns = (summary.posedges as f64 - 0.5) * 10_000.0;
    assert_eq!(summary.sim_time_ns, expected_ns);
    // init + tile select + AND buffer + broadcast + race bits + bypass + divider
    assert_eq!(summary.posedges, 1 + 3 + 18 + 8 + 56 * 8 + 6 + 4);
}

/// Tile with one behavior broken, to prove the phase guarding it notices.
struct Faulty {
    tile: LoopbackTile,
    fault: Fault,
}

#[derive(Clone, Copy, Debug)]
enum Fault {
    IgnoresEna,
    StatusFromBit7Only,
    StatusFromOuterBits,
    BroadcastNeedsReset,
    BroadcastHighBitStuck,
    LoopbackBitFlip,
    RiseFlopStuck,
    FallFlopStuck,
    BypassHighBitStuck,
    DividerStuck,
}

impl Faulty {
    fn new(fault: Fault) -> Self {
        Faulty {
            tile: LoopbackTile::new(),
            fault,
        }
    }
}

impl Dut for Faulty {
    fn posedge(&mut self, pins: &PinIn) {
        self.tile.posedge(pins);
    }

    fn outputs(&self, pins: &PinIn) -> PinOut {
        let mut out = self.tile.outputs(pins);
        let mode = self.tile.mode();
        match (self.fault, mode) {
            (Fault::IgnoresEna, Some(Mode::Buffer)) => {
                let status = !pins.rst_n || pins.top_nibble() == 0xF;
                out.uo_out = out.uo_out.with_bit(7, Logic::from(status));
            }
            (Fault::StatusFromBit7Only, Some(Mode::Buffer)) => {
                let status = pins.ena && (!pins.rst_n || pins.ui_bit(7));
                out.uo_out = out.uo_out.with_bit(7, Logic::from(status));
            }
            (Fault::StatusFromOuterBits, Some(Mode::Buffer)) => {
                let status = pins.ena && (!pins.rst_n || pins.ui_bit(7) && pins.ui_bit(4));
                out.uo_out = out.uo_out.with_bit(7, Logic::from(status));
            }
            (Fault::BroadcastHighBitStuck, Some(Mode::Buffer)) => {
                out.uo_out = out.uo_out.with_bit(6, Logic::Zero);
            }
            (Fault::BroadcastNeedsReset, Some(Mode::Buffer)) if !pins.rst_n => {
                for bit in 0..7 {
                    out.uo_out = out.uo_out.with_bit(bit, Logic::Zero);
                }
            }
            (Fault::LoopbackBitFlip, Some(Mode::Route)) => {
                let b = out.uio_out.bit(3).toggled();
                out.uio_out = out.uio_out.with_bit(3, b);
            }
            (Fault::RiseFlopStuck, Some(Mode::Route)) => {
                out.uo_out = out.uo_out.with_bit(0, Logic::Zero);
            }
            (Fault::FallFlopStuck, Some(Mode::Route)) => {
                out.uo_out = out.uo_out.with_bit(4, Logic::Zero);
            }
            (Fault::BypassHighBitStuck, Some(Mode::Bypass)) => {
                out.uo_out = out.uo_out.with_bit(6, Logic::Zero);
            }
            (Fault::DividerStuck, Some(Mode::Bypass)) => {
                out.uo_out = out.uo_out.with_bit(5, Logic::Zero);
            }
            _ => {}
        }
        out
    }
}

#[test]
fn each_fault_fails_its_own_phase() {
    let cases = [
        (Fault::IgnoresEna, Phase::TileSelect),
        (Fault::StatusFromBit7Only, Phase::AndBuffer),
        // agrees with the gate on 0xF0 and 0xE0, only the nibble sweep tells them apart
        (Fault::StatusFromOuterBits, Phase::AndBuffer),
        (Fault::BroadcastNeedsReset, Phase::Broadcast),
        (Fault::BroadcastHighBitStuck, Phase::Broadcast),
        (Fault::LoopbackBitFlip, Phase::RaceBits),
        (Fault::RiseFlopStuck, Phase::RaceBits),
        (Fault::FallFlopStuck, Phase::RaceBits),
        (Fault::BypassHighBitStuck, Phase::Bypass),
        (Fault::DividerStuck, Phase::ClockDiv),
    ];
    for (fault, phase) in cases {
        let tests = canonical();
        let summary = run(Faulty::new(fault), &tests);
        assert_eq!(failed_phase(&tests, 0), phase, "{:?}", fault);
        // the run stops at the first failed check
        assert_eq!(summary.stats.total().failed, 1, "{:?}", fault);
    }
}

#[test]
fn reordered_variant_checks_broadcast_in_reset_first() {
    let tests = tests(&[("test_loopback_reordered", reordered as TestFn)]);
    let summary = run(Faulty::new(Fault::BroadcastNeedsReset), &tests);
    assert_eq!(failed_phase(&tests, 0), Phase::Broadcast);
    assert_eq!(summary.stats.get(Phase::AndBuffer).checked, 0);
}

#[test]
fn a_failing_test_does_not_stop_the_next_one() {
    let tests = both();
    run(Faulty::new(Fault::IgnoresEna), &tests);
    assert_eq!(failed_phase(&tests, 0), Phase::TileSelect);
    // the reordered variant never looks at the tile select gate
    assert!(result(&tests, 1).is_ok());
    assert!(!tests.all_passed());
    assert_eq!(tests.failed(), 1);
}

/// Never leaves the unknown state.
struct NoReset;

impl Dut for NoReset {
    fn posedge(&mut self, _pins: &PinIn) {}
    fn outputs(&self, pins: &PinIn) -> PinOut {
        PinOut {
            uo_out: LogicVec::unknown(),
            uio_out: LogicVec::known(pins.uio_in),
        }
    }
}

#[test]
fn unknown_outputs_never_reach_a_comparison() {
    let tests = canonical();
    let summary = run(NoReset, &tests);
    assert!(matches!(
        result(&tests, 0),
        Err(TbError::Unresolved { pin: "uo_out", .. })
    ));
    assert_eq!(summary.stats.total().checked, 0);
}

#[test]
fn bad_clock_is_a_kernel_error() {
    let config = TbConfig {
        clock_period: 1,
        clock_unit: "ns".to_string(),
        results: None,
        ..TbConfig::default()
    };
    let tests = canonical();
    let err = tiletb::run_tests(&config, Box::new(LoopbackTile::new()), &tests).unwrap_err();
    assert!(matches!(err, TbError::Config(_)));
}
