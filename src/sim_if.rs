use crate::error::{TbError, TbResult};
use crate::pins::{PinIn, PinOut};

/// The device under test, seen only through its pin interface.
///
/// The kernel calls `posedge` once per rising clock edge with the inputs that were
/// driven before the edge, and `outputs` whenever it needs the settled output pins.
/// Implementations must not depend on how often `outputs` is called.
pub trait Dut {
    fn posedge(&mut self, pins: &PinIn);
    fn outputs(&self, pins: &PinIn) -> PinOut;
    fn name(&self) -> &str {
        "dut"
    }
}

pub(crate) fn time_scale(unit: &str) -> TbResult<i8> {
    match unit {
        "fs" => Ok(-15),
        "ps" => Ok(-12),
        "ns" => Ok(-9),
        "us" => Ok(-6),
        "ms" => Ok(-3),
        "sec" => Ok(0),
        _ => Err(TbError::TimeUnit(unit.to_string())),
    }
}

/// Converts `time` in `unit` to integer simulation steps at `precision`.
pub fn sim_steps(time: f64, unit: &str, precision: i8) -> TbResult<u64> {
    let steps = ldexp10(time, time_scale(unit)? - precision);
    if steps >= 0.0 && steps % 1.0 == 0.0 {
        Ok(steps as u64)
    } else {
        Err(TbError::Precision {
            time,
            unit: unit.to_string(),
            precision,
        })
    }
}

/// Integer steps at `precision` in nanoseconds, for logs and reports.
pub fn steps_to_ns(steps: u64, precision: i8) -> f64 {
    ldexp10(steps as f64, precision + 9)
}

fn ldexp10(frac: f64, exp: i8) -> f64 {
    // Like math.ldexp, but base 10
    if exp >= 0 {
        frac * 10_u64.pow(exp as u32) as f64
    } else {
        let div = 10_u64.pow(-exp as u32) as f64;
        frac / div
    }
}
