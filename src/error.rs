use crate::logic::LogicVec;
use crate::phase::Phase;
use crate::value::Val;
use thiserror::Error;

pub type TbResult<T = Val> = Result<T, TbError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TbError {
    /// Observed pin value diverged from the value the phase rule predicts.
    #[error("{phase}: {msg}")]
    Assertion { phase: Phase, msg: String },

    /// An output was read as a number while some of its bits were still unknown.
    #[error("{pin} is {value}, not resolved to 0/1")]
    Unresolved { pin: &'static str, value: LogicVec },

    #[error("unknown time unit '{0}'")]
    TimeUnit(String),

    #[error("can't convert {time} {unit} to sim steps without rounding (precision 1e{precision})")]
    Precision { time: f64, unit: String, precision: i8 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("simulation stalled at step {0}: no pending events")]
    Stalled(u64),

    #[error("could not write report: {0}")]
    Report(String),
}
