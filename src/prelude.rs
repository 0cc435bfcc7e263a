pub use crate::check;
pub use crate::config::TbConfig;
pub use crate::error::{TbError, TbResult};
pub use crate::logic::{Logic, LogicVec};
pub use crate::phase::{ordered_pairs, Phase};
pub use crate::pins::{PinIn, PinOut, Selector, MODE_A_OFF, MODE_A_ON, STATUS};
pub use crate::sim::SimHandle;
pub use crate::sim_if::Dut;
pub use crate::test::{TbTests, Test};
pub use crate::testbench::Harness;
pub use crate::trigger::Trigger;
pub use crate::value::Val;
pub use futures::future::FutureExt;
