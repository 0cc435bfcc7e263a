use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::TbResult;
use crate::sim::SimHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigKind {
    /// Relative delay in simulation steps.
    Timer(u64),
    RisingEdge,
    /// End of the current time step, after all edge reactions settled.
    ReadOnly,
}

/// A one-shot event the kernel resumes a task on.
#[derive(Clone)]
pub struct Trigger {
    sim: SimHandle,
    kind: TrigKind,
    awaited: bool,
}

impl Trigger {
    pub fn timer(sim: &SimHandle, time: u64, unit: &str) -> TbResult<Self> {
        Ok(Trigger::timer_steps(sim, sim.steps(time as f64, unit)?))
    }
    pub fn timer_steps(sim: &SimHandle, steps: u64) -> Self {
        Trigger::new(sim, TrigKind::Timer(steps))
    }
    pub fn rising_edge(sim: &SimHandle) -> Self {
        Trigger::new(sim, TrigKind::RisingEdge)
    }
    pub fn read_only(sim: &SimHandle) -> Self {
        Trigger::new(sim, TrigKind::ReadOnly)
    }
    fn new(sim: &SimHandle, kind: TrigKind) -> Self {
        Trigger {
            sim: sim.clone(),
            kind,
            awaited: false,
        }
    }
    pub fn kind(&self) -> TrigKind {
        self.kind
    }
}

impl Future for Trigger {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Trigger must only be awaited once, so the second time it is polled it must be because
        // the kernel woke it.
        if self.awaited {
            Poll::Ready(())
        } else {
            self.awaited = true;
            self.sim.register(self.kind, cx.waker().clone());
            Poll::Pending
        }
    }
}
