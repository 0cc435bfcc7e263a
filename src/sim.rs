use intmap::IntMap;
use num_format::{Locale, ToFormattedString};
use std::collections::{BTreeSet, VecDeque};
use std::task::Waker;

use crate::error::{TbError, TbResult};
use crate::executor::{Executor, JoinHandle};
use crate::logic::LogicVec;
use crate::pins::{PinIn, PinOut};
use crate::sim_if::{self, Dut};
use crate::tb_obj::TbObj;
use crate::trigger::TrigKind;

/// Kernel state: simulated time, the pins and every waker waiting on a trigger.
pub struct SimState {
    dut: Box<dyn Dut + Send>,
    precision: i8,
    time: u64,
    clk: bool,
    clk_rose: bool,
    posedges: u64,
    inputs: PinIn,
    outputs: PinOut,
    // key is absolute callback time
    timers: IntMap<VecDeque<Waker>>,
    time_set: BTreeSet<u64>,
    rising: VecDeque<Waker>,
    read_only: VecDeque<Waker>,
}

impl SimState {
    fn eval(&mut self) -> VecDeque<Waker> {
        let rose = std::mem::take(&mut self.clk_rose);
        if rose {
            self.dut.posedge(&self.inputs);
            self.posedges += 1;
        }
        self.outputs = self.dut.outputs(&self.inputs);
        if rose {
            std::mem::take(&mut self.rising)
        } else {
            VecDeque::new()
        }
    }

    fn due_timers(&mut self) -> VecDeque<Waker> {
        self.time_set.remove(&self.time);
        self.timers.remove(self.time).unwrap_or_default()
    }

    fn settle(&mut self) -> VecDeque<Waker> {
        self.outputs = self.dut.outputs(&self.inputs);
        std::mem::take(&mut self.read_only)
    }

    fn advance(&mut self) -> bool {
        match self.time_set.iter().next().copied() {
            Some(t) => {
                self.time = t;
                true
            }
            None => false,
        }
    }
}

/// Shared handle on the kernel. Cheap to clone, every task holds one.
#[derive(Clone)]
pub struct SimHandle(TbObj<SimState>);

impl SimHandle {
    pub fn new(dut: Box<dyn Dut + Send>, precision: i8) -> Self {
        SimHandle(TbObj::new(SimState {
            dut,
            precision,
            time: 0,
            clk: false,
            clk_rose: false,
            posedges: 0,
            inputs: PinIn::default(),
            outputs: PinOut {
                uo_out: LogicVec::unknown(),
                uio_out: LogicVec::unknown(),
            },
            timers: IntMap::new(),
            time_set: BTreeSet::new(),
            rising: VecDeque::new(),
            read_only: VecDeque::new(),
        }))
    }

    pub fn time_steps(&self) -> u64 {
        self.0.get().time
    }

    pub fn precision(&self) -> i8 {
        self.0.get().precision
    }

    pub fn sim_time_ns(&self) -> f64 {
        let (steps, precision) = self.0.with_mut(|s| (s.time, s.precision));
        sim_if::steps_to_ns(steps, precision)
    }

    pub fn steps(&self, time: f64, unit: &str) -> TbResult<u64> {
        sim_if::sim_steps(time, unit, self.precision())
    }

    /// Number of rising clock edges the device has seen.
    pub fn posedges(&self) -> u64 {
        self.0.get().posedges
    }

    pub fn dut_name(&self) -> String {
        self.0.get().dut.name().to_string()
    }

    pub fn set_clk(&self, level: bool) {
        self.0.with_mut(|s| {
            if level && !s.clk {
                s.clk_rose = true;
            }
            s.clk = level;
        });
    }

    /// Drives the input pins. The device sees them from the next rising edge on.
    pub fn drive(&self, pins: PinIn) {
        self.0.with_mut(|s| s.inputs = pins);
    }

    pub fn outputs(&self) -> PinOut {
        self.0.get().outputs
    }

    pub fn log(&self, msg: &str) {
        println!("{}ns {}", format_ns(self.sim_time_ns()), msg);
    }

    pub(crate) fn register(&self, kind: TrigKind, waker: Waker) {
        self.0.with_mut(|s| match kind {
            TrigKind::Timer(t) => {
                // Add current time to key, timers are stored by absolute time
                let abs_time = s.time + t;
                if let Some(wakers) = s.timers.get_mut(abs_time) {
                    wakers.push_back(waker);
                } else {
                    s.timers.insert(abs_time, VecDeque::from([waker]));
                    s.time_set.insert(abs_time);
                }
            }
            TrigKind::RisingEdge => s.rising.push_back(waker),
            TrigKind::ReadOnly => s.read_only.push_back(waker),
        });
    }
}

#[inline]
fn wake_all(wakers: VecDeque<Waker>, exec: &Executor) {
    if wakers.is_empty() {
        return;
    }
    for w in wakers {
        w.wake();
    }
    exec.run_once();
}

/// `1234567.25` as `1,234,567.250`. Rounds once, so a carry out of the fraction lands in
/// the integer part.
fn format_ns(t: f64) -> String {
    let fixed = format!("{:.3}", t);
    match fixed.split_once('.') {
        Some((int, frac)) => match int.parse::<u64>() {
            Ok(int) => format!("{}.{}", int.to_formatted_string(&Locale::en), frac),
            Err(_) => fixed.clone(),
        },
        None => fixed.clone(),
    }
}

/// Runs the kernel until `until` completes.
///
/// Per time step: due timers, clock edge evaluation, rising edge reactions, then
/// read-only reactions until none are left. Then time advances to the next timer.
pub fn run(sim: &SimHandle, exec: &Executor, mut until: JoinHandle) -> TbResult<()> {
    exec.run_once();
    loop {
        wake_all(sim.0.with_mut(SimState::due_timers), exec);
        wake_all(sim.0.with_mut(SimState::eval), exec);
        loop {
            let ro = sim.0.with_mut(SimState::settle);
            if ro.is_empty() {
                break;
            }
            wake_all(ro, exec);
        }
        if until.try_join().is_some() {
            return Ok(());
        }
        if !sim.0.with_mut(SimState::advance) {
            return Err(TbError::Stalled(sim.time_steps()));
        }
    }
}
