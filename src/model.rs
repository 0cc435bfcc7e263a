//! Behavioral model of the loopback tile.
//!
//! State is one configuration register, loaded from `uio_in` whenever `ui_in[7:4]` is all
//! ones, two strobe flops used by the routing mode and a divide-by-2 flop. Everything starts
//! unknown and is cleared by a clock edge with `rst_n` low.

use crate::logic::{Logic, LogicVec};
use crate::pins::{PinIn, PinOut, Selector};
use crate::sim_if::Dut;

/// Output multiplexer setting, decoded from the configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `ui_in[0]` replicated on `uo_out[6:0]`, status on `uo_out[7]`.
    Buffer,
    /// Strobe flops on `uo_out[0]` (rising) and `uo_out[4]` (falling).
    Route,
    /// Raw input bits and the divider straight to the outputs.
    Bypass,
}

#[derive(Debug, Clone)]
pub struct LoopbackTile {
    cfg: LogicVec,
    last_ui: LogicVec,
    q_rise: Logic,
    q_fall: Logic,
    div: Logic,
}

impl Default for LoopbackTile {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackTile {
    pub fn new() -> Self {
        LoopbackTile {
            cfg: LogicVec::unknown(),
            last_ui: LogicVec::unknown(),
            q_rise: Logic::X,
            q_fall: Logic::X,
            div: Logic::X,
        }
    }

    /// `None` until the configuration register holds a known value.
    pub fn mode(&self) -> Option<Mode> {
        let sel = Selector::decode(self.cfg.known_value()?);
        Some(if sel.bypass {
            Mode::Bypass
        } else if sel.route {
            Mode::Route
        } else {
            Mode::Buffer
        })
    }

    pub fn divider(&self) -> Logic {
        self.div
    }

    fn status(pins: &PinIn) -> Logic {
        Logic::from(pins.ena && (!pins.rst_n || pins.top_nibble() == 0xF))
    }

    fn strobe(&mut self, sel: Selector, pins: &PinIn) {
        let was = self.last_ui.bit(sel.dest);
        let now = Logic::from(pins.ui_bit(sel.dest));
        let d = Logic::from(pins.ui_bit(sel.src));
        match (was, now) {
            (Logic::Zero, Logic::One) => self.q_rise = d,
            (Logic::One, Logic::Zero) => self.q_fall = d,
            _ => {}
        }
    }
}

impl Dut for LoopbackTile {
    fn posedge(&mut self, pins: &PinIn) {
        if !pins.rst_n {
            self.cfg = LogicVec::known(0);
            self.q_rise = Logic::Zero;
            self.q_fall = Logic::Zero;
            self.div = Logic::Zero;
        } else {
            // strobes use the configuration that was active before this edge
            if let Some(sel) = self.cfg.known_value().map(Selector::decode) {
                if sel.route {
                    self.strobe(sel, pins);
                }
            }
            if pins.top_nibble() == 0xF {
                self.cfg = LogicVec::known(pins.uio_in);
                self.div = self.div.toggled();
            }
        }
        self.last_ui = LogicVec::known(pins.ui_in);
    }

    fn outputs(&self, pins: &PinIn) -> PinOut {
        let ui0 = Logic::from(pins.ui_bit(0));
        let ui1 = Logic::from(pins.ui_bit(1));
        let uo_out = match self.mode() {
            None => LogicVec::unknown(),
            Some(Mode::Buffer) => LogicVec::replicate(ui0, 7).with_bit(7, Self::status(pins)),
            Some(Mode::Route) => LogicVec::known(0)
                .with_bit(7, Self::status(pins))
                .with_bit(4, self.q_fall)
                .with_bit(0, self.q_rise),
            Some(Mode::Bypass) => {
                let sel0 = self.cfg.known_value().map(Selector::decode).is_some_and(|s| s.sel0());
                let (hi, lo) = if sel0 { (ui0, ui1) } else { (ui1, ui0) };
                LogicVec::known(0)
                    .with_bit(6, hi)
                    .with_bit(5, self.div)
                    .with_bit(0, lo)
            }
        };
        PinOut {
            uo_out,
            uio_out: LogicVec::known(pins.uio_in),
        }
    }

    fn name(&self) -> &str {
        "loopback_tile"
    }
}
