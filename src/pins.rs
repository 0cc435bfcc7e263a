use crate::error::TbResult;
use crate::logic::LogicVec;

/// `ui_in` top nibble with all four bits set: AND-reduction true, divider running.
pub const MODE_A_ON: u8 = 0xF0;
/// `ui_in` top nibble with only three bits set: AND-reduction false, divider held.
pub const MODE_A_OFF: u8 = 0xE0;

/// Status bit of `uo_out`.
pub const STATUS: u8 = 0x80;

/// Input side of the tile's pin interface. The clock is owned by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinIn {
    pub rst_n: bool,
    pub ena: bool,
    pub ui_in: u8,
    pub uio_in: u8,
}

impl PinIn {
    #[must_use]
    pub fn with_rst_n(self, rst_n: bool) -> Self {
        Self { rst_n, ..self }
    }
    #[must_use]
    pub fn with_ena(self, ena: bool) -> Self {
        Self { ena, ..self }
    }
    #[must_use]
    pub fn with_ui(self, ui_in: u8) -> Self {
        Self { ui_in, ..self }
    }
    #[must_use]
    pub fn with_uio(self, uio_in: u8) -> Self {
        Self { uio_in, ..self }
    }
    pub fn top_nibble(&self) -> u8 {
        self.ui_in >> 4
    }
    pub fn ui_bit(&self, n: u8) -> bool {
        self.ui_in >> n & 1 == 1
    }
}

/// Output side of the tile's pin interface, as settled after a clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinOut {
    pub uo_out: LogicVec,
    pub uio_out: LogicVec,
}

impl PinOut {
    pub fn uo_out(&self) -> TbResult<u8> {
        self.uo_out.resolve("uo_out")
    }
    pub fn uio_out(&self) -> TbResult<u8> {
        self.uio_out.resolve("uio_out")
    }
}

/// The bidirectional selector word.
///
/// | bit | meaning        |
/// |-----|----------------|
/// | 7   | bypass enable  |
/// | 6   | routing enable |
/// | 5:3 | destination    |
/// | 2:0 | source         |
///
/// In bypass mode bit 0 doubles as `sel0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selector {
    pub bypass: bool,
    pub route: bool,
    pub dest: u8,
    pub src: u8,
}

impl Selector {
    const BYPASS: u8 = 0x80;
    const ROUTE: u8 = 0x40;

    /// Route `src` against `dest`: strobe transitions on `ui_in[dest]` capture `ui_in[src]`.
    pub fn route(dest: u8, src: u8) -> Self {
        Self {
            bypass: false,
            route: true,
            dest: dest & 0x7,
            src: src & 0x7,
        }
    }

    /// Bypass with the routing bit left set, as the tile's own bring-up sequence does.
    pub fn bypass(sel0: bool) -> Self {
        Self {
            bypass: true,
            route: true,
            dest: 0,
            src: sel0 as u8,
        }
    }

    pub fn sel0(&self) -> bool {
        self.src & 1 == 1
    }

    pub fn encode(&self) -> u8 {
        let mut w = (self.dest & 0x7) << 3 | (self.src & 0x7);
        if self.bypass {
            w |= Self::BYPASS;
        }
        if self.route {
            w |= Self::ROUTE;
        }
        w
    }

    pub fn decode(w: u8) -> Self {
        Self {
            bypass: w & Self::BYPASS != 0,
            route: w & Self::ROUTE != 0,
            dest: w >> 3 & 0x7,
            src: w & 0x7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TbError;
    use crate::logic::Logic;

    #[test]
    fn route_selector_layout() {
        assert_eq!(Selector::route(5, 2).encode(), 0x40 | 5 << 3 | 2);
        assert_eq!(Selector::route(7, 0).encode(), 0x78);
        assert_eq!(Selector::decode(0x6B), Selector::route(5, 3));
    }

    #[test]
    fn bypass_selector_layout() {
        assert_eq!(Selector::bypass(true).encode(), 0xC1);
        assert_eq!(Selector::bypass(false).encode(), 0xC0);
        let s = Selector::decode(0xC1);
        assert!(s.bypass && s.route && s.sel0());
    }

    #[test]
    fn builders_leave_other_pins_alone() {
        let p = PinIn::default().with_ena(true).with_ui(MODE_A_ON);
        let q = p.with_uio(0x41).with_rst_n(true);
        assert_eq!(q.ui_in, MODE_A_ON);
        assert!(q.ena && q.rst_n);
        assert_eq!(p.uio_in, 0);
        assert_eq!(q.top_nibble(), 0xF);
        assert!(q.ui_bit(7) && !q.ui_bit(0));
    }

    #[test]
    fn unknown_output_is_an_error() {
        let out = PinOut {
            uo_out: LogicVec::known(0).with_bit(5, Logic::X),
            uio_out: LogicVec::known(0xC1),
        };
        assert!(matches!(
            out.uo_out(),
            Err(TbError::Unresolved { pin: "uo_out", .. })
        ));
        assert_eq!(out.uio_out(), Ok(0xC1));
    }
}
