use std::fmt;

/// Ordered stages of the loopback test. Each stage owns one stimulus/response rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Init,
    TileSelect,
    AndBuffer,
    Broadcast,
    RaceBits,
    Bypass,
    ClockDiv,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Init,
        Phase::TileSelect,
        Phase::AndBuffer,
        Phase::Broadcast,
        Phase::RaceBits,
        Phase::Bypass,
        Phase::ClockDiv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::TileSelect => "tile_select",
            Phase::AndBuffer => "and_buffer",
            Phase::Broadcast => "broadcast",
            Phase::RaceBits => "race_bits",
            Phase::Bypass => "bypass",
            Phase::ClockDiv => "clock_div",
        }
    }

    /// Progress marker logged once the phase ran to completion.
    pub fn pass_msg(self) -> &'static str {
        match self {
            Phase::Init => "PASS: init",
            Phase::TileSelect => "PASS: tile select gates uo_out[7]",
            Phase::AndBuffer => "PASS: buffer ena and &ui_in[7:4]",
            Phase::Broadcast => "PASS: buffer ui_in[0]",
            Phase::RaceBits => "PASS: race bits",
            Phase::Bypass => "PASS: bypass mode",
            Phase::ClockDiv => "PASS: clk div2",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All ordered pairs `(i, j)` of distinct bit positions in `0..8`.
///
/// Lazy and `Clone`, so the sequence can be restarted without recomputation.
pub fn ordered_pairs() -> impl Iterator<Item = (u8, u8)> + Clone {
    (0..8u8)
        .flat_map(|i| (0..8u8).map(move |j| (i, j)))
        .filter(|(i, j)| i != j)
}
