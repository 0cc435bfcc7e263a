//! Stimulus/checker driver for the loopback tile.
//!
//! Every phase takes the pins currently driven and returns the pins it leaves behind, so
//! the only state carried between phases is the pin vector itself. Expected values are
//! computed from the stimulus, never replayed from a trace.

use crate::check;
use crate::error::TbResult;
use crate::phase::{ordered_pairs, Phase};
use crate::pins::{PinIn, Selector, MODE_A_OFF, MODE_A_ON, STATUS};
use crate::testbench::Harness;
use crate::value::Val;

/// Canonical order: init, tile select, AND buffer, broadcast, race bits, bypass, divider.
pub async fn test_loopback(tb: Harness) -> TbResult {
    tb.log("start");
    let pins = init(&tb).await?;
    let pins = tile_select(&tb, pins).await?;
    let pins = and_buffer(&tb, pins).await?;
    let pins = broadcast(&tb, pins).await?;
    let pins = race_bits(&tb, pins).await?;
    let pins = bypass(&tb, pins).await?;
    clock_div(&tb, pins).await?;
    Ok(Val::String("all phases passed".to_string()))
}

/// Broadcast first, half of it with reset still asserted, and no explicit tile select.
pub async fn test_loopback_reordered(tb: Harness) -> TbResult {
    tb.log("start");
    let pins = init(&tb).await?.with_ena(true);
    let pins = broadcast(&tb, pins).await?;
    let pins = and_buffer(&tb, pins).await?;
    let pins = race_bits(&tb, pins).await?;
    let pins = bypass(&tb, pins).await?;
    clock_div(&tb, pins).await?;
    Ok(Val::String("all phases passed".to_string()))
}

/// One cycle with every input known, then reset asserted. Nothing is checked here: the
/// outputs only resolve once the reset edge went through.
pub async fn init(tb: &Harness) -> TbResult<PinIn> {
    // tile not selected, inputs from the mux idle
    let pins = PinIn::default().with_rst_n(true);
    tb.log("reset");
    tb.cycle(pins).await;
    let pins = pins.with_rst_n(false);
    tb.drive(pins);
    tb.pass(Phase::Init);
    Ok(pins)
}

pub async fn tile_select(tb: &Harness, pins: PinIn) -> TbResult<PinIn> {
    let phase = Phase::TileSelect;

    let out = tb.cycles(1).await;
    check!(tb, phase, out.uo_out()? & STATUS == 0, "uo_out[7] set while not selected")?;

    let pins = pins.with_ena(true);
    let out = tb.cycle(pins).await;
    check!(tb, phase, out.uo_out()? & STATUS == STATUS, "uo_out[7] clear after select in reset")?;

    let pins = pins.with_rst_n(true);
    let out = tb.cycle(pins).await;
    check!(tb, phase, out.uo_out()? & STATUS == 0, "uo_out[7] set after reset release")?;

    tb.pass(phase);
    Ok(pins)
}

pub async fn and_buffer(tb: &Harness, pins: PinIn) -> TbResult<PinIn> {
    let phase = Phase::AndBuffer;
    let pins = pins.with_rst_n(true).with_uio(0);

    let out = tb.cycle(pins.with_ui(MODE_A_ON)).await;
    check!(tb, phase, out.uo_out()? & STATUS == STATUS, "uo_out[7] clear for ui_in={:#04x}", MODE_A_ON)?;

    let out = tb.cycle(pins.with_ui(MODE_A_OFF)).await;
    check!(tb, phase, out.uo_out()? & STATUS == 0, "uo_out[7] set for ui_in={:#04x}", MODE_A_OFF)?;

    for nibble in 0..16u8 {
        let ui = nibble << 4;
        let out = tb.cycle(pins.with_ui(ui)).await;
        let expected = if nibble == 0xF { STATUS } else { 0 };
        let got = out.uo_out()? & STATUS;
        check!(tb, phase, got == expected, "ui_in={:#04x}: uo_out[7]={:#04x}, expected {:#04x}", ui, got, expected)?;
    }

    tb.pass(phase);
    Ok(pins.with_ui(MODE_A_OFF))
}

pub async fn broadcast(tb: &Harness, pins: PinIn) -> TbResult<PinIn> {
    let phase = Phase::Broadcast;
    let mut pins = pins;

    // ui_in[0] shows up regardless of rst_n
    for rst_n in [false, true] {
        pins = pins.with_rst_n(rst_n);
        for ui in 0..4u8 {
            pins = pins.with_ui(ui);
            let mut v = tb.cycle(pins).await.uo_out()?;
            for bit in 0..7 {
                check!(tb, phase, v & 1 == ui & 1, "rst_n={} ui_in={}: uo_out[{}] != ui_in[0]", rst_n as u8, ui, bit)?;
                v >>= 1;
            }
        }
    }

    tb.pass(phase);
    Ok(pins)
}

pub async fn race_bits(tb: &Harness, pins: PinIn) -> TbResult<PinIn> {
    let phase = Phase::RaceBits;
    let mut pins = pins.with_rst_n(true);

    for (i, j) in ordered_pairs() {
        pins = pins.with_ui(MODE_A_ON).with_uio(Selector::route(j, i).encode());
        tb.cycle(pins).await;
        pins = pins.with_ui(0);
        let out = tb.cycle(pins).await;
        let echo = out.uio_out()?;
        check!(tb, phase, echo == pins.uio_in, "src={} dest={}: uio_out={:#04x} != uio_in={:#04x}", i, j, echo, pins.uio_in)?;

        for k in 0..2u8 {
            let d = k << i;
            // assign D, then a rising and a falling strobe on bit j
            tb.cycle(pins.with_ui(d)).await;
            tb.cycle(pins.with_ui(d | 1 << j)).await;
            pins = pins.with_ui(d);
            let uo = tb.cycle(pins).await.uo_out()?;
            check!(tb, phase, uo & 1 == k, "src={} dest={} k={}: uo_out[0]={}", i, j, k, uo & 1)?;
            check!(tb, phase, uo >> 4 & 1 == k, "src={} dest={} k={}: uo_out[4]={}", i, j, k, uo >> 4 & 1)?;
        }
    }

    tb.pass(phase);
    Ok(pins)
}

pub async fn bypass(tb: &Harness, pins: PinIn) -> TbResult<PinIn> {
    let phase = Phase::Bypass;
    let mask = Selector::bypass(true).encode();

    // enable bypass and use sel0=1
    let mut pins = pins.with_ui(MODE_A_ON).with_uio(mask);
    tb.cycle(pins).await;
    pins = pins.with_ui(0);
    let echo = tb.cycle(pins).await.uio_out()? & mask;
    check!(tb, phase, echo != 0 && echo == pins.uio_in & mask, "uio_out & {:#04x} = {:#04x}", mask, echo)?;

    for ui in 0..4u8 {
        pins = pins.with_ui(ui);
        let uo = tb.cycle(pins).await.uo_out()?;
        check!(
            tb,
            phase,
            uo >> 6 == ui & 1 && uo & 1 == ui >> 1,
            "ui_in={}: uo_out={:#04x}, expected uo_out[7:6]={} uo_out[0]={}",
            ui,
            uo,
            ui & 1,
            ui >> 1
        )?;
    }

    tb.pass(phase);
    Ok(pins)
}

pub async fn clock_div(tb: &Harness, pins: PinIn) -> TbResult<PinIn> {
    let phase = Phase::ClockDiv;

    // turn on jitter flop
    let pins = pins.with_ui(MODE_A_ON);
    let prev = tb.cycle(pins).await.uo_out()? >> 5;
    let next = tb.cycles(1).await.uo_out()? >> 5;
    check!(tb, phase, prev != next, "divider held with ui_in={:#04x}: {:#04x} -> {:#04x}", MODE_A_ON, prev, next)?;

    // turn off jitter flop
    let pins = pins.with_ui(MODE_A_OFF);
    let prev = tb.cycle(pins).await.uo_out()? >> 5;
    let next = tb.cycles(1).await.uo_out()? >> 5;
    check!(tb, phase, prev == next, "divider toggled with ui_in={:#04x}: {:#04x} -> {:#04x}", MODE_A_OFF, prev, next)?;

    tb.pass(phase);
    Ok(pins)
}
