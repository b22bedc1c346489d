use super::test_ppu;

#[test]
fn step_advances_dot_and_wraps_into_next_scanline() {
    let mut ppu = test_ppu();
    for _ in 0..1364 {
        ppu.step();
    }
    assert_eq!(ppu.scanline(), 1);
    assert_eq!(ppu.dot(), 0);
}

#[test]
fn nmi_flag_sets_at_the_configured_nmi_scanline_and_notifies_host() {
    let mut ppu = test_ppu();
    let nmi_scanline = ppu.nmi_scanline;
    for _ in 0..(nmi_scanline as u32 + 1) * 1364 {
        ppu.step();
    }
    assert!(ppu.nmi_pending());
    assert!(ppu.host().nmi_notifications >= 1);
}

#[test]
fn frame_completes_and_notifies_host_once_per_frame() {
    let mut ppu = test_ppu();
    let scanlines_per_frame = ppu.base_vblank_end_scanline + 1;
    for _ in 0..scanlines_per_frame as u32 * 1364 {
        ppu.step();
    }
    assert_eq!(ppu.frame_count(), 1);
    assert_eq!(ppu.scanline(), 0);
    assert_eq!(ppu.host().frame_notifications, 1);
}

#[test]
fn odd_frame_toggles_and_short_scanline_applies_when_not_interlaced() {
    let mut ppu = test_ppu();
    assert!(!ppu.odd_frame());
    let scanlines_per_frame = ppu.base_vblank_end_scanline + 1;
    for _ in 0..scanlines_per_frame as u32 * 1364 {
        ppu.step();
    }
    assert!(ppu.odd_frame());

    // On the next (odd) frame, scanline 240 is shortened by 4 dots when
    // interlace is off.
    while ppu.scanline() < 240 {
        ppu.step();
    }
    for _ in 0..SHORT_SCANLINE_DOTS_MINUS_ONE {
        ppu.step();
    }
    assert_eq!(ppu.scanline(), 240, "still mid-scanline one dot before the short boundary");
    ppu.step();
    assert_eq!(ppu.scanline(), 241, "short scanline 240 ends one dot early in odd frames");
}

const SHORT_SCANLINE_DOTS_MINUS_ONE: u32 = 1359;

#[test]
fn overclock_extends_scanlines_before_nmi() {
    let mut ppu = test_ppu();
    ppu.config.overclock_scanlines_before_nmi = 10;
    ppu.recompute_timing_constants();

    assert_eq!(ppu.nmi_scanline, ppu.vblank_start_scanline + 10);
}
