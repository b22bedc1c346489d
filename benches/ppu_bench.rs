// PPU Benchmarks
// Performance benchmarks for PPU rendering operations

use criterion::{criterion_group, criterion_main, Criterion};
use snes_ppu_core::{MemoryHandler, NullBusHost, Ppu, PpuConfig};
use std::hint::black_box;
use std::sync::Once;

static LOG_INIT: Once = Once::new();

fn new_ppu() -> Ppu<NullBusHost> {
    // `RUST_LOG=snes_ppu_core=trace` surfaces the unimplemented-register and
    // write-gate diagnostics the PPU's `log` calls emit while a bench runs.
    LOG_INIT.call_once(|| {
        let _ = env_logger::try_init();
    });
    Ppu::new(NullBusHost::default(), PpuConfig::default())
}

/// One full NTSC frame is 262 scanlines * 1364 master clocks.
const DOTS_PER_FRAME: u32 = 262 * 1364;

fn bench_ppu_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_rendering");
    group.sample_size(20);

    group.bench_function("full_frame_via_step", |b| {
        let mut ppu = new_ppu();
        ppu.write(0x2100, 0x0F); // INIDISP: forced blank off, full brightness
        ppu.write(0x212C, 0x1F); // TM: all layers + OBJ on main screen

        b.iter(|| {
            for _ in 0..DOTS_PER_FRAME {
                ppu.step();
            }
            black_box(ppu.frame_buffer());
        });
    });

    group.finish();
}

fn bench_ppu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_step");

    group.bench_function("single_step", |b| {
        let mut ppu = new_ppu();
        b.iter(|| {
            black_box(ppu.step());
        });
    });

    group.bench_function("scanline_1364_dots", |b| {
        let mut ppu = new_ppu();
        b.iter(|| {
            for _ in 0..1364 {
                ppu.step();
            }
        });
    });

    group.finish();
}

fn bench_ppu_registers(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_registers");

    group.bench_function("inidisp_write", |b| {
        let mut ppu = new_ppu();
        b.iter(|| {
            ppu.write(black_box(0x2100), black_box(0x0F));
        });
    });

    group.bench_function("stat77_read", |b| {
        let mut ppu = new_ppu();
        b.iter(|| {
            black_box(ppu.read(0x213E));
        });
    });

    group.bench_function("vram_write_sequence", |b| {
        let mut ppu = new_ppu();
        ppu.write(0x2100, 0x80); // forced blank so writes land every dot

        b.iter(|| {
            ppu.write(0x2116, 0x00);
            ppu.write(0x2117, 0x20);
            for i in 0..32u8 {
                ppu.write(0x2118, i);
                ppu.write(0x2119, 0);
            }
        });
    });

    group.finish();
}

fn bench_ppu_oam(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_oam");

    group.bench_function("oam_write", |b| {
        let mut ppu = new_ppu();
        b.iter(|| {
            ppu.write(0x2102, 0);
            ppu.write(0x2103, 0);
            for i in 0..=255u8 {
                ppu.write(0x2104, i);
            }
        });
    });

    group.bench_function("oam_read", |b| {
        let mut ppu = new_ppu();
        b.iter(|| {
            black_box(ppu.read(0x2138));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ppu_rendering,
    bench_ppu_step,
    bench_ppu_registers,
    bench_ppu_oam
);
criterion_main!(benches);
