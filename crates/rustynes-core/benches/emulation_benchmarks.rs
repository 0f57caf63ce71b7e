//! Performance benchmarks for the emulation core.
//!
//! Everything here runs against a synthetic NROM image (a reset vector and
//! an infinite `JMP` loop) rather than real ROM files, since ROM file I/O
//! is outside this crate's scope.

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rustynes_core::Console;
use std::time::Duration;

/// Create a minimal valid NES ROM for benchmarking.
fn create_minimal_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 16 + 32768 + 8192]; // header + 32KB PRG + 8KB CHR

    rom[0] = 0x4E; // 'N'
    rom[1] = 0x45; // 'E'
    rom[2] = 0x53; // 'S'
    rom[3] = 0x1A; // EOF
    rom[4] = 2; // 32KB PRG-ROM (2 x 16KB)
    rom[5] = 1; // 8KB CHR-ROM
    rom[6] = 0x01; // mapper 0, vertical mirroring

    rom[16 + 0x7FFC] = 0x00; // reset vector -> $8000
    rom[16 + 0x7FFD] = 0x80;

    rom[16] = 0x4C; // JMP absolute
    rom[17] = 0x00;
    rom[18] = 0x80;

    rom
}

fn bench_cpu_instructions(c: &mut Criterion) {
    let rom_data = create_minimal_rom();
    let mut console = Console::new(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("cpu");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("single_instruction", |b| {
        b.iter(|| {
            black_box(console.step_instruction());
        });
    });

    group.bench_function("1000_instructions", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(console.step_instruction());
            }
        });
    });

    group.finish();
}

fn bench_ppu_frames(c: &mut Criterion) {
    let rom_data = create_minimal_rom();
    let mut console = Console::new(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("ppu");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("single_frame", |b| {
        b.iter(|| {
            console.step_frame();
            black_box(console.framebuffer());
        });
    });

    group.finish();
}

fn bench_console_initialization(c: &mut Criterion) {
    let rom_data = create_minimal_rom();

    let mut group = c.benchmark_group("initialization");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("console_new", |b| {
        b.iter(|| {
            let console = Console::new(black_box(&rom_data)).expect("failed to create console");
            black_box(console);
        });
    });

    group.bench_function("power_on", |b| {
        let mut console = Console::new(&rom_data).expect("failed to create console");
        b.iter(|| {
            console.power_on();
            black_box(console.total_cycles());
        });
    });

    group.bench_function("reset", |b| {
        let mut console = Console::new(&rom_data).expect("failed to create console");
        b.iter(|| {
            console.reset();
            black_box(console.total_cycles());
        });
    });

    group.finish();
}

fn bench_mapper_frame(c: &mut Criterion) {
    let rom_data = create_minimal_rom();
    let mut console = Console::new(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("mappers");
    group.measurement_time(Duration::from_secs(5));

    group.bench_with_input(BenchmarkId::new("frame", "NROM"), &(), |b, ()| {
        b.iter(|| {
            console.step_frame();
            black_box(console.framebuffer());
        });
    });

    group.finish();
}

fn bench_memory_access(c: &mut Criterion) {
    let rom_data = create_minimal_rom();
    let console = Console::new(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("memory");
    group.throughput(Throughput::Bytes(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("peek_ram", |b| {
        b.iter(|| {
            black_box(console.peek_memory(black_box(0x0000)));
        });
    });

    group.bench_function("peek_prg", |b| {
        b.iter(|| {
            black_box(console.peek_memory(black_box(0x8000)));
        });
    });

    group.bench_function("peek_sequential_256", |b| {
        b.iter(|| {
            for addr in 0..256u16 {
                black_box(console.peek_memory(addr));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cpu_instructions,
    bench_ppu_frames,
    bench_console_initialization,
    bench_mapper_frame,
    bench_memory_access,
);
criterion_main!(benches);
