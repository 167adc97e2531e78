use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use dmg_core::bus::MemoryBus;
use dmg_core::cpu::{disassemble, CPU};
use dmg_core::mmu::MMU;

/// CPU at PC=0 with `program` repeated over the first 16 KiB
fn machine(program: &[u8]) -> (CPU, MMU) {
    let mut mmu = MMU::new();
    for (addr, &byte) in (0u16..0x4000).zip(program.iter().cycle()) {
        mmu.poke(addr, byte);
    }
    let mut cpu = CPU::new();
    cpu.regs.sp = 0xFFFE;
    (cpu, mmu)
}

fn run_steps(cpu: &mut CPU, mmu: &mut MMU, steps: usize) -> u32 {
    let mut cycles = 0;
    for _ in 0..steps {
        cycles += cpu.step(mmu).expect("bench program faulted");
    }
    cycles
}

fn cpu_step_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("CPU Operations");
    group.sample_size(100);

    let programs: [(&str, &[u8]); 5] = [
        ("NOP", &[0x00]),
        ("LD r,r", &[0x7F, 0x41, 0x4A]),
        ("ALU A,r", &[0x87, 0x90, 0xA8, 0xB1]),
        ("CB ops", &[0xCB, 0x37, 0xCB, 0x7C, 0xCB, 0x11]),
        ("PUSH/POP", &[0xC5, 0xD1]),
    ];
    for (name, program) in programs {
        group.bench_function(name, |b| {
            b.iter_batched_ref(
                || machine(program),
                |(cpu, mmu)| black_box(run_steps(cpu, mmu, 1000)),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let rom: Vec<u8> = (0..=0xFFu8).cycle().take(0x4000).collect();
    c.bench_function("disassemble 16 KiB", |b| {
        b.iter(|| black_box(disassemble(black_box(&rom), 0, usize::MAX).len()));
    });
}

criterion_group!(benches, cpu_step_benchmark, decode_benchmark);
criterion_main!(benches);
