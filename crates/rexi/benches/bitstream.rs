// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Bit-layer throughput: unaligned n-bit transfers and LEB128 varints.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rexi::{BitReader, BitWriter};

const VALUES: usize = 8_192;

fn bench_write_bits(c: &mut Criterion) {
    let mut buf = vec![0u8; VALUES * 8 + 16];
    c.bench_function("write_bits_7", |b| {
        b.iter(|| {
            let mut writer = BitWriter::new(&mut buf);
            for i in 0..VALUES as u64 {
                writer.write_bits_u64(black_box(i & 0x7F), 7).unwrap();
            }
            writer.bit_pos()
        });
    });
    c.bench_function("write_bits_33", |b| {
        b.iter(|| {
            let mut writer = BitWriter::new(&mut buf);
            for i in 0..VALUES as u64 {
                writer.write_bits_u64(black_box(i.wrapping_mul(0x9E3779B9)), 33).unwrap();
            }
            writer.bit_pos()
        });
    });
}

fn bench_read_bits(c: &mut Criterion) {
    let mut buf = vec![0u8; VALUES * 8 + 16];
    let mut writer = BitWriter::new(&mut buf);
    for i in 0..VALUES as u64 {
        writer.write_bits_u64(i.wrapping_mul(0x9E3779B9), 33).unwrap();
    }
    let len = writer.written_len();

    c.bench_function("read_bits_33", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&buf[..len]);
            let mut sum = 0u64;
            for _ in 0..VALUES {
                sum = sum.wrapping_add(reader.read_bits_u64(black_box(33)).unwrap());
            }
            sum
        });
    });
}

fn bench_leb(c: &mut Criterion) {
    let mut buf = vec![0u8; VALUES * 10];
    let mut writer = BitWriter::new(&mut buf);
    for i in 0..VALUES as u64 {
        writer.write_uint_leb(i.wrapping_mul(0x0101_0101_0101)).unwrap();
    }
    let len = writer.written_len();

    c.bench_function("write_uint_leb", |b| {
        b.iter(|| {
            let mut writer = BitWriter::new(&mut buf);
            for i in 0..VALUES as u64 {
                writer.write_uint_leb(black_box(i.wrapping_mul(0x0101_0101_0101))).unwrap();
            }
            writer.bit_pos()
        });
    });
    c.bench_function("read_uint_leb", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&buf[..len]);
            let mut sum = 0u64;
            for _ in 0..VALUES {
                sum = sum.wrapping_add(reader.read_uint_leb().unwrap());
            }
            sum
        });
    });
}

criterion_group!(benches, bench_write_bits, bench_read_bits, bench_leb);
criterion_main!(benches);
