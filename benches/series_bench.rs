//! Benchmarks for series ingestion, resampling and correlation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use crosscorr::correlate::cross_correlate;
use crosscorr::ingest::{ColumnLayout, TextDecoder};
use crosscorr::series::{resample, TimeSeries};

fn final_series(label: &str, count: usize) -> TimeSeries<f64> {
    let mut series = TimeSeries::new(label);
    for i in 0..count {
        series.push((i as f64 * 0.01).sin()).unwrap();
    }
    series.finalize().unwrap();
    series
}

fn bench_accept(c: &mut Criterion) {
    let mut group = c.benchmark_group("accept");

    for size in [1440, 14400] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("accept_finalize_{}", size), |b| {
            b.iter(|| final_series("BX", black_box(size)))
        });
    }

    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    let day = final_series("BX", 1440);

    for resolution in [5, 60] {
        group.bench_function(format!("day_to_{}m", resolution), |b| {
            b.iter(|| resample(black_box(&day), resolution, 0).unwrap())
        });
    }

    group.finish();
}

fn bench_correlate(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlate");
    let long = final_series("LONG", 1440);

    for short_len in [60, 720] {
        let short = final_series("SHORT", short_len);
        group.throughput(Throughput::Elements(((1440 - short_len + 1) * short_len) as u64));

        group.bench_function(format!("short_{}_long_1440", short_len), |b| {
            b.iter(|| cross_correlate(Some(black_box(&short)), Some(black_box(&long))).unwrap())
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let mut text = String::from("#-----------------------------\n");
    for minute in 0..1440 {
        text.push_str(&format!(
            "2010 07 16 {:02}{:02} 55393 {} 0 -2.3 1.6 -4.1 4.9 -56.3 145.6\n",
            minute / 60,
            minute % 60,
            minute * 60
        ));
    }
    let layout = ColumnLayout::ace_mag();
    let decoder = TextDecoder::new();

    group.throughput(Throughput::Elements(1440));
    group.bench_function("ace_mag_day", |b| {
        b.iter(|| decoder.decode_str(&layout, black_box(&text)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_accept, bench_resample, bench_correlate, bench_decode);
criterion_main!(benches);
