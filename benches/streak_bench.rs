//! Benchmarks for streak and weekly-series computation
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use habitual::habits::{compute_streak, longest_streak, Habit, WeeklySeries};
use habitual::storage::MemoryStore;
use habitual::{FixedClock, HabitTracker};
use std::collections::BTreeSet;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

/// `days` consecutive completions ending today
fn unbroken_history(days: i64) -> BTreeSet<NaiveDate> {
    (0..days).map(|i| today() - Duration::days(i)).collect()
}

/// Every third day skipped
fn patchy_history(days: i64) -> BTreeSet<NaiveDate> {
    (0..days)
        .filter(|i| i % 3 != 2)
        .map(|i| today() - Duration::days(i))
        .collect()
}

fn bench_streak(c: &mut Criterion) {
    let mut group = c.benchmark_group("streak");

    for days in [30, 365, 3650] {
        let unbroken = unbroken_history(days);
        let patchy = patchy_history(days);

        group.throughput(Throughput::Elements(days as u64));

        group.bench_function(format!("current_unbroken_{}", days), |b| {
            b.iter(|| compute_streak(black_box(&unbroken), today()))
        });

        group.bench_function(format!("longest_patchy_{}", days), |b| {
            b.iter(|| longest_streak(black_box(&patchy)))
        });
    }

    group.finish();
}

fn bench_weekly(c: &mut Criterion) {
    let mut group = c.benchmark_group("weekly");

    for count in [10, 100, 1000] {
        let habits: Vec<Habit> = (0..count)
            .map(|i| Habit::new(format!("habit-{}", i)).with_history(patchy_history(365), today()))
            .collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("series_{}_habits", count), |b| {
            b.iter(|| WeeklySeries::compute(black_box(&habits), today()))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let clock = FixedClock::new(today());
    let mut tracker = HabitTracker::open(MemoryStore::new(), clock).unwrap();
    for i in 0..100 {
        let id = tracker.repo_mut().add(&format!("habit-{}", i)).unwrap().unwrap();
        tracker.repo_mut().toggle_done(&id).unwrap();
    }

    c.bench_function("render_100_habits", |b| b.iter(|| black_box(tracker.render())));
}

criterion_group!(benches, bench_streak, bench_weekly, bench_render);
criterion_main!(benches);
