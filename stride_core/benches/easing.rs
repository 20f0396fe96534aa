use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use stride_core::easing::{EasingCurve, shape};
use stride_core::ramp::{DriveMode, LoopMode, Ramp};
use stride_traits::ManualClock;

fn progress_points(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
}

fn tune(g: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p stride_core --bench easing
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }
}

pub fn bench_curves(c: &mut Criterion) {
    let mut g = c.benchmark_group("easing_shape");
    tune(&mut g);

    let ks = progress_points(10_000);
    for curve in [
        EasingCurve::Linear,
        EasingCurve::CubicInOut,
        EasingCurve::SinusoidalInOut,
        EasingCurve::ElasticOut,
        EasingCurve::BounceInOut,
    ] {
        g.bench_function(curve.name(), |b| {
            b.iter(|| {
                let mut acc = 0.0;
                for &k in &ks {
                    acc += shape(black_box(k), black_box(curve));
                }
                black_box(acc);
            })
        });
    }
    g.finish();
}

pub fn bench_ramp(c: &mut Criterion) {
    let mut g = c.benchmark_group("ramp_tick");
    tune(&mut g);

    for mode in [LoopMode::Once, LoopMode::ForthAndBack] {
        g.bench_function(mode.name(), |b| {
            b.iter_batched(
                || {
                    let mut r = Ramp::with_clock(0.0, Arc::new(ManualClock::new()));
                    r.set_drive_mode(DriveMode::Manual);
                    r.restart(1.0, 5_000, EasingCurve::QuadraticInOut, mode);
                    r
                },
                |mut r| {
                    for _ in 0..1_000 {
                        black_box(r.tick());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(easing, bench_curves, bench_ramp);
criterion_main!(easing);
