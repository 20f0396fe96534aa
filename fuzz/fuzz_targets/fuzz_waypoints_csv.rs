#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let path = std::env::temp_dir().join(format!("stride-fuzz-{}.csv", std::process::id()));
    if std::fs::write(&path, data).is_err() {
        return;
    }
    if let Ok(points) = stride_config::load_waypoints_csv(&path) {
        assert!(points.len() >= 2);
        assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
    let _ = std::fs::remove_file(&path);
});
