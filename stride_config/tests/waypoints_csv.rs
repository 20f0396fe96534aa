use std::fs::File;
use std::io::Write;

use stride_config::{Waypoint, load_waypoints_csv};
use rstest::rstest;
use tempfile::tempdir;

fn write_csv(lines: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("path.csv");
    let mut f = File::create(&path).unwrap();
    for l in lines {
        writeln!(f, "{l}").unwrap();
    }
    (dir, path)
}

#[rstest]
fn loads_valid_waypoints() {
    let (_dir, path) = write_csv(&["x,y", "1.0,1.0", "1.0,-1.0", " -1.0 , -1.0 "]);
    let pts = load_waypoints_csv(&path).unwrap();
    assert_eq!(
        pts,
        vec![
            Waypoint { x: 1.0, y: 1.0 },
            Waypoint { x: 1.0, y: -1.0 },
            Waypoint { x: -1.0, y: -1.0 },
        ]
    );
}

#[rstest]
fn rejects_wrong_headers() {
    let (_dir, path) = write_csv(&["x,z", "1.0,1.0", "0.0,0.0"]);
    let err = load_waypoints_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("must have headers 'x,y'"));
}

#[rstest]
fn rejects_single_waypoint() {
    let (_dir, path) = write_csv(&["x,y", "1.0,1.0"]);
    let err = load_waypoints_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("at least two waypoints"));
}

#[rstest]
#[case("abc,1.0")]
#[case("1.0")]
fn rejects_malformed_rows(#[case] row: &str) {
    let (_dir, path) = write_csv(&["x,y", "0.0,0.0", row]);
    let err = load_waypoints_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("row 3"), "unexpected: {err}");
}

#[rstest]
fn rejects_non_finite_coordinates() {
    let (_dir, path) = write_csv(&["x,y", "0.0,0.0", "inf,1.0"]);
    let err = load_waypoints_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("non-finite"));
}

#[rstest]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = load_waypoints_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(format!("{err}").contains("open waypoint CSV"));
}
