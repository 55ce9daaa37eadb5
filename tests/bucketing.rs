use korfbal_terminal::analytics_fetch::ShotPoint;
use korfbal_terminal::heatmap::{BucketMode, bucket_points, max_intensity};

fn point(x: f64, y: f64, value: f64) -> ShotPoint {
    ShotPoint { x, y, value }
}

#[test]
fn grid_has_requested_dimensions() {
    for n in [1, 2, 7, 10, 25] {
        let grid = bucket_points(&[], n, BucketMode::Overwrite);
        assert_eq!(grid.len(), n);
        assert!(grid.iter().all(|row| row.len() == n));
    }
}

#[test]
fn empty_input_yields_all_zeros() {
    for n in [1, 4, 10] {
        let grid = bucket_points(&[], n, BucketMode::Overwrite);
        assert!(grid.iter().flatten().all(|v| *v == 0.0));
    }
}

#[test]
fn upper_bound_clamps_into_last_cell() {
    let grid = bucket_points(&[point(1.0, 1.0, 7.0)], 10, BucketMode::Overwrite);
    assert_eq!(grid[9][9], 7.0);

    // Points well inside the first cell never touch the far corner.
    let grid = bucket_points(
        &[point(0.05, 0.05, 3.0), point(1.0, 1.0, 7.0)],
        10,
        BucketMode::Overwrite,
    );
    assert_eq!(grid[0][0], 3.0);
    assert_eq!(grid[9][9], 7.0);
}

#[test]
fn same_cell_overwrites_instead_of_summing() {
    let grid = bucket_points(
        &[point(0.05, 0.05, 3.0), point(0.06, 0.06, 9.0)],
        10,
        BucketMode::Overwrite,
    );
    assert_eq!(grid[0][0], 9.0);
}

#[test]
fn accumulate_mode_sums_same_cell() {
    let grid = bucket_points(
        &[point(0.05, 0.05, 3.0), point(0.06, 0.06, 9.0)],
        10,
        BucketMode::Accumulate,
    );
    assert_eq!(grid[0][0], 12.0);
}

#[test]
fn boundary_splits_between_columns() {
    let grid = bucket_points(
        &[point(0.49, 0.0, 1.0), point(0.5, 0.0, 2.0)],
        2,
        BucketMode::Overwrite,
    );
    assert_eq!(grid[0][0], 1.0);
    assert_eq!(grid[0][1], 2.0);
}

#[test]
fn bucketing_is_deterministic() {
    let points = vec![
        point(0.15, 0.25, 4.2),
        point(1.0, 1.0, 7.0),
        point(0.5, 0.5, 2.5),
        point(0.49, 0.51, 1.5),
    ];
    let first = bucket_points(&points, 10, BucketMode::Overwrite);
    let second = bucket_points(&points, 10, BucketMode::Overwrite);
    assert_eq!(first, second);
}

#[test]
fn single_point_lands_in_expected_cell() {
    let grid = bucket_points(&[point(0.15, 0.25, 4.2)], 10, BucketMode::Overwrite);
    for (row, cells) in grid.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            if row == 2 && col == 1 {
                assert_eq!(*value, 4.2);
            } else {
                assert_eq!(*value, 0.0);
            }
        }
    }
}

#[test]
fn max_intensity_tracks_largest_cell() {
    assert_eq!(max_intensity(&[]), 0.0);
    let grid = bucket_points(
        &[point(0.1, 0.1, 2.0), point(0.9, 0.9, 6.5)],
        5,
        BucketMode::Overwrite,
    );
    assert_eq!(max_intensity(&grid), 6.5);
}
