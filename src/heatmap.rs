use crate::analytics_fetch::ShotPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketMode {
    /// Last point mapped to a cell wins.
    Overwrite,
    /// Points mapped to the same cell are summed.
    Accumulate,
}

/// Buckets normalized shot positions into a `grid_size` x `grid_size`
/// intensity grid, row-major. Coordinates of exactly 1.0 clamp into the
/// last row/column. Callers guarantee `x, y` in `[0, 1]`.
pub fn bucket_points(points: &[ShotPoint], grid_size: usize, mode: BucketMode) -> Vec<Vec<f64>> {
    let mut grid = vec![vec![0.0; grid_size]; grid_size];
    if grid_size == 0 {
        return grid;
    }

    for point in points {
        let col = cell_index(point.x, grid_size);
        let row = cell_index(point.y, grid_size);
        match mode {
            BucketMode::Overwrite => grid[row][col] = point.value,
            BucketMode::Accumulate => grid[row][col] += point.value,
        }
    }

    grid
}

fn cell_index(coord: f64, grid_size: usize) -> usize {
    let idx = (coord * grid_size as f64).floor() as usize;
    idx.min(grid_size - 1)
}

/// Largest cell value, used to scale the color ramp. Zero for an empty grid.
pub fn max_intensity(grid: &[Vec<f64>]) -> f64 {
    grid.iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(*v))
}
