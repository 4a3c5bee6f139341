use itertools::iproduct;

/// Index of the vertex at (`row`, `col`) of a grid with `resolution` cells per side
pub fn vertex_index(resolution: usize, row: usize, col: usize) -> usize {
    row * (resolution + 1) + col
}

/// Wireframe segments: every vertex connects to its right and upper neighbour.
///
/// Yields `2 * resolution * (resolution + 1)` segments.
/// # Example
/// ```
/// use gridwarp::prelude::*;
///
/// let lines = grid_lines(1);
/// assert_eq!(lines, vec![[0, 1], [0, 2], [1, 3], [2, 3]]);
/// ```
pub fn grid_lines(resolution: usize) -> Vec<[usize; 2]> {
    let n = resolution + 1;
    let mut lines = Vec::with_capacity(2 * resolution * n);
    for (row, col) in iproduct!(0..n, 0..n) {
        let index = vertex_index(resolution, row, col);
        if col != resolution {
            lines.push([index, index + 1]);
        }
        if row != resolution {
            lines.push([index, index + n]);
        }
    }
    lines
}

/// Two counter-clockwise triangles per cell, `2 * resolution^2` in total
pub fn grid_triangles(resolution: usize) -> Vec<[usize; 3]> {
    let n = resolution + 1;
    iproduct!(0..resolution, 0..resolution)
        .flat_map(|(row, col)| {
            let a = vertex_index(resolution, row, col);
            let b = a + 1;
            let c = a + n + 1;
            let d = a + n;
            [[a, b, c], [a, c, d]]
        })
        .collect()
}
