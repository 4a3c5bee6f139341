pub mod connectivity;
pub use connectivity::*;

use itertools::iproduct;
use nalgebra::{Point2, Vector2};

use crate::{
    control_point::ControlPoint,
    domain::Domain,
    error::{WarpError, WarpResult},
    field::{WarpField, WarpSolver},
    misc::FloatingPoint,
    raster::{resample_image, MappingDirection, Rgb, RgbImage, DEFAULT_BACKGROUND},
};


/// Regular sample grid over a square domain, optionally backed by an image.
///
/// Vertices are stored row by row from `y = min`, columns from `x = min`.
/// Connectivity and uvs never change; vertex positions and the warped image
/// are overwritten by every warp.
#[derive(Clone, Debug)]
pub struct WarpGrid<T: FloatingPoint> {
    domain: Domain<T>,
    vertices: Vec<Point2<T>>,
    lines: Vec<[usize; 2]>,
    triangles: Vec<[usize; 3]>,
    uvs: Vec<Vector2<T>>,
    source_image: Option<RgbImage>,
    image: Option<RgbImage>,
    background: Rgb<u8>,
}

impl<T: FloatingPoint> WarpGrid<T> {
    /// Build the undeformed grid of a domain
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    ///
    /// let grid = WarpGrid::new(Domain::try_new(-1.0, 1.0, 4).unwrap());
    /// assert_eq!(grid.vertices().len(), 25);
    /// assert_eq!(grid.lines().len(), 40);
    /// assert_eq!(grid.triangles().len(), 32);
    /// ```
    pub fn new(domain: Domain<T>) -> Self {
        let resolution = domain.resolution();
        let vertices = base_vertices(&domain);
        let uvs = vertices.iter().map(|v| domain.to_unit(v)).collect();
        Self {
            domain,
            vertices,
            lines: grid_lines(resolution),
            triangles: grid_triangles(resolution),
            uvs,
            source_image: None,
            image: None,
            background: DEFAULT_BACKGROUND,
        }
    }

    /// Build a grid carrying an image to be warped along with the vertices
    pub fn with_image(domain: Domain<T>, image: RgbImage) -> Self {
        let mut grid = Self::new(domain);
        grid.image = Some(image.clone());
        grid.source_image = Some(image);
        grid
    }

    /// Set the colour given to pixels whose source lies outside the domain
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    pub fn domain(&self) -> &Domain<T> {
        &self.domain
    }

    pub fn vertices(&self) -> &[Point2<T>] {
        &self.vertices
    }

    pub fn lines(&self) -> &[[usize; 2]] {
        &self.lines
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Texture coordinates of the undeformed vertices
    pub fn uvs(&self) -> &[Vector2<T>] {
        &self.uvs
    }

    pub fn background(&self) -> Rgb<u8> {
        self.background
    }

    /// The unmodified image
    pub fn source_image(&self) -> Option<&RgbImage> {
        self.source_image.as_ref()
    }

    /// The warped image
    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    /// Vertex at (`row`, `col`)
    pub fn vertex(&self, row: usize, col: usize) -> &Point2<T> {
        &self.vertices[vertex_index(self.domain.resolution(), row, col)]
    }

    /// Recompute every vertex from its base position through `field`
    pub fn apply_field<F: WarpField<T> + ?Sized>(&mut self, field: &F) {
        let resolution = self.domain.resolution();
        for (row, col) in iproduct!(0..=resolution, 0..=resolution) {
            let base = self.domain.vertex(row, col);
            self.vertices[vertex_index(resolution, row, col)] = field.evaluate(&base);
        }
    }

    /// Resample the source image through `field` into the warped image.
    /// Returns the number of background-filled pixels.
    pub fn resample_image<F: WarpField<T> + ?Sized>(
        &mut self,
        field: &F,
        direction: MappingDirection,
    ) -> WarpResult<usize> {
        let (Some(src), Some(dst)) = (self.source_image.as_ref(), self.image.as_mut()) else {
            return Err(WarpError::NoImage);
        };
        resample_image(src, dst, &self.domain, field, direction, self.background)
    }

    /// Apply `field` to the vertices and, if present, to the image.
    /// Returns the number of background pixels of the warped image.
    pub fn apply_warp<F: WarpField<T> + ?Sized>(
        &mut self,
        field: &F,
        direction: MappingDirection,
    ) -> WarpResult<Option<usize>> {
        self.apply_field(field);
        if self.source_image.is_some() {
            self.resample_image(field, direction).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Solve a field from `control_points` and apply it.
    ///
    /// The grid is left untouched when the solver fails.
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::Point2;
    /// use approx::assert_relative_eq;
    ///
    /// let domain = Domain::try_new(-1.0, 1.0, 4).unwrap();
    /// let mut grid = WarpGrid::new(domain);
    /// let cps = vec![ControlPoint::committed(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0))];
    ///
    /// grid.warp(&RadialSolver::new(RadialKernel::gaussian()), &cps, MappingDirection::Inverse).unwrap();
    /// assert_relative_eq!(*grid.vertex(2, 2), Point2::new(0.5, 0.0), epsilon = 1e-12);
    ///
    /// assert!(grid.warp(&RadialSolver::default(), &[], MappingDirection::Inverse).is_err());
    /// assert_relative_eq!(*grid.vertex(2, 2), Point2::new(0.5, 0.0), epsilon = 1e-12);
    /// ```
    pub fn warp<S: WarpSolver<T>>(
        &mut self,
        solver: &S,
        control_points: &[ControlPoint<T>],
        direction: MappingDirection,
    ) -> WarpResult<Option<usize>> {
        let field = solver.solve(control_points)?;
        self.apply_warp(&field, direction)
    }

    /// Restore the undeformed vertices and the source image
    pub fn reset(&mut self) {
        self.vertices = base_vertices(&self.domain);
        if let (Some(src), Some(dst)) = (self.source_image.as_ref(), self.image.as_mut()) {
            dst.clone_from(src);
        }
    }

    /// Largest distance between a vertex and its base position
    pub fn max_displacement(&self) -> T {
        let resolution = self.domain.resolution();
        iproduct!(0..=resolution, 0..=resolution).fold(T::zero(), |acc, (row, col)| {
            let base = self.domain.vertex(row, col);
            let moved = &self.vertices[vertex_index(resolution, row, col)];
            acc.max((moved - base).norm())
        })
    }
}

fn base_vertices<T: FloatingPoint>(domain: &Domain<T>) -> Vec<Point2<T>> {
    let resolution = domain.resolution();
    iproduct!(0..=resolution, 0..=resolution)
        .map(|(row, col)| domain.vertex(row, col))
        .collect()
}
