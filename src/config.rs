use crate::{
    basis::{RadialKernel, DEFAULT_KERNEL_DECAY},
    control_point::ControlPoint,
    domain::Domain,
    error::WarpResult,
    field::{
        default_singular_tolerance, LatticeSolver, RadialSolver, WarpField, WarpSolver,
        DEFAULT_KNOT_COUNT,
    },
    grid::WarpGrid,
    misc::FloatingPoint,
    raster::{MappingDirection, Rgb, RgbImage, CHANNELS, DEFAULT_BACKGROUND},
};

/// Solver family used to compute a warp field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarpStrategy {
    /// Free-form deformation on a cubic B-spline lattice
    Lattice,
    Gaussian,
    InverseMultiquadric,
    #[default]
    ThinPlate,
}

impl WarpStrategy {
    pub const ALL: [WarpStrategy; 4] = [
        WarpStrategy::Lattice,
        WarpStrategy::Gaussian,
        WarpStrategy::InverseMultiquadric,
        WarpStrategy::ThinPlate,
    ];
}

/// Options for building and solving warps
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarpConfig<T> {
    /// Square domain and grid resolution
    pub domain: Domain<T>,
    /// Number of knot intervals of the FFD lattice
    pub knot_count: usize,
    /// Decay constant of the Gaussian and inverse multiquadric kernels
    pub kernel_decay: T,
    /// Colour of pixels whose source lies outside the domain
    pub background: [u8; CHANNELS],
    /// Minimum pivot ratio accepted by the radial solver
    pub singular_tolerance: T,
    pub strategy: WarpStrategy,
    pub direction: MappingDirection,
}

impl<T: FloatingPoint> Default for WarpConfig<T> {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            knot_count: DEFAULT_KNOT_COUNT,
            kernel_decay: T::constant(DEFAULT_KERNEL_DECAY),
            background: DEFAULT_BACKGROUND.0,
            singular_tolerance: default_singular_tolerance(),
            strategy: WarpStrategy::default(),
            direction: MappingDirection::default(),
        }
    }
}

impl<T: FloatingPoint> WarpConfig<T> {
    pub fn with_domain(mut self, domain: Domain<T>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_knot_count(mut self, knot_count: usize) -> Self {
        self.knot_count = knot_count;
        self
    }

    pub fn with_kernel_decay(mut self, decay: T) -> Self {
        self.kernel_decay = decay;
        self
    }

    pub fn with_background(mut self, background: [u8; CHANNELS]) -> Self {
        self.background = background;
        self
    }

    pub fn with_singular_tolerance(mut self, tolerance: T) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    pub fn with_strategy(mut self, strategy: WarpStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_direction(mut self, direction: MappingDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Radial kernel of the strategy, `None` for the lattice
    pub fn kernel(&self) -> Option<RadialKernel<T>> {
        let decay = self.kernel_decay;
        match self.strategy {
            WarpStrategy::Lattice => None,
            WarpStrategy::Gaussian => Some(RadialKernel::Gaussian { decay }),
            WarpStrategy::InverseMultiquadric => Some(RadialKernel::InverseMultiquadric { decay }),
            WarpStrategy::ThinPlate => Some(RadialKernel::ThinPlate),
        }
    }

    pub fn lattice_solver(&self) -> WarpResult<LatticeSolver<T>> {
        LatticeSolver::new(self.domain, self.knot_count)
    }

    pub fn radial_solver(&self, kernel: RadialKernel<T>) -> RadialSolver<T> {
        RadialSolver::new(kernel).with_singular_tolerance(self.singular_tolerance)
    }

    /// Solve a field with the configured strategy
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::Point2;
    /// use approx::assert_relative_eq;
    ///
    /// let cps = vec![ControlPoint::committed(Point2::new(0.1, 0.0), Point2::new(0.2, 0.1))];
    /// for strategy in WarpStrategy::ALL {
    ///     let config = WarpConfig::default().with_strategy(strategy);
    ///     let field = config.solve(&cps).unwrap();
    ///     assert_relative_eq!(field.evaluate(&Point2::new(0.1, 0.0)), Point2::new(0.2, 0.1), epsilon = 1e-12);
    /// }
    /// ```
    pub fn solve(&self, control_points: &[ControlPoint<T>]) -> WarpResult<Box<dyn WarpField<T>>> {
        log::debug!(
            "solving {:?} warp for {} control points",
            self.strategy,
            control_points.len()
        );
        match self.kernel() {
            None => Ok(Box::new(self.lattice_solver()?.solve(control_points)?)),
            Some(kernel) => Ok(Box::new(self.radial_solver(kernel).solve(control_points)?)),
        }
    }

    /// Empty grid over the configured domain
    pub fn grid(&self) -> WarpGrid<T> {
        WarpGrid::new(self.domain).with_background(Rgb(self.background))
    }

    /// Image-backed grid over the configured domain
    pub fn image_grid(&self, image: RgbImage) -> WarpGrid<T> {
        WarpGrid::with_image(self.domain, image).with_background(Rgb(self.background))
    }

    /// Solve with the configured strategy and apply the field to `grid`.
    /// The grid is left untouched when the solve fails.
    pub fn warp(
        &self,
        grid: &mut WarpGrid<T>,
        control_points: &[ControlPoint<T>],
    ) -> WarpResult<Option<usize>> {
        let field = self.solve(control_points)?;
        grid.apply_warp(field.as_ref(), self.direction)
    }
}
