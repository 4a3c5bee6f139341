//! Stateless basis functions shared by the warp solvers.

pub mod cubic_bspline;
pub mod radial_kernel;
pub mod thin_plate;

pub use cubic_bspline::*;
pub use radial_kernel::*;
pub use thin_plate::*;
