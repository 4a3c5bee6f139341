pub mod control_point;
pub mod control_point_set;
pub use control_point::*;
pub use control_point_set::*;
