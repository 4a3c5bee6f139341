#![allow(clippy::needless_range_loop)]

mod basis;
mod config;
mod control_point;
mod domain;
mod error;
mod field;
mod grid;
mod misc;
mod raster;

pub mod prelude {
    pub use crate::basis::*;
    pub use crate::config::*;
    pub use crate::control_point::*;
    pub use crate::domain::*;
    pub use crate::error::*;
    pub use crate::field::*;
    pub use crate::grid::*;
    pub use crate::misc::*;
    pub use crate::raster::*;
}
