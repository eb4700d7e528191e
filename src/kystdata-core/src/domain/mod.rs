mod ais;
mod area;
mod date_range;
mod layer;
mod ship;

pub use ais::*;
pub use area::*;
pub use date_range::*;
pub use layer::*;
pub use ship::*;
