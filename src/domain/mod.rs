// Domain layer: entity shapes, derived views and ports. No I/O here.

pub mod assistant;
pub mod model;
pub mod ports;
pub mod views;
pub mod weather;
