// Domain layer: API records, the resource graph and the ports the sync depends on.

pub mod model;
pub mod ports;
pub mod resource;
pub mod sync;
