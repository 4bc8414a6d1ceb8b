// Domain layer: descriptor models and ports. No protoc or HTTP types here.

pub mod model;
pub mod ports;
