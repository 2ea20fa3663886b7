// Domain layer: the service graph model and the runtime port.

pub mod model;
pub mod ports;
