// Domain layer: core models and ports (interfaces). Concrete services live under adapters.

pub mod model;
pub mod ports;
