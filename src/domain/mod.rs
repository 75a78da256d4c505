// Domain layer: data model and ports (interfaces) shared by the engine and the config layer.

pub mod model;
pub mod ports;
