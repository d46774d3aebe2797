// Domain layer: shipment models and the ports the form talks through.

pub mod model;
pub mod ports;
