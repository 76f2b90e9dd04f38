//! Audio sink nodes

mod destination;

pub use destination::Destination;
