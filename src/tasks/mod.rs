//! Background tasks spawned by the binary

pub mod prune;
