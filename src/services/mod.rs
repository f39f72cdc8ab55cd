//! Business logic services.

pub mod combinations;
pub mod copy;
pub mod materializer;
pub mod statistics;
