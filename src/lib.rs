pub mod games;
pub mod runner;
pub mod stats;
