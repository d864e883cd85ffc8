pub mod error;
pub mod gate;
pub mod pool;
pub mod report;
pub mod stats;
pub mod walker;
