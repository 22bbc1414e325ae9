pub mod playlist;
pub mod report;

pub use playlist::*;
pub use report::*;
