pub mod dashboard;
pub mod summary;
pub mod trend;

pub use dashboard::*;
pub use summary::*;
pub use trend::*;
