pub mod alternative;
pub mod classifier;
pub mod types;

pub use alternative::*;
pub use classifier::*;
pub use types::*;
