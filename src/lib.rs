pub mod detector;
pub mod display;
pub mod history;
pub mod input;
pub mod monitor;
pub mod render;
pub mod scheduler;
pub mod threshold;

pub use monitor::{Cycle, Monitor};
