mod adapter;
mod dispatch;
mod frames;
mod instance;
mod selector;
mod tracker;

pub use adapter::*;
pub use dispatch::*;
pub use frames::*;
pub use instance::*;
pub use selector::*;
pub use tracker::*;





#[cfg(test)]
mod instance_tests;
