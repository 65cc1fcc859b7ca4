pub mod config;
pub mod detail;
mod dom;
pub mod feed;
pub mod format;
pub mod merge;
pub mod monitor;
pub mod notify;
pub mod prompt;
pub mod render;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod translate;
pub mod types;
