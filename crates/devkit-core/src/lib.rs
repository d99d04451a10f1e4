pub mod changes;
pub mod config;
pub mod error;
pub mod gate;
pub mod io;
pub mod menu;
pub mod migration;
pub mod paths;
pub mod runner;
pub mod scoped;

pub use error::{DevkitError, Result};
