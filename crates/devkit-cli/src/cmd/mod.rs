pub mod changes;
pub mod config;
pub mod gate;
pub mod menu;
pub mod migration;
pub mod script;
