//! CLI subcommands

pub mod list;
pub mod render;
pub mod settings;
pub mod show;
