//! Helper functions shared by the content pipeline and the CLI

mod date;
mod html;
mod meta;

pub use date::*;
pub use html::*;
pub use meta::*;
