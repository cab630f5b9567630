#![forbid(unsafe_code)]

pub mod cli;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formats;
pub mod logging;
pub mod page;
pub mod prompt;
