//! Common utilities and helpers

pub mod time;

pub use time::{format_bytes, format_time, parse_time};
