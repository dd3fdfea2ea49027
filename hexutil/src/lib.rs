//! Utilities shared by the hexagon sampling crates: logging, timing, and small IO helpers.

#[macro_use]
extern crate log;

mod io;
pub mod logger;
mod time;
mod utils;

pub use crate::io::{read_json, to_json, write_json};
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::{basename, prettyprint_usize};
