//! Frame drivers. Only the headless driver ships; a windowed host embeds
//! `Session::frame` in its own render loop instead.

pub mod headless;

pub use headless::{run, HeadlessConfig, RunStats};
