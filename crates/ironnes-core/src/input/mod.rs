//! Controller input handling.

mod controller;

pub use controller::{Button, Controller};
