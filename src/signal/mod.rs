pub mod generator;

pub use generator::{generate_signals, Signal};
