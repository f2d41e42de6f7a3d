mod client;
pub use client::*;

pub mod protocol;
