pub mod common;
pub mod label;
