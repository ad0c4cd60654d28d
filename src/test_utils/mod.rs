//! the test_utils folder here will share utils between unit tests
mod common;

pub use common::*;
