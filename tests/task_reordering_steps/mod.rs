//! Step definitions for task reordering behaviour tests.

pub mod given;
pub mod when;
pub mod world;
