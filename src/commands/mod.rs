pub mod catalog;
pub mod check;
pub mod diagnose;
pub mod handle;
pub mod model;
