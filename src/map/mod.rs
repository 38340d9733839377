pub mod aggregate;
pub mod bounds;
pub mod classify;
pub mod filtering;
pub mod render;
