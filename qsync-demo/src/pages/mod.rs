//! Demo app pages

mod catalog;

pub use catalog::Catalog;
