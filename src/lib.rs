pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod overview;
pub mod records;
pub mod transforms;
pub mod vocab;

pub use error::TransformError;
