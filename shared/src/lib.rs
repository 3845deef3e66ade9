pub mod error;
pub mod secrets;

pub use error::{Error, Result};
