pub mod appointment;
pub mod enums;
pub mod input;

pub use appointment::*;
pub use enums::*;
pub use input::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
