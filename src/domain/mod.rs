pub mod consumer;
pub mod error;
pub mod message;
pub mod metadata;
pub mod producer;
pub mod response_code;

pub use consumer::*;
pub use error::DomainError;
pub use message::*;
pub use metadata::*;
pub use producer::*;
pub use response_code::*;
