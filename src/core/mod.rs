// Core modules implementing the container model, alias normalization, decoding, and errors.
pub mod alias;
pub mod container;
pub mod decode;
pub mod error;
pub mod token;

pub use alias::AliasTable;
pub use container::TextContainer;
pub use decode::{Decoder, decode};
pub use error::{Error, ErrorKind, to_exit_code};
pub use token::{TokenCursor, TokenKind};
