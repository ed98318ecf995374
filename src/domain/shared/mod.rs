pub mod parse_error;

pub use parse_error::{ParseError, ParseErrorKind};
