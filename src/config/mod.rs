mod request_file;

pub use request_file::{RequestFile, RequestFileError};
