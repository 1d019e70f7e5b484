mod attach;
mod cancel;
mod levels;
mod mapper;
mod merge;
mod options;
mod request;
mod source;
mod traversal;

pub use cancel::CancellationToken;
pub use mapper::{BatchOutcome, MapError, Mapper};
pub use merge::{merge, merge_folders};
pub use options::MapOptions;
pub use request::{MapRequest, RequestError, ResolvedRequest};
pub use source::{CompioSource, EntrySource};
