mod best_effort_path_ext;
mod blocking;

pub use best_effort_path_ext::{BestEffortPathExt, absolutize, normalize_path};
pub use blocking::run_blocking;
