mod log_level;
mod output_format;

pub use log_level::LogLevel;
pub use output_format::OutputFormat;
