pub mod config;
pub mod report;

pub use config::{CodecConfig, MatchModeConfig};
pub use report::{CodeLength, CompressReport, DecompressReport, InspectReport};
