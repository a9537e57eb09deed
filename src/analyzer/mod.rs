// Analyzer module: aggregates submodules for different aspects of analysis.

pub mod indicators;
pub mod technicals;

pub use indicators::IndicatorColumns;
pub use technicals::{TechnicalSnapshot, analyze};
