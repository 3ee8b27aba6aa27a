//! Report output port trait.

use std::path::Path;

use crate::domain::error::StratlabError;
use crate::domain::evaluation::Ranking;

/// Port for persisting a finished ranking.
pub trait ReportPort {
    /// One row per (strategy, segment) evaluation, best first.
    fn write_ranking(&self, ranking: &Ranking, path: &Path) -> Result<(), StratlabError>;

    /// Every simulated trade across the ranking.
    fn write_trades(&self, ranking: &Ranking, path: &Path) -> Result<(), StratlabError>;
}
