
use thiserror::Error as DeriveError;

/// User-facing failures at the CLI/web boundary. Parsers and solvers themselves signal
/// failure with absent values; this enum only adapts those absences for reporting.
#[derive(Clone, Eq, PartialEq, Debug, Hash, DeriveError)]
pub enum Error {
  #[error("invalid url")]
  InvalidUrl,

  #[error("no answer")]
  NoAnswer,
}
