//! Statistics error types.

/// Rejections raised by the statistics aggregator.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StatsError {
    /// A result label other than `win`, `loss` or `tie`.
    #[display("Result must be \"win\", \"loss\", or \"tie\" (got {_0:?})")]
    UnrecognizedResult(String),

    /// A counter is already at its maximum and cannot count another game.
    #[display("Counter {_0} is at its maximum value")]
    CounterOverflow(&'static str),
}

impl std::error::Error for StatsError {}
