//! Error types for kinet

use thiserror::Error;

/// Errors raised by the engine.
///
/// Every kind is a programmer error at the misuse site: the fluent surface
/// reports them by panicking with the formatted message, and no recovery is
/// attempted. Advancing a running tween never fails.
#[derive(Error, Debug)]
pub enum TweenError {
    /// Negative duration passed to a factory
    #[error("tween duration must be >= 0, got {0}")]
    InvalidDuration(f64),

    /// Negative delay or repeat delay
    #[error("tween delay must be >= 0, got {0}")]
    InvalidDelay(f64),

    /// More interpolated components than the configured limit
    #[error("tween declares {given} combined attributes, limit is {limit} (raise it with set_combined_attrs_limit)")]
    CombinedAttrsOverflow { given: usize, limit: usize },

    /// More waypoints than the configured limit
    #[error("tween declares {given} waypoints, limit is {limit} (raise it with set_waypoints_limit)")]
    WaypointsOverflow { given: usize, limit: usize },

    /// No accessor registered for the target's type at build time
    #[error("no accessor registered for target type {0}")]
    NoAccessor(&'static str),

    /// Builder setter called on a started tween
    #[error("builder options cannot change once a tween has started")]
    MutateAfterStart,

    /// Unbalanced timeline grouping calls
    #[error("timeline nesting is unbalanced: every begin_sequence()/begin_parallel() needs a matching end()")]
    BadNesting,

    /// A child with infinite repetitions has no finite duration to schedule
    #[error("a timeline cannot contain a child with infinite repetitions")]
    InfiniteChildRepeat,

    /// Children are owned exclusively by their timeline
    #[error("a started tween cannot be pushed into a timeline")]
    ChildAlreadyStarted,
}
