/// Classification for how the cascade reacts to an adapter error.
///
/// # Behavior Summary
///
/// | Class | Try Next Step? | Record Circuit Breaker Failure? | Skip Adapter For Run? |
/// |-------|----------------|---------------------------------|-----------------------|
/// | `Unavailable` | Yes | No | Yes |
/// | `FailoverWithPenalty` | Yes | Yes | No |
/// | `NextProvider` | Yes | No | No |
/// | `Abort` | No (run never starts) | No | - |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The adapter cannot serve anything this run (missing or rejected credential).
    ///
    /// Reported once per adapter per run, then skipped without further calls.
    Unavailable,

    /// Failover to the next cascade step and record a circuit breaker penalty.
    ///
    /// Used for transient errors like rate limiting (429) or timeouts. After
    /// enough failures the circuit opens and the adapter is temporarily
    /// excluded from the cascade.
    FailoverWithPenalty,

    /// Try the next cascade step without recording any penalty.
    ///
    /// Used when this adapter couldn't produce a usable quote for this symbol
    /// but another adapter might.
    NextProvider,

    /// Configuration problem detected before any batch runs.
    Abort,
}
