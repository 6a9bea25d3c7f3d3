//! Try candidates in order until one succeeds or one fails terminally.

use std::future::Future;

/// Outcome of a failed attempt
#[derive(Debug)]
pub enum Attempt<E> {
    /// Move on to the next candidate
    Retry(E),
    /// Give up immediately without trying the remaining candidates
    Stop(E),
}

/// Why [`first_success`] returned without a value
#[derive(Debug, PartialEq)]
pub enum FallbackError<E> {
    /// A candidate failed terminally
    Stopped(E),
    /// Every candidate failed; carries the last error, `None` if there were no candidates
    Exhausted(Option<E>),
}

/// Run `attempt` for each candidate in order and return the first success.
pub async fn first_success<'a, C, T, E, F, Fut>(
    candidates: &'a [C],
    mut attempt: F,
) -> Result<T, FallbackError<E>>
where
    F: FnMut(&'a C) -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
{
    let mut last = None;
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(value) => return Ok(value),
            Err(Attempt::Retry(e)) => last = Some(e),
            Err(Attempt::Stop(e)) => return Err(FallbackError::Stopped(e)),
        }
    }
    Err(FallbackError::Exhausted(last))
}

#[cfg(test)]
#[path = "fallback_test.rs"]
mod fallback_test;
