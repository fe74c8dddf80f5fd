use std::{thread, time::Duration};

/// Calls the given operation `op` at most `times` times as long as it
/// returns an error, sleeping `backoff` in between subsequent calls. If
/// `op` still fails on the last attempt, that error is returned. If
/// `times` is 0, `op` is called indefinitely until it succeeds.
///
/// The pool itself never retries anything; wrap a flaky job function with
/// this before installing it if re-attempts are wanted.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// let mut attempts = 0;
/// let outcome: Result<(), &str> = crew::retry(3, Duration::ZERO, || {
///     attempts += 1;
///     if attempts < 3 {
///         Err("not yet")
///     } else {
///         Ok(())
///     }
/// });
///
/// assert!(outcome.is_ok());
/// assert_eq!(3, attempts);
/// ```
pub fn retry<E, F>(times: u16, backoff: Duration, mut op: F) -> Result<(), E>
where
    F: FnMut() -> Result<(), E>,
{
    let mut attempt: u16 = 0;
    loop {
        let err = match op() {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        attempt = attempt.saturating_add(1);
        if times > 0 && attempt >= times {
            return Err(err);
        }
        thread::sleep(backoff);
    }
}
