use std::time::Duration;

use log::warn;

use crate::error::OracleError;

/// Bounded retry with exponential backoff for external collaborator calls.
/// Injected into the gate/eliminator so no call site carries its own sleep
/// loop. Exhaustion surfaces the last error; the caller decides what a
/// local failure means for that unit of work.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 1.5,
        }
    }
}

impl RetryPolicy {
    /// No sleeping between attempts. For tests and fast local fakes.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::ZERO,
            backoff_factor: 1.0,
        }
    }

    pub fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, OracleError>,
    ) -> Result<T, OracleError> {
        let mut delay = self.initial_delay;
        let mut attempt = 1u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts => {
                    warn!("{} failed after {} attempts: {}", what, attempt, err);
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what, attempt, self.max_attempts, err, delay
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    delay = delay.mul_f64(self.backoff_factor);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_success_passes_through() {
        let policy = RetryPolicy::immediate(3);
        let result = policy.run("op", || Ok::<_, OracleError>(7));
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::immediate(5);
        let calls = Cell::new(0u32);
        let result = policy.run("op", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(OracleError::Malformed("transient".into()))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let policy = RetryPolicy::immediate(4);
        let calls = Cell::new(0u32);
        let result: Result<(), _> = policy.run("op", || {
            calls.set(calls.get() + 1);
            Err(OracleError::Malformed("persistent".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 4);
    }
}
