//! In-memory limit on failed log in attempts.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Email};

/// The number of failed attempts allowed within [LOG_IN_ATTEMPT_WINDOW].
pub const MAX_LOG_IN_ATTEMPTS: usize = 5;
/// The sliding window failed attempts are counted in.
pub const LOG_IN_ATTEMPT_WINDOW: Duration = Duration::minutes(15);

/// Tracks recent failed log in attempts per email address.
#[derive(Debug, Clone, Default)]
pub struct LogInRateLimiter {
    failed_attempts: Arc<Mutex<HashMap<Email, Vec<OffsetDateTime>>>>,
}

impl LogInRateLimiter {
    /// Check whether `email` may attempt to log in at `now`.
    ///
    /// # Errors
    /// Returns [Error::TooManyLogInAttempts] with the number of minutes until
    /// the oldest counted attempt expires.
    pub fn check(&self, email: &Email, now: OffsetDateTime) -> Result<(), Error> {
        let mut failed_attempts = self.lock()?;

        let Some(attempts) = failed_attempts.get_mut(email) else {
            return Ok(());
        };

        attempts.retain(|attempt| *attempt > now - LOG_IN_ATTEMPT_WINDOW);

        if attempts.is_empty() {
            failed_attempts.remove(email);
            return Ok(());
        }

        if attempts.len() < MAX_LOG_IN_ATTEMPTS {
            return Ok(());
        }

        let retry_at = attempts[0] + LOG_IN_ATTEMPT_WINDOW;
        let minutes = ((retry_at - now).whole_seconds() + 59) / 60;
        tracing::warn!("blocked log in for {email} after {} failed attempts", attempts.len());

        Err(Error::TooManyLogInAttempts(minutes))
    }

    /// Count a failed attempt for `email`.
    ///
    /// Attempts that fell out of the window are dropped for every email, and
    /// emails left without attempts are forgotten.
    pub fn record_failure(&self, email: &Email, now: OffsetDateTime) -> Result<(), Error> {
        let mut failed_attempts = self.lock()?;

        failed_attempts.retain(|_, attempts| {
            attempts.retain(|attempt| *attempt > now - LOG_IN_ATTEMPT_WINDOW);
            !attempts.is_empty()
        });
        failed_attempts.entry(email.clone()).or_default().push(now);

        Ok(())
    }

    /// Forget the failed attempts of `email` after a successful log in.
    pub fn reset(&self, email: &Email) -> Result<(), Error> {
        self.lock()?.remove(email);

        Ok(())
    }

    #[cfg(test)]
    fn tracked_emails(&self) -> usize {
        self.failed_attempts.lock().unwrap().len()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Email, Vec<OffsetDateTime>>>, Error> {
        self.failed_attempts.lock().map_err(|error| {
            tracing::error!("could not acquire rate limiter lock: {error}");
            Error::DatabaseLockError
        })
    }
}
