//! Retry/fallback policy.
//!
//! The resolver's reaction to a provider failure is data, not control flow:
//! the policy maps a failure kind (plus how many auth retries have already
//! happened) to one of two actions. Tuning what is retried versus what falls
//! through happens here, not in the resolver loop.

use super::domain::GeocodeError;

/// What the resolver should do about a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Refresh the provider's credentials and retry the same provider.
    RefreshAndRetry,
    /// Give up on this provider and try the next one in the chain.
    Fallback,
}

/// Maps failure kinds to resolver actions.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Auth failures trigger at most this many refresh-and-retry rounds
    /// per provider per address.
    pub auth_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { auth_retries: 1 }
    }
}

impl RetryPolicy {
    pub fn new(auth_retries: u32) -> Self {
        Self { auth_retries }
    }

    /// Decide what to do about `error`, given how many auth retries have
    /// already been spent on this provider for the current address.
    pub fn action_for(&self, error: &GeocodeError, auth_attempts: u32) -> FailureAction {
        match error {
            GeocodeError::Auth(_) if auth_attempts < self.auth_retries => {
                FailureAction::RefreshAndRetry
            }
            // Auth retries exhausted, or a transient/terminal provider
            // failure: rate limits are never re-spun against the same
            // provider, timeouts and server errors fall through, no-match
            // is an answer.
            _ => FailureAction::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_gets_one_retry() {
        let policy = RetryPolicy::default();
        let err = GeocodeError::Auth("expired".to_string());
        assert_eq!(policy.action_for(&err, 0), FailureAction::RefreshAndRetry);
        assert_eq!(policy.action_for(&err, 1), FailureAction::Fallback);
    }

    #[test]
    fn test_transient_failures_fall_back() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.action_for(&GeocodeError::RateLimited, 0),
            FailureAction::Fallback
        );
        assert_eq!(
            policy.action_for(&GeocodeError::Timeout, 0),
            FailureAction::Fallback
        );
        assert_eq!(
            policy.action_for(&GeocodeError::NoMatch, 0),
            FailureAction::Fallback
        );
        assert_eq!(
            policy.action_for(&GeocodeError::Unavailable("502".to_string()), 0),
            FailureAction::Fallback
        );
    }

    #[test]
    fn test_zero_auth_retries_disables_refresh() {
        let policy = RetryPolicy::new(0);
        let err = GeocodeError::Auth("expired".to_string());
        assert_eq!(policy.action_for(&err, 0), FailureAction::Fallback);
    }
}
