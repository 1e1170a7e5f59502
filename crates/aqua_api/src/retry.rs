/// Per-call context that travels with a request instead of mutating headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Set on the single re-issue after a successful token refresh.
    pub is_retry: bool,
    /// Whether a 401 may trigger the refresh protocol at all.
    pub allow_refresh: bool,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::initial()
    }
}

impl CallContext {
    /// First attempt of an ordinary authenticated call.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            is_retry: false,
            allow_refresh: true,
        }
    }

    /// Calls whose 401 means "bad credentials", such as login.
    #[must_use]
    pub const fn without_refresh() -> Self {
        Self {
            is_retry: false,
            allow_refresh: false,
        }
    }

    #[must_use]
    pub const fn into_retry(self) -> Self {
        Self {
            is_retry: true,
            ..self
        }
    }

    /// A 401 triggers a refresh only on a non-retry call that allows it, so a
    /// single call refreshes at most once.
    #[must_use]
    pub const fn should_refresh_on_unauthorized(&self) -> bool {
        self.allow_refresh && !self.is_retry
    }
}

#[cfg(test)]
mod tests {
    use super::CallContext;

    #[test]
    fn initial_call_may_refresh() {
        assert!(CallContext::initial().should_refresh_on_unauthorized());
    }

    #[test]
    fn retried_call_never_refreshes() {
        assert!(!CallContext::initial()
            .into_retry()
            .should_refresh_on_unauthorized());
    }

    #[test]
    fn credential_calls_never_refresh() {
        assert!(!CallContext::without_refresh().should_refresh_on_unauthorized());
    }
}
