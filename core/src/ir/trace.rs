//! Observation points for scope changes during a translation.

/// Receives the qualified scope name each time the builder enters a
/// function scope and again once that function's body is translated.
/// Both calls happen while the scope is still entered.
pub trait TraceSink {
    fn scope_entered(&mut self, qualified: &str);
    fn scope_completed(&mut self, qualified: &str);
}

/// Logs scope events at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn scope_entered(&mut self, qualified: &str) {
        log::debug!("entered scope `{}`", qualified);
    }

    fn scope_completed(&mut self, qualified: &str) {
        log::debug!("completed scope `{}`", qualified);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn scope_entered(&mut self, _qualified: &str) {}
    fn scope_completed(&mut self, _qualified: &str) {}
}
