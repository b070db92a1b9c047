use std::sync::atomic::{AtomicBool, Ordering};

/// Flags that live as long as the bot process. All start out `false`.
#[derive(Debug, Default)]
pub struct Session {
    maintenance: AtomicBool,
    no_prefix: AtomicBool,
    first_help_sent: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, only operators can run commands.
    pub fn maintenance(&self) -> bool {
        self.maintenance.load(Ordering::Relaxed)
    }

    /// Returns the previous value.
    pub fn set_maintenance(&self, enabled: bool) -> bool {
        let previous = self.maintenance.swap(enabled, Ordering::Relaxed);
        tracing::info!("maintenance mode: {previous} -> {enabled}");
        previous
    }

    /// While set, operators can run prefix commands without a prefix.
    pub fn no_prefix(&self) -> bool {
        self.no_prefix.load(Ordering::Relaxed)
    }

    /// Returns the previous value.
    pub fn set_no_prefix(&self, enabled: bool) -> bool {
        let previous = self.no_prefix.swap(enabled, Ordering::Relaxed);
        tracing::info!("no-prefix mode: {previous} -> {enabled}");
        previous
    }

    /// `true` exactly once per session, for the first help request.
    pub fn take_first_help(&self) -> bool {
        !self.first_help_sent.swap(true, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod test {
    use super::Session;

    #[test]
    fn starts_cleared() {
        let session = Session::new();

        assert!(!session.maintenance());
        assert!(!session.no_prefix());
    }

    #[test]
    fn setters_report_previous_value() {
        let session = Session::new();

        assert!(!session.set_maintenance(true));
        assert!(session.maintenance());
        assert!(session.set_maintenance(false));
        assert!(!session.maintenance());

        assert!(!session.set_no_prefix(true));
        assert!(session.no_prefix());
    }

    #[test]
    fn first_help_only_once() {
        let session = Session::new();

        assert!(session.take_first_help());
        assert!(!session.take_first_help());
        assert!(!session.take_first_help());
    }
}
