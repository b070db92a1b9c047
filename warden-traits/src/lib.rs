use std::fmt::Debug;

/// Log-and-continue helpers for best-effort paths (message sends, reactions, edits).
///
/// `trace_err*` logs at error level, `warn_err*` at warn level. Both hand the
/// value back so the call site decides whether to keep propagating.
pub trait ForwardRefToTracing<T, E> {
    fn trace_err(self) -> Result<T, E>;
    fn trace_err_ok(self) -> Option<T>;
    fn warn_err_ok(self, what: &str) -> Option<T>;
}

impl<T, E> ForwardRefToTracing<T, E> for Result<T, E>
where
    E: Debug,
{
    fn trace_err(self) -> Result<T, E> {
        self.inspect_err(|e| tracing::error!("{:?}", e))
    }

    fn trace_err_ok(self) -> Option<T> {
        self.trace_err().ok()
    }

    fn warn_err_ok(self, what: &str) -> Option<T> {
        self.inspect_err(|e| tracing::warn!("{what}: {:?}", e)).ok()
    }
}

#[cfg(test)]
mod test {
    use super::ForwardRefToTracing;

    #[test]
    fn passes_values_through() {
        let ok: Result<u8, &str> = Ok(3);
        assert_eq!(ok.trace_err_ok(), Some(3));

        let err: Result<u8, &str> = Err("nope");
        assert_eq!(err.warn_err_ok("sending"), None);
        assert_eq!(Err::<u8, _>("nope").trace_err(), Err("nope"));
    }
}
