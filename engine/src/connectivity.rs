//! Server connectivity tracking with stale-probe protection.
//!
//! A probe is one `GET /v1/models` attempt, triggered only by a server-URL
//! change, never polled. Probes run concurrently with the UI, so a slow
//! response for an old URL can arrive after the probe for the current one.
//! Each probe carries the generation it was started under and a result is
//! applied only while its generation is still the newest; anything older
//! is discarded.

/// Opaque tag identifying one probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeGeneration(u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectivityStatus {
    /// No probe has completed yet (also the state with no URL configured).
    #[default]
    Unknown,
    /// The last probe for the current URL succeeded.
    Ok,
    /// The last probe for the current URL failed; sending is blocked until
    /// a newer probe succeeds.
    Error(String),
}

#[derive(Debug, Default)]
pub struct Connectivity {
    status: ConnectivityStatus,
    generation: u64,
}

impl Connectivity {
    #[must_use]
    pub fn status(&self) -> &ConnectivityStatus {
        &self.status
    }

    /// A standing connectivity error blocks sending (a merely unknown
    /// state does not; the send itself will surface any failure).
    #[must_use]
    pub fn blocks_sending(&self) -> bool {
        matches!(self.status, ConnectivityStatus::Error(_))
    }

    /// Start a new probe attempt, invalidating all earlier ones.
    pub fn begin_probe(&mut self) -> ProbeGeneration {
        self.generation += 1;
        ProbeGeneration(self.generation)
    }

    /// Forget any standing state, e.g. when the URL is cleared.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.status = ConnectivityStatus::Unknown;
    }

    /// Apply a finished probe. Returns `false` (and changes nothing) when
    /// the result belongs to a superseded generation.
    pub fn apply(&mut self, generation: ProbeGeneration, result: Result<(), String>) -> bool {
        if generation.0 != self.generation {
            tracing::debug!(
                probe = generation.0,
                current = self.generation,
                "discarding stale connectivity probe"
            );
            return false;
        }
        self.status = match result {
            Ok(()) => ConnectivityStatus::Ok,
            Err(e) => ConnectivityStatus::Error(e),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_probe_result_is_applied() {
        let mut conn = Connectivity::default();
        let probe = conn.begin_probe();
        assert!(conn.apply(probe, Ok(())));
        assert_eq!(*conn.status(), ConnectivityStatus::Ok);
        assert!(!conn.blocks_sending());
    }

    #[test]
    fn stale_probe_result_is_discarded() {
        let mut conn = Connectivity::default();
        let old = conn.begin_probe();
        let new = conn.begin_probe();

        // The newer probe finishes first...
        assert!(conn.apply(new, Ok(())));
        // ...and the slow response for the old URL must not clobber it.
        assert!(!conn.apply(old, Err("connection refused".into())));
        assert_eq!(*conn.status(), ConnectivityStatus::Ok);
    }

    #[test]
    fn error_blocks_until_a_newer_probe_succeeds() {
        let mut conn = Connectivity::default();
        let probe = conn.begin_probe();
        assert!(conn.apply(probe, Err("refused".into())));
        assert!(conn.blocks_sending());

        let probe = conn.begin_probe();
        // Starting a probe alone does not unblock; its result does.
        assert!(conn.blocks_sending());
        assert!(conn.apply(probe, Ok(())));
        assert!(!conn.blocks_sending());
    }

    #[test]
    fn reset_clears_state_and_invalidates_in_flight_probes() {
        let mut conn = Connectivity::default();
        let probe = conn.begin_probe();
        conn.reset();
        assert!(!conn.apply(probe, Err("refused".into())));
        assert_eq!(*conn.status(), ConnectivityStatus::Unknown);
    }
}
