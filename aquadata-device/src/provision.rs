//! Bounded-retry WiFi join state machine
//!
//! One [`Attempt`] is built per `wifi_config` command and discarded once
//! its terminal response is sent; nothing here survives across commands.
//! The engine drives it: start, then poll at a fixed cadence until it
//! reports a terminal outcome or the central detaches.

use crate::wifi::Wifi;

/// Poll cadence against the join primitive, in milliseconds.
pub const POLL_INTERVAL_MS: u32 = 500;

/// Polls before a join attempt is declared dead (~15s total wait).
pub const MAX_POLLS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Connecting { polls: u32 },
    Joined,
    TimedOut,
}

/// Terminal result of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Joined,
    TimedOut,
}

/// One provisioning attempt against the join primitive.
#[derive(Debug)]
pub struct Attempt {
    ssid: String,
    password: String,
    state: AttemptState,
}

impl Attempt {
    pub fn new(ssid: &str, password: &str) -> Self {
        Self {
            ssid: ssid.to_string(),
            password: password.to_string(),
            state: AttemptState::Idle,
        }
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Clear any prior association and kick off the join.
    ///
    /// The disconnect is idempotent; it is safe when no association exists.
    pub fn start<W: Wifi>(&mut self, wifi: &mut W) -> Result<(), W::Error> {
        wifi.disconnect()?;
        wifi.connect(&self.ssid, &self.password)?;
        self.state = AttemptState::Connecting { polls: 0 };
        Ok(())
    }

    /// One status poll; `Some` once the attempt reaches a terminal state.
    ///
    /// On timeout the half-joined association is torn down so it cannot
    /// complete asynchronously after the failure response has been sent.
    pub fn poll<W: Wifi>(&mut self, wifi: &mut W) -> Result<Option<Outcome>, W::Error> {
        let polls = match self.state {
            AttemptState::Connecting { polls } => polls,
            AttemptState::Joined => return Ok(Some(Outcome::Joined)),
            AttemptState::TimedOut => return Ok(Some(Outcome::TimedOut)),
            AttemptState::Idle => return Ok(None),
        };

        if wifi.is_connected() {
            self.state = AttemptState::Joined;
            return Ok(Some(Outcome::Joined));
        }

        let polls = polls + 1;
        if polls >= MAX_POLLS {
            self.state = AttemptState::TimedOut;
            wifi.disconnect()?;
            return Ok(Some(Outcome::TimedOut));
        }

        self.state = AttemptState::Connecting { polls };
        Ok(None)
    }

    /// Tear down an in-flight join when nobody is left to hear the outcome.
    pub fn cancel<W: Wifi>(&mut self, wifi: &mut W) -> Result<(), W::Error> {
        if matches!(self.state, AttemptState::Connecting { .. }) {
            wifi.disconnect()?;
            self.state = AttemptState::Idle;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;

    use super::*;
    use crate::wifi::WifiStatus;

    #[derive(Default)]
    struct StubWifi {
        joins_on_poll: Option<u32>,
        status_calls: Cell<u32>,
        connect_calls: u32,
        disconnect_calls: u32,
    }

    impl Wifi for StubWifi {
        type Error = Infallible;

        fn connect(&mut self, _ssid: &str, _password: &str) -> Result<(), Infallible> {
            self.connect_calls += 1;
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), Infallible> {
            self.disconnect_calls += 1;
            Ok(())
        }

        fn status(&self) -> WifiStatus {
            let polls = self.status_calls.get() + 1;
            self.status_calls.set(polls);
            match self.joins_on_poll {
                Some(n) if polls >= n => WifiStatus::Connected,
                _ => WifiStatus::Connecting,
            }
        }
    }

    #[test]
    fn start_resets_the_prior_association_before_joining() {
        let mut wifi = StubWifi::default();
        let mut attempt = Attempt::new("Home", "abc");
        attempt.start(&mut wifi).unwrap();

        assert_eq!(wifi.disconnect_calls, 1);
        assert_eq!(wifi.connect_calls, 1);
        assert_eq!(attempt.state(), AttemptState::Connecting { polls: 0 });
    }

    #[test]
    fn joins_on_the_first_poll() {
        let mut wifi = StubWifi {
            joins_on_poll: Some(1),
            ..Default::default()
        };
        let mut attempt = Attempt::new("Home", "abc");
        attempt.start(&mut wifi).unwrap();

        assert_eq!(attempt.poll(&mut wifi).unwrap(), Some(Outcome::Joined));
        assert_eq!(attempt.state(), AttemptState::Joined);
        assert_eq!(wifi.disconnect_calls, 1);
    }

    #[test]
    fn times_out_after_exactly_thirty_polls_and_tears_down() {
        let mut wifi = StubWifi::default();
        let mut attempt = Attempt::new("Home", "abc");
        attempt.start(&mut wifi).unwrap();

        for _ in 0..MAX_POLLS - 1 {
            assert_eq!(attempt.poll(&mut wifi).unwrap(), None);
        }
        assert_eq!(attempt.poll(&mut wifi).unwrap(), Some(Outcome::TimedOut));
        assert_eq!(attempt.state(), AttemptState::TimedOut);
        assert_eq!(wifi.status_calls.get(), MAX_POLLS);
        // reset before the join plus the timeout teardown
        assert_eq!(wifi.disconnect_calls, 2);
    }

    #[test]
    fn cancel_tears_down_only_an_in_flight_join() {
        let mut wifi = StubWifi::default();
        let mut attempt = Attempt::new("Home", "abc");

        attempt.cancel(&mut wifi).unwrap();
        assert_eq!(wifi.disconnect_calls, 0);

        attempt.start(&mut wifi).unwrap();
        attempt.cancel(&mut wifi).unwrap();
        assert_eq!(wifi.disconnect_calls, 2);
        assert_eq!(attempt.state(), AttemptState::Idle);
    }

    #[test]
    fn polling_before_start_does_nothing() {
        let mut wifi = StubWifi {
            joins_on_poll: Some(1),
            ..Default::default()
        };
        let mut attempt = Attempt::new("Home", "abc");
        assert_eq!(attempt.poll(&mut wifi).unwrap(), None);
        assert_eq!(wifi.status_calls.get(), 0);
    }
}
