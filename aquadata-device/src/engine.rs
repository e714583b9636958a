//! Command channel engine
//!
//! Owns the framer, the link state and the collaborator set, and implements
//! [`LinkEvents`] so the radio glue has a single object to route callbacks
//! into. Everything runs on the platform's one callback context: while a
//! provisioning attempt is polling, no other inbound record is framed or
//! dispatched, and the idle loop is starved. One attempt at a time is the
//! accepted trade-off on this class of hardware.

use std::fmt::Debug;

use aquadata_proto::{Command, Framer, ParseError, Response, WifiConfig};
use log::{debug, info, warn};

use crate::link::{Clock, LinkEvents, LinkState, Transmitter};
use crate::provision::{Attempt, Outcome, POLL_INTERVAL_MS};
use crate::storage::Storage;
use crate::telemetry::{Sensors, Telemetry, TELEMETRY_INTERVAL_MS};
use crate::wifi::Wifi;

/// Cadence of the keep-alive record while attached and idle, in milliseconds.
pub const HEARTBEAT_INTERVAL_MS: u64 = 10_000;

/// The firmware-side command channel engine.
pub struct Engine<W, T, C, S, P> {
    framer: Framer,
    link: LinkState,
    telemetry: Telemetry,
    start_ms: u64,
    last_heartbeat_ms: u64,
    last_sample_ms: u64,
    wifi: W,
    tx: T,
    clock: C,
    storage: S,
    sensors: P,
}

impl<W, T, C, S, P> Engine<W, T, C, S, P>
where
    W: Wifi,
    W::Error: Debug,
    T: Transmitter,
    T::Error: Debug,
    C: Clock,
    S: Storage,
    S::Error: Debug,
    P: Sensors,
{
    pub fn new(wifi: W, tx: T, clock: C, storage: S, sensors: P) -> Self {
        let start_ms = clock.now_ms();
        Self {
            framer: Framer::new(),
            link: LinkState::new(),
            telemetry: Telemetry::new(),
            start_ms,
            last_heartbeat_ms: start_ms,
            last_sample_ms: start_ms,
            wifi,
            tx,
            clock,
            storage,
            sensors,
        }
    }

    /// Handle to the shared attachment flag, for the radio glue and status
    /// indicators.
    pub fn link_state(&self) -> LinkState {
        self.link.clone()
    }

    pub fn wifi(&self) -> &W {
        &self.wifi
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replay stored credentials at boot, before any central attaches.
    ///
    /// Nothing is emitted; there is nobody to hear it yet. Returns whether
    /// the join succeeded.
    pub fn auto_connect(&mut self) -> bool {
        let (ssid, password) = match self.storage.get_wifi_credentials() {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return false,
            Err(e) => {
                warn!("stored credentials could not be read: {e:?}");
                return false;
            }
        };

        info!("auto-connecting to {ssid}");
        let mut attempt = Attempt::new(&ssid, &password);
        if let Err(e) = attempt.start(&mut self.wifi) {
            warn!("auto-connect could not be started: {e:?}");
            return false;
        }
        match self.run_attempt(&mut attempt, false) {
            Some(Outcome::Joined) => {
                info!("auto-connected to {ssid}");
                true
            }
            _ => {
                warn!("auto-connect to {ssid} failed");
                false
            }
        }
    }

    /// Periodic entry point from the platform idle loop.
    ///
    /// Emits the keep-alive record and a telemetry record on their own
    /// cadences while a central is attached.
    pub fn idle(&mut self) {
        if !self.link.is_attached() {
            return;
        }

        let now = self.clock.now_ms();
        if now.saturating_sub(self.last_heartbeat_ms) >= HEARTBEAT_INTERVAL_MS {
            self.last_heartbeat_ms = now;
            self.emit(&Response::heartbeat());
        }
        if now.saturating_sub(self.last_sample_ms) >= TELEMETRY_INTERVAL_MS {
            self.last_sample_ms = now;
            let sample = self.sensors.sample();
            let readings = self.telemetry.build_readings(
                sample,
                now.saturating_sub(self.start_ms),
                self.wifi.is_connected(),
            );
            self.emit(&Response::SensorData(readings));
        }
    }

    /// Route one complete record; `None` when no response should go out
    /// (attempt cancelled by a detach).
    fn handle_record(&mut self, record: &str) -> Option<Response> {
        info!("command received: {record}");
        match Command::parse(record) {
            Ok(Command::WifiConfig(config)) => self.provision(config),
            Err(ParseError::InvalidJson(e)) => {
                warn!("command decode failed: {e}");
                Some(Response::invalid_json())
            }
            Err(ParseError::UnknownType(found)) => {
                warn!("unknown command type: {found:?}");
                Some(Response::unknown_command())
            }
        }
    }

    /// Drive one provisioning attempt to a terminal outcome.
    ///
    /// The progress record goes out before the join starts; the terminal
    /// record is returned to the dispatch path so ordering holds.
    fn provision(&mut self, config: WifiConfig) -> Option<Response> {
        let WifiConfig { ssid, password } = config;
        info!("provisioning requested for SSID {ssid:?}");
        self.emit(&Response::provisioning_started(&ssid));

        let mut attempt = Attempt::new(&ssid, &password);
        if let Err(e) = attempt.start(&mut self.wifi) {
            warn!("join could not be started: {e:?}");
            return Some(Response::provisioning_failed(&ssid));
        }

        match self.run_attempt(&mut attempt, true) {
            Some(Outcome::Joined) => {
                info!("joined {ssid}");
                if let Err(e) = self.storage.set_wifi_credentials(&ssid, &password) {
                    warn!("credentials could not be persisted: {e:?}");
                }
                Some(Response::provisioned(&ssid))
            }
            Some(Outcome::TimedOut) => {
                warn!("join to {ssid} timed out");
                Some(Response::provisioning_failed(&ssid))
            }
            None => None,
        }
    }

    /// Poll the attempt at the fixed cadence until it is terminal.
    ///
    /// With `cancel_on_detach`, a detach observed between polls tears the
    /// join down and returns `None`; auto-connect runs with it off since no
    /// central is attached at boot.
    fn run_attempt(&mut self, attempt: &mut Attempt, cancel_on_detach: bool) -> Option<Outcome> {
        loop {
            self.clock.sleep_ms(POLL_INTERVAL_MS);

            if cancel_on_detach && !self.link.is_attached() {
                info!("central detached mid-attempt, tearing down the join");
                if let Err(e) = attempt.cancel(&mut self.wifi) {
                    warn!("join teardown failed: {e:?}");
                }
                return None;
            }

            match attempt.poll(&mut self.wifi) {
                Ok(None) => {}
                Ok(Some(outcome)) => return Some(outcome),
                Err(e) => {
                    warn!("join status poll failed: {e:?}");
                    if let Err(e) = attempt.cancel(&mut self.wifi) {
                        warn!("join teardown failed: {e:?}");
                    }
                    return Some(Outcome::TimedOut);
                }
            }
        }
    }

    /// Serialize and notify; a no-op while detached.
    ///
    /// Delivery failures are logged, never propagated - there is no return
    /// channel to surface them on.
    fn emit(&mut self, response: &Response) {
        if !self.link.is_attached() {
            debug!("no central attached, dropping outbound record");
            return;
        }
        let record = response.to_record();
        if let Err(e) = self.tx.notify(record.as_bytes()) {
            warn!("notify failed: {e:?}");
        }
    }
}

impl<W, T, C, S, P> LinkEvents for Engine<W, T, C, S, P>
where
    W: Wifi,
    W::Error: Debug,
    T: Transmitter,
    T::Error: Debug,
    C: Clock,
    S: Storage,
    S::Error: Debug,
    P: Sensors,
{
    fn on_attach(&mut self) {
        info!("central attached");
        self.link.set_attached(true);
    }

    fn on_detach(&mut self) {
        info!("central detached");
        self.link.set_attached(false);
        // partial records from the old connection must not leak into the next
        self.framer.clear();
    }

    fn on_inbound_fragment(&mut self, fragment: &[u8]) {
        if let Err(e) = self.framer.push(fragment) {
            warn!("{e}");
        }
        while let Some(record) = self.framer.next_record() {
            if let Some(response) = self.handle_record(&record) {
                self.emit(&response);
            }
        }
    }
}
