//! Remote tempo polling
//!
//! The only concurrency in the system: one background thread polls a local
//! HTTP endpoint for the currently playing track and publishes the latest
//! snapshot behind a mutex. The simulation thread locks, copies, unlocks -
//! it never blocks on the network. Shutdown is a running flag checked
//! between iterations plus a join.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Deserialize;

use super::TempoSource;

/// Default local endpoint serving the current track
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8888/current";
/// Default poll interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Latest known state of the remote player
#[derive(Debug, Clone, Default)]
pub struct TrackSnapshot {
    /// Track tempo in BPM; 0 when nothing is known
    pub bpm: f32,
    pub is_playing: bool,
    pub track_name: String,
}

/// Wire format of the `/current` endpoint
#[derive(Debug, Deserialize)]
struct TrackPayload {
    #[serde(default)]
    tempo: f32,
    #[serde(default)]
    is_playing: bool,
    #[serde(default)]
    name: String,
}

struct Shared {
    running: AtomicBool,
    snapshot: Mutex<TrackSnapshot>,
}

/// Background poller for a remote tempo endpoint
pub struct RemoteTempo {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl RemoteTempo {
    /// Spawn the poll thread against `endpoint`, polling every `interval`
    pub fn start(endpoint: String, interval: Duration) -> Self {
        let shared = Arc::new(Shared {
            running: AtomicBool::new(true),
            snapshot: Mutex::new(TrackSnapshot::default()),
        });

        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::spawn(move || {
            let agent = ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_millis(500))
                .timeout(Duration::from_secs(1))
                .build();
            log::info!("tempo polling started against {endpoint}");

            while thread_shared.running.load(Ordering::Relaxed) {
                match poll_once(&agent, &endpoint) {
                    Ok(snapshot) => {
                        let mut latest = thread_shared
                            .snapshot
                            .lock()
                            .unwrap_or_else(|poisoned| poisoned.into_inner());
                        *latest = snapshot;
                    }
                    // Keep the previous snapshot on any failure; the
                    // endpoint being down is normal when no song plays
                    Err(e) => log::debug!("tempo poll failed: {e}"),
                }
                std::thread::sleep(interval);
            }
            log::info!("tempo polling stopped");
        });

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Copy of the latest published snapshot
    pub fn snapshot(&self) -> TrackSnapshot {
        self.shared
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Flag the poll thread down and join it. Returns within one poll
    /// interval.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl TempoSource for RemoteTempo {
    fn current_bpm(&self) -> f32 {
        let snap = self.snapshot();
        if snap.is_playing { snap.bpm } else { 0.0 }
    }
}

impl Drop for RemoteTempo {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_once(agent: &ureq::Agent, endpoint: &str) -> Result<TrackSnapshot, String> {
    let response = agent
        .get(endpoint)
        .call()
        .map_err(|e| format!("request failed: {e}"))?;

    let payload: TrackPayload = response
        .into_json()
        .map_err(|e| format!("bad payload: {e}"))?;

    Ok(TrackSnapshot {
        bpm: payload.tempo.max(0.0),
        is_playing: payload.is_playing,
        track_name: payload.name,
    })
}
