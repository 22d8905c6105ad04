//! Rolling loudness monitor
//!
//! Owns a bounded window of recent readings and the connect/disconnect
//! lifecycle. Readings arrive from a [`SpectrumSource`] callback at
//! whatever cadence the backend dictates; consumers poll [`LevelMonitor::volume`]
//! at their own pace and get a sliding-window average.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::config::MonitorConfig;
use crate::constants::MAX_BIN_MAGNITUDE;
use crate::error::{Error, Result};
use crate::window::SampleWindow;

/// Callback receiving one magnitude snapshot per capture frame
pub type SpectrumSink = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Capture backend: delivers fixed-size byte magnitude snapshots of the
/// current frequency spectrum until stopped.
///
/// Implementations own the device and processing graph exclusively
/// between `start` and `stop`.
pub trait SpectrumSource: Send {
    /// Begin capture, delivering snapshots to `sink`.
    ///
    /// The returned receiver resolves once the device is acquired and
    /// the stream is live, or with the setup failure. A dropped sender
    /// counts as failure.
    fn start(&mut self, sink: SpectrumSink) -> oneshot::Receiver<Result<()>>;

    /// Stop the stream and release the device. Idempotent.
    fn stop(&mut self);
}

/// Reduce one spectrum snapshot to a single loudness reading: each bin
/// saturates at [`MAX_BIN_MAGNITUDE`] so transient clicks cannot
/// dominate, then the RMS is taken across all bins.
pub fn reduce_bins(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for &bin in bins {
        let clamped = bin.min(MAX_BIN_MAGNITUDE) as f32;
        sum += clamped * clamped;
    }
    (sum / bins.len() as f32).sqrt()
}

/// State shared between the monitor and the capture callback
struct Shared {
    /// Whether a capture graph is live; gates both ingestion and polling
    connected: AtomicBool,

    /// Offset added to each reading at ingest time, in dB
    offset_db: RwLock<f32>,

    /// Recent readings, bounded at twice the averaging window
    samples: Mutex<SampleWindow>,
}

impl Shared {
    /// Append one reading while connected; drops it otherwise, so
    /// callbacks racing connect/disconnect cannot leak stale data in.
    fn push_reading(&self, reading: f32) {
        if !self.connected.load(Ordering::Relaxed) {
            return;
        }
        self.samples.lock().push(reading);
    }

    fn ingest(&self, bins: &[u8]) {
        let reading = reduce_bins(bins) + *self.offset_db.read();
        self.push_reading(reading);
    }
}

/// Microphone loudness monitor
///
/// Created once, restartable: connect and disconnect may alternate any
/// number of times, each connection starting from an empty window.
pub struct LevelMonitor {
    shared: Arc<Shared>,
    source: Box<dyn SpectrumSource>,
    window_capacity: usize,
}

impl LevelMonitor {
    /// Create a monitor driven by the given capture backend
    pub fn new(config: MonitorConfig, source: Box<dyn SpectrumSource>) -> Result<Self> {
        config.validate()?;
        let window_capacity = config.window_capacity();
        let shared = Arc::new(Shared {
            connected: AtomicBool::new(false),
            offset_db: RwLock::new(config.offset_db),
            // Twice the window, so a poll arriving slightly late never
            // starves while memory stays O(window)
            samples: Mutex::new(SampleWindow::new(window_capacity * 2)),
        });
        Ok(Self {
            shared,
            source,
            window_capacity,
        })
    }

    /// Create a monitor backed by the default input device
    #[cfg(feature = "capture")]
    pub fn from_config(config: MonitorConfig) -> Result<Self> {
        let source = crate::capture::CpalSpectrumSource::new(&config)?;
        Self::new(config, Box::new(source))
    }

    /// Connect to the input device and start ingesting readings.
    ///
    /// Suspends until the backend has acquired the device and the
    /// stream is live. Fails with [`Error::AlreadyConnected`] when a
    /// capture graph is already running; a second graph is never built.
    /// On any setup failure the monitor stays disconnected with no
    /// partial resources retained.
    pub async fn connect(&mut self) -> Result<()> {
        if self.shared.connected.load(Ordering::SeqCst) {
            return Err(Error::AlreadyConnected);
        }

        // Drop anything left over from a previous session
        self.shared.samples.lock().clear();

        let shared = Arc::clone(&self.shared);
        let sink: SpectrumSink = Arc::new(move |bins| shared.ingest(bins));

        let ready = self.source.start(sink);
        match ready.await {
            Ok(Ok(())) => {
                self.shared.connected.store(true, Ordering::SeqCst);
                tracing::info!("capture connected");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!("capture setup failed: {}", e);
                self.source.stop();
                Err(e)
            }
            Err(_) => {
                tracing::error!("capture setup aborted without reporting");
                self.source.stop();
                Err(Error::Stream("capture setup aborted".to_string()))
            }
        }
    }

    /// Stop capture, release the device and empty the window.
    ///
    /// Safe from any state and safe to call repeatedly.
    pub fn disconnect(&mut self) {
        self.shared.connected.store(false, Ordering::SeqCst);
        self.source.stop();
        self.shared.samples.lock().clear();
    }

    /// Average loudness over the most recent window, rounded to the
    /// nearest integer dB.
    ///
    /// Fails with [`Error::NotConnected`] while disconnected, so a
    /// missing connection is never mistaken for silence. An empty
    /// window (no callback has fired yet) reads 0, as does a
    /// degenerate non-finite average. Polling never consumes readings;
    /// the window slides as new samples arrive.
    pub fn volume(&self) -> Result<i32> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let samples = self.shared.samples.lock();
        if samples.is_empty() {
            return Ok(0);
        }
        let mean = samples.recent_mean(self.window_capacity);
        if !mean.is_finite() {
            return Ok(0);
        }
        Ok(mean.round() as i32)
    }

    /// Offset currently applied to new readings, in dB
    pub fn offset_db(&self) -> f32 {
        *self.shared.offset_db.read()
    }

    /// Change the offset; takes effect from the next reading on, never
    /// retroactively.
    pub fn set_offset_db(&self, offset_db: f32) {
        *self.shared.offset_db.write() = offset_db;
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }
}

impl Drop for LevelMonitor {
    fn drop(&mut self) {
        self.disconnect();
    }
}
