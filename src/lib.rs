//! Rolling microphone loudness monitor
//!
//! Samples a live input stream and reduces it to a single polled
//! loudness value: each spectrum snapshot from the capture backend is
//! clamped, reduced to an RMS reading and appended to a bounded window;
//! [`LevelMonitor::volume`] averages the most recent window on demand.
//!
//! The capture backend sits behind the [`SpectrumSource`] trait; the
//! default `capture` feature provides a cpal-backed implementation.
//!
//! ```no_run
//! use decibel_monitor::{LevelMonitor, MonitorConfig};
//!
//! # #[cfg(feature = "capture")]
//! # async fn run() -> decibel_monitor::Result<()> {
//! let mut monitor = LevelMonitor::from_config(MonitorConfig::default())?;
//! monitor.connect().await?;
//! let db = monitor.volume()?;
//! monitor.disconnect();
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "capture")]
pub mod capture;
pub mod config;
pub mod constants;
pub mod error;
pub mod monitor;
pub mod spectrum;
pub mod window;

#[cfg(feature = "capture")]
pub use capture::CpalSpectrumSource;
pub use config::MonitorConfig;
pub use error::{Error, Result};
pub use monitor::{LevelMonitor, SpectrumSink, SpectrumSource};
pub use spectrum::SpectrumAnalyzer;
