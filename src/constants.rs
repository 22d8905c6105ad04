//! Default tunables shared across the crate

/// Length of the averaging window handed back by `volume()`, in ms
pub const DEFAULT_SAMPLE_WINDOW_MS: u32 = 2000;

/// Assumed cadence of spectrum callbacks, readings per second.
///
/// This is a calibration estimate, not a measurement: the true rate is
/// dictated by the capture backend. It only converts the window length
/// into a sample count.
pub const DEFAULT_READINGS_PER_SEC: u32 = 25;

/// Default offset added to every reading, in dB
pub const DEFAULT_OFFSET_DB: f32 = 0.0;

/// Exponential smoothing factor applied to analyser magnitudes
pub const DEFAULT_SMOOTHING: f32 = 0.8;

/// Default FFT size; yields `DEFAULT_FFT_SIZE / 2` magnitude bins
pub const DEFAULT_FFT_SIZE: usize = 256;

/// Ceiling applied to each byte magnitude bin before the RMS, so a
/// transient click cannot dominate the aggregate
pub const MAX_BIN_MAGNITUDE: u8 = 120;

/// Analyser dB range mapped onto the 0-255 byte scale
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;
