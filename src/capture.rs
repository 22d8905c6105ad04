//! Microphone capture via cpal
//!
//! A [`CpalSpectrumSource`] owns the input stream on a dedicated thread
//! (cpal streams are not `Send`) and feeds blocks of mono samples
//! through a [`SpectrumAnalyzer`], delivering one byte-magnitude
//! snapshot per block to the monitor's sink.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::monitor::{SpectrumSink, SpectrumSource};
use crate::spectrum::SpectrumAnalyzer;

/// Production [`SpectrumSource`] backed by the default input device
pub struct CpalSpectrumSource {
    fft_size: usize,
    smoothing: f32,

    /// Whether the capture thread should keep its stream alive
    running: Arc<AtomicBool>,

    /// Capture thread handle, live between start and stop
    thread_handle: Option<JoinHandle<()>>,

    /// Channel for mid-stream errors reported by the backend
    error_rx: Option<Receiver<Error>>,
}

impl CpalSpectrumSource {
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fft_size: config.fft_size,
            smoothing: config.smoothing,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            error_rx: None,
        })
    }

    /// Drain one mid-stream error, if the backend reported any
    pub fn check_errors(&self) -> Option<Error> {
        self.error_rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }
}

impl SpectrumSource for CpalSpectrumSource {
    fn start(&mut self, sink: SpectrumSink) -> oneshot::Receiver<Result<()>> {
        // A stale thread from an unbalanced start would hold the device
        if self.thread_handle.is_some() {
            self.stop();
        }

        let (ready_tx, ready_rx) = oneshot::channel();
        let (error_tx, error_rx) = bounded::<Error>(16);
        self.error_rx = Some(error_rx);

        self.running.store(true, Ordering::SeqCst);
        let running_for_loop = self.running.clone();

        let fft_size = self.fft_size;
        let smoothing = self.smoothing;

        let handle = thread::Builder::new()
            .name("spectrum-capture".to_string())
            .spawn(move || {
                match build_stream(fft_size, smoothing, sink, error_tx) {
                    Ok(stream) => {
                        if let Err(e) = stream.play() {
                            let _ = ready_tx.send(Err(Error::Stream(e.to_string())));
                            return;
                        }
                        let _ = ready_tx.send(Ok(()));

                        // Keep the stream alive until stopped
                        while running_for_loop.load(Ordering::Relaxed) {
                            thread::sleep(Duration::from_millis(10));
                        }
                        // Stream drops here, hardware released
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            });

        match handle {
            Ok(handle) => self.thread_handle = Some(handle),
            Err(e) => {
                // ready_tx went down with the closure; the receiver
                // resolves as a dropped sender
                tracing::error!("failed to spawn capture thread: {}", e);
                self.running.store(false, Ordering::SeqCst);
            }
        }

        ready_rx
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.error_rx = None;
    }
}

impl Drop for CpalSpectrumSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Acquire the default input device and build the capture stream
fn build_stream(
    fft_size: usize,
    smoothing: f32,
    sink: SpectrumSink,
    error_tx: Sender<Error>,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| Error::DeviceUnavailable("no default input device".to_string()))?;

    let supported = device.default_input_config().map_err(|e| match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => {
            Error::DeviceUnavailable("input device went away during setup".to_string())
        }
        other => Error::Stream(other.to_string()),
    })?;

    let channels = supported.channels() as usize;
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();

    tracing::info!(
        "capturing from '{}': {} ch @ {} Hz, format {:?}",
        device.name().unwrap_or_else(|_| "<unknown>".to_string()),
        channels,
        config.sample_rate.0,
        sample_format,
    );

    match sample_format {
        cpal::SampleFormat::F32 => {
            build_typed::<f32>(&device, &config, channels, fft_size, smoothing, sink, error_tx)
        }
        cpal::SampleFormat::I16 => {
            build_typed::<i16>(&device, &config, channels, fft_size, smoothing, sink, error_tx)
        }
        cpal::SampleFormat::U16 => {
            build_typed::<u16>(&device, &config, channels, fft_size, smoothing, sink, error_tx)
        }
        other => Err(Error::Stream(format!(
            "unsupported sample format {:?}",
            other
        ))),
    }
}

fn build_typed<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    fft_size: usize,
    smoothing: f32,
    sink: SpectrumSink,
    error_tx: Sender<Error>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let mut analyzer = SpectrumAnalyzer::new(fft_size, smoothing);
    let mut block: Vec<f32> = Vec::with_capacity(fft_size);
    let mut bins = vec![0u8; fft_size / 2];

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // channel 0 of the interleaved input
                for &sample in data.iter().step_by(channels) {
                    block.push(f32::from_sample(sample));
                    if block.len() == fft_size {
                        analyzer.byte_frequency_data(&block, &mut bins);
                        sink(&bins);
                        block.clear();
                    }
                }
            },
            move |err| {
                let _ = error_tx.try_send(Error::Stream(err.to_string()));
            },
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                Error::DeviceUnavailable("input device went away during setup".to_string())
            }
            other => Error::Stream(other.to_string()),
        })?;

    Ok(stream)
}
