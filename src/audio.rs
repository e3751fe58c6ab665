use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use spectrum_analyzer::{
    FrequencyLimit, samples_fft_to_spectrum, scaling::divide_by_N, windows::hann_window,
};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use sparkbars::DecibelSource;

const BUFFER_LEN: usize = 4096;
const WINDOW_LEN: usize = 2048;

/// Loopback capture of the default output device, kept as a rolling sample buffer.
pub struct AudioCapture {
    _stream: cpal::Stream,
    samples: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
}

impl AudioCapture {
    pub fn start() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No output device found")?;
        info!(device = %device.description()?, "capturing audio");

        let config: cpal::StreamConfig = device
            .default_output_config()
            .context("Failed to query output config")?
            .into();

        let samples = Arc::new(Mutex::new(Vec::with_capacity(BUFFER_LEN * 2)));
        let samples_clone = samples.clone();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &_| {
                    if let Ok(mut s) = samples_clone.lock() {
                        s.extend_from_slice(data);
                        if s.len() > BUFFER_LEN {
                            let keep = s.len() - BUFFER_LEN;
                            s.drain(0..keep);
                        }
                    }
                },
                |err| warn!(%err, "audio stream error"),
                None,
            )
            .context("Failed to build capture stream")?;
        stream.play().context("Failed to start capture stream")?;

        Ok(Self {
            _stream: stream,
            samples,
            sample_rate: config.sample_rate,
        })
    }

    /// Spectrum of the most recent window, or `None` until enough audio arrived.
    pub fn spectrum(&self) -> Option<SpectrumFrame> {
        let window = {
            let s = self.samples.lock().ok()?;
            if s.len() < WINDOW_LEN {
                return None;
            }
            hann_window(&s[s.len() - WINDOW_LEN..])
        };

        let spectrum = samples_fft_to_spectrum(
            &window,
            self.sample_rate,
            FrequencyLimit::Range(20., 20_000.),
            Some(&divide_by_N),
        )
        .ok()?;

        Some(SpectrumFrame::from_magnitudes(
            spectrum
                .to_map()
                .into_iter()
                .map(|(freq, val)| (freq as f32, val)),
        ))
    }
}

/// One analysed window as decibels relative to its loudest bin.
#[derive(Debug, Clone, Default)]
pub struct SpectrumFrame {
    /// `(frequency, dB)` sorted by frequency.
    bins: Vec<(f32, f32)>,
}

impl SpectrumFrame {
    pub const FLOOR_DB: f32 = -80.0;

    /// Converts magnitudes to `20 * log10(m / max)`, floored at [`Self::FLOOR_DB`].
    pub fn from_magnitudes(magnitudes: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut bins: Vec<(f32, f32)> = magnitudes.into_iter().collect();
        bins.sort_by(|a, b| a.0.total_cmp(&b.0));

        let max = bins.iter().map(|(_, m)| *m).fold(0.0f32, f32::max);
        for (_, value) in &mut bins {
            *value = if max > 0.0 && *value > 0.0 {
                (20.0 * (*value / max).log10()).max(Self::FLOOR_DB)
            } else {
                Self::FLOOR_DB
            };
        }
        Self { bins }
    }
}

impl DecibelSource for SpectrumFrame {
    /// Level of the analysed bin closest to `frequency`.
    fn decibel(&self, frequency: f32) -> f32 {
        let upper = self.bins.partition_point(|(f, _)| *f < frequency);
        let candidates = [upper.checked_sub(1), Some(upper)];
        candidates
            .into_iter()
            .flatten()
            .filter_map(|i| self.bins.get(i))
            .min_by(|a, b| (a.0 - frequency).abs().total_cmp(&(b.0 - frequency).abs()))
            .map_or(Self::FLOOR_DB, |(_, db)| *db)
    }
}
