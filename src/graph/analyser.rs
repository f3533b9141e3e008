use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::graph::node::{GraphNode, RenderCtx};

/*
Analysis Tap
============

The last node in the chain. It passes audio through untouched and writes
every output sample into a shared window of the last fft_size samples.
The control side copies that window into a SpectrumAnalyzer whenever it
wants a fresh picture.

  audio thread:    ... → master gain → AnalysisTap ──→ output
                                           │
                                  shared sample window
                                  (f32 bits in atomics)
                                           │
  control thread:             SpectrumAnalyzer::snapshot()

The window always holds the newest output. Old samples are overwritten,
so a reader that stalls sees current audio on its next snapshot, never a
backlog. A snapshot taken while a block is being written may mix a few
samples from two adjacent blocks.
*/

struct SharedWindow {
    samples: Box<[AtomicU32]>,
    /// Total samples ever written.
    written: AtomicU64,
}

/// Build a connected tap/analyzer pair.
pub fn analysis_pair(fft_size: usize, sample_rate: f32) -> (AnalysisTap, SpectrumAnalyzer) {
    let fft_size = fft_size.max(2);
    let window = Arc::new(SharedWindow {
        samples: (0..fft_size).map(|_| AtomicU32::new(0.0f32.to_bits())).collect(),
        written: AtomicU64::new(0),
    });
    (
        AnalysisTap {
            window: Arc::clone(&window),
            written: 0,
        },
        SpectrumAnalyzer::new(fft_size, sample_rate, window),
    )
}

pub struct AnalysisTap {
    window: Arc<SharedWindow>,
    written: u64,
}

impl GraphNode for AnalysisTap {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        let len = self.window.samples.len();
        // Only the tail of an oversized block can survive in the window.
        let skip = out.len().saturating_sub(len);
        self.written += skip as u64;

        for &sample in &out[skip..] {
            let slot = (self.written % len as u64) as usize;
            self.window.samples[slot].store(sample.to_bits(), Ordering::Relaxed);
            self.written += 1;
        }
        self.window.written.store(self.written, Ordering::Release);
    }
}

/// FFT magnitude snapshot of the most recent output.
pub struct SpectrumAnalyzer {
    shared: Arc<SharedWindow>,
    /// Hann window coefficients
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    sample_rate: f32,
}

impl SpectrumAnalyzer {
    /// Floor reported for empty bins.
    pub const MIN_DB: f32 = -120.0;

    fn new(fft_size: usize, sample_rate: f32, shared: Arc<SharedWindow>) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Hann window - reduces spectral leakage
        let denom = (fft_size - 1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos()))
            .collect();

        Self {
            shared,
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            sample_rate,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Centre frequency of bin `index` in Hz.
    pub fn bin_frequency(&self, index: usize) -> f32 {
        index as f32 * self.sample_rate / self.fft_size() as f32
    }

    /// Magnitudes in dB for the lower half of the spectrum (fft_size / 2 bins).
    pub fn snapshot(&mut self) -> Vec<f32> {
        let len = self.fft_size();
        // Oldest sample of the window sits at the next write position.
        let oldest = (self.shared.written.load(Ordering::Acquire) % len as u64) as usize;
        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let bits = self.shared.samples[(oldest + i) % len].load(Ordering::Relaxed);
            slot.re = f32::from_bits(bits) * self.window[i];
            slot.im = 0.0;
        }
        self.fft.process(&mut self.scratch);

        let norm = 2.0 / self.fft_size() as f32;
        self.scratch[..self.fft_size() / 2]
            .iter()
            .map(|bin| {
                let magnitude = bin.norm() * norm;
                if magnitude > 0.0 {
                    (20.0 * magnitude.log10()).max(Self::MIN_DB)
                } else {
                    Self::MIN_DB
                }
            })
            .collect()
    }
}
