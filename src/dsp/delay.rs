/// Circular delay line with fractional (linearly interpolated) reads.
///
/// Read before write: `read_interpolated(d)` returns the input from `d`
/// samples ago, then `write` pushes the current input.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Allocate room for `max_delay_samples` of history.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(4)],
            write_pos: 0,
        }
    }

    /// Size the line for `seconds` of history at `sample_rate`.
    pub fn with_max_seconds(seconds: f32, sample_rate: f32) -> Self {
        Self::new((seconds * sample_rate).ceil() as usize + 2)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Sample written exactly `delay` samples ago (1 = the previous write).
    #[inline]
    fn tap(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        self.buffer[(self.write_pos + len - delay) % len]
    }

    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let max = (self.buffer.len() - 2) as f32;
        let delay = delay_samples.clamp(1.0, max);

        let whole = delay.floor();
        let frac = delay - whole;
        let whole = whole as usize;

        let a = self.tap(whole);
        let b = self.tap(whole + 1);
        a + (b - a) * frac
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
