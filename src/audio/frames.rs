//! Slicing a signal into overlapping, optionally windowed frames.

/// Symmetric Hann window, `w[n] = 0.5 - 0.5 * cos(2πn / (N - 1))`.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}

/// Number of frames produced for `len` samples.
///
/// A signal shorter than one frame still yields a single, zero-padded frame.
pub fn frame_count(len: usize, frame_length: usize, hop_length: usize) -> usize {
    if len < frame_length {
        1
    } else {
        len.div_ceil(hop_length)
    }
}

/// Lazy frame sequence over a sample slice.
///
/// Cloning restarts the sequence; every frame is exactly `frame_length`
/// samples long, zero-padded past the end of the signal.
#[derive(Clone, Debug)]
pub struct Frames<'a> {
    samples: &'a [f32],
    frame_length: usize,
    hop_length: usize,
    window: Option<&'a [f32]>,
    next: usize,
    count: usize,
}

impl<'a> Frames<'a> {
    /// Frames of the raw samples.
    pub fn raw(samples: &'a [f32], frame_length: usize, hop_length: usize) -> Self {
        Self {
            samples,
            frame_length,
            hop_length,
            window: None,
            next: 0,
            count: frame_count(samples.len(), frame_length, hop_length),
        }
    }

    /// Frames multiplied element-wise by `window`, which must be `frame_length` long.
    pub fn windowed(
        samples: &'a [f32],
        window: &'a [f32],
        hop_length: usize,
    ) -> Self {
        let mut frames = Self::raw(samples, window.len(), hop_length);
        frames.window = Some(window);
        frames
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Writes frame `index` into `out`, which must be at least `frame_length` long.
    pub fn fill(&self, index: usize, out: &mut [f32]) {
        let start = (index * self.hop_length).min(self.samples.len());
        let end = (start + self.frame_length).min(self.samples.len());
        let available = end - start;
        out[..available].copy_from_slice(&self.samples[start..end]);
        out[available..self.frame_length].fill(0.0);
        if let Some(window) = self.window {
            for (s, w) in out[..self.frame_length].iter_mut().zip(window) {
                *s *= w;
            }
        }
    }
}

impl Iterator for Frames<'_> {
    type Item = Vec<f32>;

    fn next(&mut self) -> Option<Vec<f32>> {
        if self.next >= self.count {
            return None;
        }
        let mut frame = vec![0.0; self.frame_length];
        self.fill(self.next, &mut frame);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}
