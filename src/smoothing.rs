use std::collections::VecDeque;

/// Boxcar moving average over a fixed window, kept as a rolling sum
pub struct MovingAverage {
    window: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl MovingAverage {
    /// Create a new averager with given window size (17 for turn rate)
    pub fn new(window_size: usize) -> Self {
        MovingAverage {
            window: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            sum: 0.0,
        }
    }

    /// Push a value; returns the window mean once the window is full
    pub fn apply(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        self.sum += value;

        if self.window.len() > self.window_size {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
            }
        }

        if self.window.len() == self.window_size {
            Some(self.sum / self.window_size as f64)
        } else {
            None
        }
    }
}

/// Centered moving average of `signal`.
///
/// The mean of window `[i, i + window)` belongs to sample `i + window / 2`,
/// so the output has `signal.len() - (window - 1)` entries and is empty when
/// the signal is shorter than one window.
pub fn centered_moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    if signal.len() < window {
        return Vec::new();
    }

    let mut averager = MovingAverage::new(window);
    signal
        .iter()
        .filter_map(|&value| averager.apply(value))
        .collect()
}

/// Offset of the first sample that receives a centered average
pub fn center_offset(window: usize) -> usize {
    window.max(1) / 2
}
