use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How far a cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in.
///
/// Playback mostly advances by small steps, so the next sample usually lands
/// in the same or the following interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For `CubicSpline` this holds `[in_tangent, value, out_tangent]` per key.
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty() || self.values.is_empty()
    }

    /// Time of the last key, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sample using binary search.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let next = self.times.partition_point(|&t| t <= time);
        self.sample_at_frame(next.saturating_sub(1), time)
    }

    /// Samples at `time`, starting the interval search from `cursor`.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let len = self.times.len();
        if len == 1 {
            return self.value_at(0);
        }

        let i = cursor.last_index.min(len - 1);
        let found = if time >= self.times[i] {
            self.scan_forward(i, time)
        } else {
            self.scan_backward(i, time)
        };

        let index = found.unwrap_or_else(|| {
            self.times
                .partition_point(|&t| t <= time)
                .saturating_sub(1)
        });
        cursor.last_index = index;

        self.sample_at_frame(index, time)
    }

    // time >= times[i]
    fn scan_forward(&self, i: usize, time: f32) -> Option<usize> {
        let len = self.times.len();
        for idx in i..=i + MAX_SCAN_OFFSET {
            if idx >= len - 1 {
                return (time >= self.times[len - 1]).then_some(len - 1);
            }
            if time < self.times[idx + 1] {
                return Some(idx);
            }
        }
        None
    }

    // time < times[i]
    fn scan_backward(&self, i: usize, time: f32) -> Option<usize> {
        (i.saturating_sub(MAX_SCAN_OFFSET)..i)
            .rev()
            .find(|&idx| time >= self.times[idx])
    }

    fn value_at(&self, index: usize) -> Option<T> {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values.get(index * 3 + 1).copied(),
            _ => self.values.get(index).copied(),
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> Option<T> {
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next] - t0;
        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 }.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => Some(T::interpolate_linear(
                self.value_at(index)?,
                self.value_at(next)?,
                t,
            )),
            InterpolationMode::CubicSpline => {
                let a = index * 3;
                let b = next * 3;
                Some(T::interpolate_cubic(
                    *self.values.get(a + 1)?,
                    *self.values.get(a + 2)?,
                    *self.values.get(b)?,
                    *self.values.get(b + 1)?,
                    t,
                    dt,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> KeyframeTrack<f32> {
        KeyframeTrack::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0],
            InterpolationMode::Linear,
        )
    }

    #[test]
    fn cursor_agrees_with_binary_search_on_jumps() {
        let track = ramp();
        let mut cursor = KeyframeCursor::default();
        for &time in &[0.5, 0.7, 7.5, 1.25, 3.0, 8.5, -1.0, 4.9] {
            let a = track.sample_with_cursor(time, &mut cursor).unwrap();
            let b = track.sample(time).unwrap();
            assert!((a - b).abs() < 1e-5, "time {time}: {a} vs {b}");
        }
    }

    #[test]
    fn empty_track_samples_none() {
        let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
        assert!(track.sample(0.0).is_none());
        assert!(track.sample_with_cursor(0.0, &mut KeyframeCursor::default()).is_none());
    }
}
