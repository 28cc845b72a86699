pub const HISTORY_LEN: usize = 320; // One sample per display column
pub const ADC_MAX: u16 = 4095; // 12-bit ADC full scale
pub const ADC_MID: u16 = 2048; // Microphone bias sits at mid-scale

/// Full-wave rectified, doubled deviation of a raw microphone reading from
/// mid-scale.
pub fn rectify(raw: u16) -> u16 {
    raw.min(ADC_MAX).abs_diff(ADC_MID) * 2
}

/// Rolling sample history, index 0 is the most recent sample.
#[derive(Debug, Clone)]
pub struct History {
    samples: [u16; HISTORY_LEN],
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            samples: [0_u16; HISTORY_LEN],
        }
    }

    /// Shift every sample one slot towards the oldest end (dropping the last)
    /// and store `sample` at index 0.
    pub fn shift_and_insert(&mut self, sample: u16) {
        self.samples.copy_within(0..HISTORY_LEN - 1, 1);
        self.samples[0] = sample;
    }

    pub fn latest(&self) -> u16 {
        self.samples[0]
    }

    pub fn get(&self, index: usize) -> Option<u16> {
        self.samples.get(index).copied()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        HISTORY_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectify_mid_scale_is_silent() {
        assert_eq!(rectify(ADC_MID), 0);
        assert_eq!(rectify(ADC_MID + 100), 200);
        assert_eq!(rectify(ADC_MID - 100), 200);
        assert_eq!(rectify(0), 4096);
        assert_eq!(rectify(ADC_MAX), 4094);
    }

    #[test]
    fn rectify_clamps_out_of_range_reading() {
        assert_eq!(rectify(u16::MAX), rectify(ADC_MAX));
    }

    #[test]
    fn insert_shifts_towards_oldest() {
        let mut history = History::new();
        let raw = [2048_u16, 3000, 100, 4095, 2500];
        for r in raw {
            let before = history.clone();
            history.shift_and_insert(rectify(r));
            assert_eq!(history.latest(), rectify(r));
            for i in 1..HISTORY_LEN {
                assert_eq!(history.get(i), before.get(i - 1), "index {i}");
            }
            assert_eq!(history.len(), HISTORY_LEN);
        }
        assert_eq!(history.get(4), Some(0));
        assert_eq!(history.get(3), Some(rectify(3000)));
    }

    #[test]
    fn oldest_sample_falls_off_the_end() {
        let mut history = History::new();
        history.shift_and_insert(7);
        for _ in 0..HISTORY_LEN - 1 {
            history.shift_and_insert(1);
        }
        assert_eq!(history.get(HISTORY_LEN - 1), Some(7));

        history.shift_and_insert(1);
        assert_eq!(history.get(HISTORY_LEN - 1), Some(1));
        assert_eq!(history.get(HISTORY_LEN), None);
        assert_eq!(history.as_slice().len(), HISTORY_LEN);
    }
}
