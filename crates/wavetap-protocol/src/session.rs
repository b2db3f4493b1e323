//! Sample accumulation between terminal markers.

use wavetap_core::{Sample, SessionSummary};

/// Samples gathered since the last flush.
///
/// Every confirmed frame appends its samples. A terminal frame, the end of
/// the source, or cancellation takes the whole session and leaves it empty.
#[derive(Debug, Default)]
pub struct Session {
    samples: Vec<Sample>,
    frames: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the samples of one frame.
    pub fn extend_frame(&mut self, samples: &[Sample]) {
        self.samples.extend_from_slice(samples);
        self.frames += 1;
    }

    /// Take the accumulated samples, leaving the session empty.
    pub fn take(&mut self) -> SessionSummary {
        SessionSummary {
            samples: std::mem::take(&mut self.samples),
            frames: std::mem::take(&mut self.frames),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_and_take() {
        let mut session = Session::new();
        session.extend_frame(&[1, 2]);
        session.extend_frame(&[0]);

        assert_eq!(session.samples(), &[1, 2, 0]);
        assert_eq!(session.frames(), 2);

        let summary = session.take();
        assert_eq!(summary.samples, vec![1, 2, 0]);
        assert_eq!(summary.frames, 2);

        assert!(session.is_empty());
        assert_eq!(session.frames(), 0);
    }

    #[test]
    fn test_take_empty() {
        let mut session = Session::new();
        let summary = session.take();
        assert!(summary.is_empty());
        assert_eq!(summary.frames, 0);
    }

    #[test]
    fn test_frame_without_samples_still_counts() {
        // A one-byte payload decodes to no samples
        let mut session = Session::new();
        session.extend_frame(&[]);
        assert!(session.is_empty());
        assert_eq!(session.frames(), 1);
    }

    #[test]
    fn test_clear() {
        let mut session = Session::new();
        session.extend_frame(&[5; 8]);
        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.frames(), 0);
    }
}
