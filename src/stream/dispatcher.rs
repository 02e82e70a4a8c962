//! Hop dispatcher: input accumulation, hop triggering, and the
//! overlap-add output ring.
//!
//! The dispatcher owns two input accumulators holding the most recent
//! analysis window of each stream, a write cursor counting the samples of
//! the current hop, and an output ring with a read cursor. Hop placement is
//! derived from the absolute count of ingested samples, so output is
//! independent of how the host slices its buffers.
//!
//! Emitted samples are divided by a precomputed per-phase overlap gain
//! (the squared synthesis window summed across overlapping hops), which
//! makes an unmodified analysis→synthesis chain exactly transparent. The
//! buffers never allocate or shift capacity after construction.

use crate::core::fft::OVERLAP_GAIN_EPSILON;

#[derive(Debug)]
pub struct HopDispatcher {
    window_len: usize,
    hop_len: usize,
    /// Ring offset of each overlap-add base relative to the ingest cursor.
    ola_offset: usize,
    main_frame: Vec<f64>,
    side_frame: Vec<f64>,
    /// Samples of the current hop already received.
    hop_fill: usize,
    ring: Vec<f64>,
    ring_read: usize,
    /// Samples ingested in the current call but not yet emitted.
    pending: usize,
    /// Per-position overlap gain, indexed by output position modulo the hop.
    ola_gain: Vec<f64>,
    emit_phase: usize,
}

impl HopDispatcher {
    /// Creates a dispatcher.
    ///
    /// `window` is the synthesis window whose squared overlap sum normalizes
    /// the output; `ola_offset` shifts every overlap-add base forward of the
    /// ingest position and must be a multiple of `hop_len` so the gain
    /// table's phase stays aligned.
    pub fn new(window_len: usize, hop_len: usize, ola_offset: usize, window: &[f64]) -> Self {
        debug_assert!(hop_len > 0 && hop_len <= window_len);
        debug_assert_eq!(window.len(), window_len);
        debug_assert_eq!(ola_offset % hop_len, 0);

        let mut ola_gain = vec![0.0; hop_len];
        for (j, gain) in ola_gain.iter_mut().enumerate() {
            let mut pos = j;
            let mut sum = 0.0;
            while pos < window_len {
                sum += window[pos] * window[pos];
                pos += hop_len;
            }
            *gain = sum.max(OVERLAP_GAIN_EPSILON);
        }

        let capacity = window_len + ola_offset + 2 * hop_len;
        Self {
            window_len,
            hop_len,
            ola_offset,
            main_frame: vec![0.0; window_len],
            side_frame: vec![0.0; window_len],
            hop_fill: 0,
            ring: vec![0.0; capacity],
            ring_read: 0,
            pending: 0,
            ola_gain,
            emit_phase: 0,
        }
    }

    /// Zeros all buffers and cursors.
    pub fn reset(&mut self) {
        self.main_frame.fill(0.0);
        self.side_frame.fill(0.0);
        self.ring.fill(0.0);
        self.hop_fill = 0;
        self.ring_read = 0;
        self.pending = 0;
        self.emit_phase = 0;
    }

    /// Appends input samples to both accumulators, stopping at the next hop
    /// boundary. Returns the number of samples consumed (at least 1 for
    /// non-empty input).
    pub fn ingest(&mut self, main: &[f32], side: &[f32]) -> usize {
        let take = (self.hop_len - self.hop_fill).min(main.len()).min(side.len());
        let base = self.window_len - self.hop_len + self.hop_fill;
        for i in 0..take {
            self.main_frame[base + i] = main[i] as f64;
            self.side_frame[base + i] = side[i] as f64;
        }
        self.hop_fill += take;
        self.pending += take;
        take
    }

    /// True when a full hop has been accumulated and the analysis chain
    /// should run.
    #[inline]
    pub fn hop_ready(&self) -> bool {
        self.hop_fill == self.hop_len
    }

    /// Copies the most recent `window_len` samples of each stream into
    /// contiguous scratch frames.
    pub fn copy_frames(&self, main_out: &mut [f64], side_out: &mut [f64]) {
        main_out.copy_from_slice(&self.main_frame);
        side_out.copy_from_slice(&self.side_frame);
    }

    /// Overlap-adds one synthesized window into the output ring at the
    /// position of the current ingest cursor plus the configured offset.
    pub fn overlap_add(&mut self, frame: &[f64]) {
        debug_assert_eq!(frame.len(), self.window_len);
        let capacity = self.ring.len();
        let base = self.ring_read + self.pending + self.ola_offset;
        for (j, &sample) in frame.iter().enumerate() {
            self.ring[(base + j) % capacity] += sample;
        }
    }

    /// Shifts both accumulators left by one hop and restarts the hop count.
    pub fn complete_hop(&mut self) {
        let hop = self.hop_len;
        self.main_frame.copy_within(hop.., 0);
        self.side_frame.copy_within(hop.., 0);
        let tail = self.window_len - hop;
        self.main_frame[tail..].fill(0.0);
        self.side_frame[tail..].fill(0.0);
        self.hop_fill = 0;
    }

    /// Reads finalized samples from the ring into `out`, zeroing each cell
    /// behind the cursor so the next overlap-add starts from silence.
    /// Non-finite cells are scrubbed to zero before they reach the host.
    pub fn emit(&mut self, out: &mut [f32]) {
        let capacity = self.ring.len();
        for sample in out.iter_mut() {
            let idx = self.ring_read % capacity;
            let mut value = self.ring[idx] / self.ola_gain[self.emit_phase];
            if !value.is_finite() {
                value = 0.0;
            }
            *sample = value as f32;
            self.ring[idx] = 0.0;
            self.ring_read = (self.ring_read + 1) % capacity;
            self.emit_phase = (self.emit_phase + 1) % self.hop_len;
        }
        self.pending -= out.len();
    }

    /// The hop length in samples.
    #[inline]
    pub fn hop_len(&self) -> usize {
        self.hop_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window::hann_window;

    #[test]
    fn test_ingest_stops_at_hop_boundary() {
        let window = hann_window(16);
        let mut disp = HopDispatcher::new(16, 4, 0, &window);
        let main = [0.5f32; 10];
        let side = [0.25f32; 10];
        let take = disp.ingest(&main, &side);
        assert_eq!(take, 4);
        assert!(disp.hop_ready());
    }

    #[test]
    fn test_frames_hold_most_recent_window() {
        let window = hann_window(8);
        let mut disp = HopDispatcher::new(8, 2, 0, &window);
        let mut fed = Vec::new();
        for chunk in 0..4 {
            let main: Vec<f32> = (0..2).map(|i| (chunk * 2 + i) as f32).collect();
            fed.extend_from_slice(&main);
            disp.ingest(&main, &main);
            assert!(disp.hop_ready());
            disp.complete_hop();
        }
        // After four hops of two samples the frame tail holds the last
        // eight samples fed, right-aligned, shifted out once per hop.
        let mut main_frame = vec![0.0; 8];
        let mut side_frame = vec![0.0; 8];
        // Feed one more hop but do not complete it, so the frame shows it.
        disp.ingest(&[8.0, 9.0], &[8.0, 9.0]);
        disp.copy_frames(&mut main_frame, &mut side_frame);
        assert_eq!(main_frame, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_overlap_gain_is_cola_sum() {
        let window = hann_window(16);
        let disp = HopDispatcher::new(16, 4, 0, &window);
        for j in 0..4 {
            let expected: f64 = (0..4).map(|m| window[j + 4 * m].powi(2)).sum();
            assert!((disp.ola_gain[j] - expected.max(OVERLAP_GAIN_EPSILON)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_emit_scrubs_non_finite_cells() {
        let window = hann_window(8);
        let mut disp = HopDispatcher::new(8, 2, 0, &window);
        disp.ring[0] = f64::NAN;
        disp.ring[1] = f64::INFINITY;
        let mut out = [1.0f32; 2];
        disp.pending = 2;
        disp.emit(&mut out);
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let window = hann_window(8);
        let mut disp = HopDispatcher::new(8, 2, 0, &window);
        disp.ingest(&[1.0, 2.0], &[3.0, 4.0]);
        disp.complete_hop();
        disp.reset();
        assert!(!disp.hop_ready());
        assert!(disp.ring.iter().all(|&v| v == 0.0));
        assert!(disp.main_frame.iter().all(|&v| v == 0.0));
        assert_eq!(disp.ring_read, 0);
        assert_eq!(disp.emit_phase, 0);
    }
}
