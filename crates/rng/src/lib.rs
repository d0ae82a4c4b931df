use sha3::{digest::{ExtendableOutput, Update, XofReader}, Shake256};

/// Counter-based SHAKE256 stream.
///
/// Every draw ratchets the internal state, so two generators built from the
/// same seed produce the same sequence no matter which thread drives them.
#[derive(Clone)]
pub struct SeedRng {
    state: [u8; 32],
    step: u64,
}

impl SeedRng {
    pub fn new(seed: &[u8]) -> Self {
        let mut state = [0u8; 32];
        shake(&[seed, b"KPM_SEED"], &mut state);
        Self { state, step: 0 }
    }

    /// Independent child stream, e.g. one per stochastic sample.
    pub fn fork(&self, label: &str) -> Self {
        let mut state = [0u8; 32];
        shake(&[&self.state, label.as_bytes(), b"KPM_FORK"], &mut state);
        Self { state, step: 0 }
    }

    pub fn next_u64(&mut self, ctx: &[u8]) -> u64 {
        self.step += 1;

        let state = self.state;
        let mut next_state = self.state;
        shake(&[&state, &self.step.to_be_bytes(), b"KPM_STEP"], &mut next_state);
        self.state = next_state;

        let mut out = [0u8; 8];
        shake(&[&self.state, ctx], &mut out);
        u64::from_be_bytes(out)
    }

    /// Uniform in [0, 1].
    pub fn next_f64(&mut self, ctx: &[u8]) -> f64 {
        (self.next_u64(ctx) as f64) / (u64::MAX as f64)
    }

    /// Fill `out` with ±1, 64 signs per draw.
    pub fn fill_signs(&mut self, out: &mut [f64], ctx: &[u8]) {
        for chunk in out.chunks_mut(64) {
            let bits = self.next_u64(ctx);
            for (k, v) in chunk.iter_mut().enumerate() {
                *v = if (bits >> k) & 1 == 0 { 1.0 } else { -1.0 };
            }
        }
    }
}

fn shake(parts: &[&[u8]], out: &mut [u8]) {
    let mut h = Shake256::default();
    for p in parts {
        h.update(p);
    }
    let mut r = h.finalize_xof();
    r.read(out);
}
