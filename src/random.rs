use rand::RngCore;

/// A source of uniform samples in `[0, 1)`.
///
/// The engine draws every random number through this trait so hosts can plug
/// in an entropy-seeded generator while tests pin the sequence.
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn next_unit(&mut self) -> f64 {
        use rand::Rng;
        self.gen::<f64>()
    }
}

/// Always yields the same sample. `Fixed(0.5)` cancels all jitter.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub f64);

impl UniformSource for Fixed {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// Replays a recorded sequence, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct Sequence {
    values: Vec<f64>,
    pos: usize,
}

impl Sequence {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }
}

impl UniformSource for Sequence {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
