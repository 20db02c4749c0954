use crate::types::{FireError, FireResult};

/// Mixed-radix counter.
///
/// Digit 0 advances fastest; an overflowing digit resets to zero and carries
/// into the next one. A full cycle visits every digit vector exactly once and
/// ends back at all-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Odometer {
    digits: Vec<usize>,
    radices: Vec<usize>,
}

impl Odometer {
    pub fn new(radices: Vec<usize>) -> FireResult<Self> {
        if let Some(pos) = radices.iter().position(|&r| r == 0) {
            return Err(FireError::Processing(format!("odometer digit {} has radix 0", pos)));
        }
        Ok(Self {
            digits: vec![0; radices.len()],
            radices,
        })
    }

    /// `len` digits, each counting `0..radix`
    pub fn uniform(len: usize, radix: usize) -> FireResult<Self> {
        Self::new(vec![radix; len])
    }

    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    pub fn radices(&self) -> &[usize] {
        &self.radices
    }

    /// Number of states in one full cycle
    pub fn cycle_len(&self) -> usize {
        self.radices.iter().product()
    }

    pub fn is_zero(&self) -> bool {
        self.digits.iter().all(|&d| d == 0)
    }

    /// Advance by one. Returns true when the counter wrapped back to all-zero.
    pub fn increment(&mut self) -> bool {
        for (digit, &radix) in self.digits.iter_mut().zip(&self.radices) {
            *digit += 1;
            if *digit < radix {
                return false;
            }
            *digit = 0;
        }
        true
    }

    /// Every digit vector of one cycle, starting from the current state
    pub fn cycle(self) -> Cycle {
        Cycle {
            odometer: self,
            done: false,
        }
    }
}

/// Iterator over one full odometer cycle
#[derive(Debug, Clone)]
pub struct Cycle {
    odometer: Odometer,
    done: bool,
}

impl Iterator for Cycle {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.odometer.digits.clone();
        self.done = self.odometer.increment();
        Some(current)
    }
}
