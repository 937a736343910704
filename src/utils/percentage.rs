use std::ops::Deref;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    pub fn zero() -> Percentage {
        Percentage(0.)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` taken by `part`. An empty whole has no shares, so the result is 0%.
pub fn share_of(part: u64, whole: u64) -> Percentage {
    if whole == 0 {
        return Percentage::zero();
    }
    Percentage(part as f64 / whole as f64 * 100.)
}
