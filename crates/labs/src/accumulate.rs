//! Click accumulation policies shared by the labs.

use foundation::LonLat;
use serde::{Deserialize, Serialize};

/// How a lab folds a new click into its click history.
pub trait Accumulate: Copy + Default {
    fn push(self, at: LonLat) -> Self;
}

/// Keeps the last two clicks; each click shifts `current` into `previous`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlidingPair {
    pub previous: Option<LonLat>,
    pub current: Option<LonLat>,
}

impl SlidingPair {
    pub fn pair(&self) -> Option<(LonLat, LonLat)> {
        Some((self.previous?, self.current?))
    }
}

impl Accumulate for SlidingPair {
    fn push(self, at: LonLat) -> Self {
        Self {
            previous: self.current,
            current: Some(at),
        }
    }
}

/// Keeps only the most recent click.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleLatest {
    pub latest: Option<LonLat>,
}

impl Accumulate for SingleLatest {
    fn push(self, at: LonLat) -> Self {
        Self { latest: Some(at) }
    }
}

/// Anchors on the first click forever; later clicks overwrite `current`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstThenRepeat {
    pub first: Option<LonLat>,
    pub current: Option<LonLat>,
}

impl FirstThenRepeat {
    pub fn both(&self) -> Option<(LonLat, LonLat)> {
        Some((self.first?, self.current?))
    }
}

impl Accumulate for FirstThenRepeat {
    fn push(self, at: LonLat) -> Self {
        match self.first {
            None => Self {
                first: Some(at),
                current: None,
            },
            Some(first) => Self {
                first: Some(first),
                current: Some(at),
            },
        }
    }
}
