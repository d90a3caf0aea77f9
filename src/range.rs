// SPDX: CC0-1.0

use crate::Number;
use thiserror::Error;

/// How the iteration range is traversed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RangeMode {
    /// `start + i * step`, free of accumulated error.
    #[default]
    Indexed,
    /// Repeated addition until the end is passed, as older releases did.
    /// The number of points depends on rounding.
    Accumulate,
}

/// Slack for deciding whether the end of the range lands on a step.
const INDEX_EPSILON: Number = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub start: Number,
    pub end: Number,
    pub step: Number,
}

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RangeErr {
    #[error("range step must not be zero")]
    ZeroStep,
    #[error("range bounds and step must be finite numbers")]
    NotFinite,
    #[error("a step of {step} never gets from {start} to {end}")]
    WrongDirection {
        start: Number,
        end: Number,
        step: Number,
    },
    #[error("range has more than {max} points")]
    TooManyPoints { max: u64 },
}

impl Range {
    pub fn check(&self) -> Result<(), RangeErr> {
        let Self { start, end, step } = *self;
        if !(start.is_finite() && end.is_finite() && step.is_finite()) {
            Err(RangeErr::NotFinite)
        } else if step == 0.0 {
            Err(RangeErr::ZeroStep)
        } else if (end - start) * step < 0.0 {
            Err(RangeErr::WrongDirection { start, end, step })
        } else {
            Ok(())
        }
    }

    /// Number of points the indexed traversal yields.
    pub fn len(&self) -> Result<u64, RangeErr> {
        self.check()?;
        let steps = ((self.end - self.start) / self.step + INDEX_EPSILON).floor();
        // float to int casts saturate
        Ok((steps as u64).saturating_add(1))
    }

    /// Values of the range, refusing ranges longer than `max_points`.
    pub fn steps(&self, mode: RangeMode, max_points: u64) -> Result<Steps, RangeErr> {
        let remaining = self.len()?;
        if remaining > max_points {
            return Err(RangeErr::TooManyPoints { max: max_points });
        }
        Ok(Steps {
            range: *self,
            mode,
            index: 0,
            remaining,
            cur: self.start,
        })
    }
}

/// Lazy sequence of the values of a [`Range`].
#[derive(Clone, Debug)]
pub struct Steps {
    range: Range,
    mode: RangeMode,
    index: u64,
    remaining: u64,
    cur: Number,
}

impl Iterator for Steps {
    type Item = Number;

    fn next(&mut self) -> Option<Self::Item> {
        match self.mode {
            RangeMode::Indexed => {
                if self.remaining == 0 {
                    return None;
                }
                self.remaining -= 1;
                let val = self.range.start + self.index as Number * self.range.step;
                self.index += 1;
                Some(val)
            }
            RangeMode::Accumulate => {
                let Range { end, step, .. } = self.range;
                let inside = if step > 0.0 {
                    self.cur <= end
                } else {
                    self.cur >= end
                };
                // `remaining` also ends steps smaller than one ulp of `cur`
                if !inside || self.remaining == 0 {
                    return None;
                }
                self.remaining -= 1;
                let val = self.cur;
                self.cur += step;
                Some(val)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 1_000_000;

    fn range(start: Number, end: Number, step: Number) -> Range {
        Range { start, end, step }
    }

    #[test]
    fn inclusive_end() {
        let vals: Vec<_> = range(0.0, 1.0, 0.5)
            .steps(RangeMode::Indexed, MAX)
            .unwrap()
            .collect();
        assert_eq!(vals, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn end_off_step_is_excluded() {
        let vals: Vec<_> = range(0.0, 1.0, 0.3)
            .steps(RangeMode::Indexed, MAX)
            .unwrap()
            .collect();
        assert_eq!(vals.len(), 4);
        assert!(vals.iter().all(|v| *v <= 1.0));
    }

    #[test]
    fn indexed_does_not_drift() {
        let r = range(-1.0, 2.5, 0.7);
        assert_eq!(r.steps(RangeMode::Indexed, MAX).unwrap().count(), 6);
        let r = range(-1.0, 1.0, 0.05);
        assert_eq!(r.steps(RangeMode::Indexed, MAX).unwrap().count(), 41);
    }

    #[test]
    fn accumulate_drifts() {
        let r = range(0.0, 0.3, 0.1);
        // 0.1 + 0.1 + 0.1 > 0.3
        let vals: Vec<_> = r.steps(RangeMode::Accumulate, MAX).unwrap().collect();
        assert_eq!(vals.len(), 3);
        assert_eq!(r.steps(RangeMode::Indexed, MAX).unwrap().count(), 4);
    }

    #[test]
    fn descending() {
        let vals: Vec<_> = range(1.0, 0.0, -0.5)
            .steps(RangeMode::Indexed, MAX)
            .unwrap()
            .collect();
        assert_eq!(vals, [1.0, 0.5, 0.0]);
        let vals: Vec<_> = range(1.0, 0.0, -0.5)
            .steps(RangeMode::Accumulate, MAX)
            .unwrap()
            .collect();
        assert_eq!(vals, [1.0, 0.5, 0.0]);
    }

    #[test]
    fn single_point() {
        assert_eq!(range(2.0, 2.0, 1.0).len(), Ok(1));
        assert_eq!(range(2.0, 2.0, -1.0).len(), Ok(1));
    }

    #[test]
    fn degenerate() {
        assert_eq!(range(0.0, 1.0, 0.0).check(), Err(RangeErr::ZeroStep));
        assert!(matches!(
            range(0.0, 1.0, -0.1).check(),
            Err(RangeErr::WrongDirection { .. })
        ));
        assert_eq!(
            range(0.0, Number::INFINITY, 1.0).check(),
            Err(RangeErr::NotFinite)
        );
        assert_eq!(range(0.0, 1.0, Number::NAN).check(), Err(RangeErr::NotFinite));
    }

    #[test]
    fn accumulate_stops_when_step_is_lost() {
        let r = range(1e16, 1e16 + 4.0, 1.0);
        assert_eq!(r.len(), Ok(5));
        let n = r.steps(RangeMode::Accumulate, MAX).unwrap().take(100_000).count();
        assert!(n <= 5, "{n}");
    }

    #[test]
    fn too_many_points() {
        let r = range(0.0, 1.0, 1e-300);
        assert!(r.check().is_ok());
        for mode in [RangeMode::Indexed, RangeMode::Accumulate] {
            assert!(matches!(
                r.steps(mode, MAX),
                Err(RangeErr::TooManyPoints { max: MAX })
            ));
        }
        assert_eq!(range(0.0, 1.0, 0.5).steps(RangeMode::Indexed, 3).unwrap().count(), 3);
        assert_eq!(
            range(0.0, 1.0, 0.5).steps(RangeMode::Indexed, 2).unwrap_err(),
            RangeErr::TooManyPoints { max: 2 }
        );
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("accumulate".parse::<RangeMode>(), Ok(RangeMode::Accumulate));
        assert_eq!("Indexed".parse::<RangeMode>(), Ok(RangeMode::Indexed));
    }
}
