use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::types::{SampleValue, Timestamp};
use crate::error::{TsError, TsResult};

/// Decides what happens when a sample lands on a timestamp that is already present.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize, Clone, Copy)]
pub enum DuplicatePolicy {
    /// reject the new sample with an error
    Block,
    /// ignore any newly reported value
    #[default]
    KeepFirst,
    /// overwrite the existing value with the new value
    KeepLast,
    /// only override if the value is lower than the existing value
    Min,
    /// only override if the value is higher than the existing value
    Max,
    /// add the new value to the existing value
    Sum,
}

impl Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Block => "block",
            DuplicatePolicy::KeepFirst => "first",
            DuplicatePolicy::KeepLast => "last",
            DuplicatePolicy::Min => "min",
            DuplicatePolicy::Max => "max",
            DuplicatePolicy::Sum => "sum",
        }
    }

    pub fn value_on_duplicate<T: SampleValue>(
        self,
        ts: Timestamp,
        old: Option<T>,
        new: Option<T>,
    ) -> TsResult<Option<T>> {
        use DuplicatePolicy::*;
        let (old, new) = match (old, new) {
            (Some(old), Some(new)) => (old, new),
            // take the present sample regardless of policy
            (old, new) if self != Block => return Ok(new.or(old)),
            (_, new) => return Err(TsError::DuplicateSample(format!("{new:?} @ {ts}"))),
        };
        Ok(Some(match self {
            Block => return Err(TsError::DuplicateSample(format!("{new:?} @ {ts}"))),
            KeepFirst => old,
            KeepLast => new,
            Min => old.min(new),
            Max => old.max(new),
            Sum => old + new,
        }))
    }
}

impl FromStr for DuplicatePolicy {
    type Err = TsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use DuplicatePolicy::*;

        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(Block),
            "first" | "keepfirst" | "keep_first" => Ok(KeepFirst),
            "last" | "keeplast" | "keep_last" => Ok(KeepLast),
            "min" => Ok(Min),
            "max" => Ok(Max),
            "sum" => Ok(Sum),
            _ => Err(TsError::InvalidArgument(format!("invalid duplicate policy: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::hours_from_epoch;
    use test_case::test_case;

    #[test_case(DuplicatePolicy::KeepFirst, 1.0 ; "keep first")]
    #[test_case(DuplicatePolicy::KeepLast, 2.0 ; "keep last")]
    #[test_case(DuplicatePolicy::Min, 1.0 ; "min")]
    #[test_case(DuplicatePolicy::Max, 2.0 ; "max")]
    #[test_case(DuplicatePolicy::Sum, 3.0 ; "sum")]
    fn resolves_duplicates(policy: DuplicatePolicy, expected: f64) {
        let res = policy.value_on_duplicate(hours_from_epoch(1), Some(1.0), Some(2.0)).unwrap();
        assert_eq!(res, Some(expected));
    }

    #[test]
    fn block_rejects_duplicates() {
        let res = DuplicatePolicy::Block.value_on_duplicate(hours_from_epoch(1), Some(1.0), Some(2.0));
        assert!(matches!(res, Err(TsError::DuplicateSample(_))));
    }

    #[test]
    fn missing_values_yield_to_present_ones() {
        let ts = hours_from_epoch(1);
        assert_eq!(DuplicatePolicy::KeepLast.value_on_duplicate(ts, Some(1.0), None).unwrap(), Some(1.0));
        assert_eq!(DuplicatePolicy::KeepFirst.value_on_duplicate(ts, None, Some(2.0)).unwrap(), Some(2.0));
        assert_eq!(DuplicatePolicy::Sum.value_on_duplicate::<f64>(ts, None, None).unwrap(), None);
    }

    #[test]
    fn parse_policy() {
        assert_eq!("keep_last".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::KeepLast);
        assert!("newest".parse::<DuplicatePolicy>().is_err());
    }
}
