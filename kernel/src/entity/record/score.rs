use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::AsRefln;

use crate::KernelError;

pub const SCORE_MIN: i16 = 1;
pub const SCORE_MAX: i16 = 10;

/// Score a user gives a book on return. Only constructible through
/// validation; out-of-range values surface `KernelError::InvalidScore`
/// with the violation detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRefln, Serialize, Deserialize)]
#[serde(try_from = "i16")]
pub struct Score(i16);

impl TryFrom<i16> for Score {
    type Error = Report<KernelError>;

    fn try_from(score: i16) -> Result<Self, Self::Error> {
        if (SCORE_MIN..=SCORE_MAX).contains(&score) {
            Ok(Self(score))
        } else {
            Err(Report::new(KernelError::InvalidScore(format!(
                "score must be between {SCORE_MIN} and {SCORE_MAX}, got {score}"
            ))))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::entity::Score;
    use crate::KernelError;

    #[test]
    fn accepts_bounds() {
        assert!(Score::try_from(1).is_ok());
        assert!(Score::try_from(10).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        for score in [0, -1, 11] {
            let report = Score::try_from(score).unwrap_err();
            assert!(matches!(
                report.current_context(),
                KernelError::InvalidScore(_)
            ));
        }
    }
}
