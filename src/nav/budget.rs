use crate::nav::errors::NavError;

/// Ceiling for chained block traversal.
pub const DEFAULT_BLOCK_SEARCH_LIMIT: usize = 500;

/// Ceiling for merging continuation lines into a doc segment.
pub const DEFAULT_LINE_MERGE_LIMIT: usize = 10;

/// Bounded step counter shared by every navigator that can loop or recurse.
///
/// Exhausting the budget yields [`NavError::RecursionCeilingExceeded`], which
/// the driver reports as an internal diagnostic instead of hanging.
#[derive(Debug, Clone)]
pub struct StepBudget {
    what: &'static str,
    limit: usize,
    used: usize,
}

impl StepBudget {
    pub fn new(what: &'static str, limit: usize) -> Self {
        Self {
            what,
            limit,
            used: 0,
        }
    }

    /// Consume one step taken at `position`.
    pub fn tick(&mut self, position: usize) -> Result<(), NavError> {
        self.used += 1;
        if self.used > self.limit {
            return Err(NavError::RecursionCeilingExceeded {
                what: self.what,
                limit: self.limit,
                position,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exhaustion() {
        let mut budget = StepBudget::new("test walk", 2);
        assert!(budget.tick(0).is_ok());
        assert!(budget.tick(1).is_ok());
        let err = budget.tick(7).unwrap_err();
        assert_eq!(
            err,
            NavError::RecursionCeilingExceeded {
                what: "test walk",
                limit: 2,
                position: 7
            }
        );
        assert!(!err.is_inconclusive());
    }
}
