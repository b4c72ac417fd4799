use crate::config::DEFAULT_SALARY_CAP_MULTIPLIER;

/// Secondary gate for students already hired elsewhere: the new job may pay at most
/// `multiplier` times their current compensation.
///
/// Unknown figures allow the application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryGate {
    multiplier: f64,
}

impl SalaryGate {
    pub fn new(multiplier: f64) -> Self {
        let sanitized = if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            DEFAULT_SALARY_CAP_MULTIPLIER
        };

        Self {
            multiplier: sanitized,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Highest job salary allowed for the given compensation, if it can be enforced.
    pub fn cap_for(&self, current_ctc: Option<f64>) -> Option<f64> {
        current_ctc
            .filter(|ctc| ctc.is_finite() && *ctc > 0.0)
            .map(|ctc| ctc * self.multiplier)
    }

    pub fn check(
        &self,
        already_hired: bool,
        current_ctc: Option<f64>,
        job_salary: Option<f64>,
    ) -> bool {
        if !already_hired {
            return true;
        }

        let (Some(cap), Some(salary)) = (
            self.cap_for(current_ctc),
            job_salary.filter(|salary| salary.is_finite()),
        ) else {
            return true;
        };

        salary <= cap
    }
}

impl Default for SalaryGate {
    fn default() -> Self {
        Self::new(DEFAULT_SALARY_CAP_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_students_not_yet_hired() {
        let gate = SalaryGate::default();
        assert!(gate.check(false, Some(100_000.0), Some(10_000_000.0)));
    }

    #[test]
    fn unknown_figures_fail_open() {
        let gate = SalaryGate::default();
        assert!(gate.check(true, None, Some(900_000.0)));
        assert!(gate.check(true, Some(400_000.0), None));
        assert!(gate.check(true, Some(0.0), Some(900_000.0)));
    }

    #[test]
    fn cap_is_inclusive() {
        let gate = SalaryGate::default();
        assert!(gate.check(true, Some(500_000.0), Some(1_000_000.0)));
        assert!(!gate.check(true, Some(500_000.0), Some(1_000_001.0)));
    }

    #[test]
    fn invalid_multiplier_falls_back_to_default() {
        assert_eq!(SalaryGate::new(f64::NAN).multiplier(), 2.0);
        assert_eq!(SalaryGate::new(-3.0).multiplier(), 2.0);
        assert_eq!(SalaryGate::new(1.5).cap_for(Some(400_000.0)), Some(600_000.0));
    }
}
