use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStepKind {
    DrugFlag,
    Combination,
    AgeRule,
    AgeSensitivity,
    Clamp,
}

/// One contribution to a risk score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreStep {
    pub kind: ScoreStepKind,
    /// Points added. Only a `Clamp` step is negative.
    pub points: i64,
    pub message: String,
}

/// Running score plus the steps that produced it.
#[derive(Debug, Clone, Default)]
pub struct ScoreTrace {
    total: u64,
    steps: Vec<ScoreStep>,
}

impl ScoreTrace {
    pub fn add(&mut self, kind: ScoreStepKind, points: u32, message: String) {
        self.total = self.total.saturating_add(u64::from(points));
        self.steps.push(ScoreStep {
            kind,
            points: i64::from(points),
            message,
        });
    }

    /// Clamp the total to `max`, recording a `Clamp` step if anything was cut.
    pub fn finish(mut self, max: u32) -> (u32, Vec<ScoreStep>) {
        let max64 = u64::from(max);
        if self.total > max64 {
            let cut = self.total - max64;
            self.steps.push(ScoreStep {
                kind: ScoreStepKind::Clamp,
                points: -i64::try_from(cut).unwrap_or(i64::MAX),
                message: format!("Score {} capped at {}", self.total, max),
            });
            return (max, self.steps);
        }
        // total <= max, so it fits in u32
        (self.total as u32, self.steps)
    }
}
