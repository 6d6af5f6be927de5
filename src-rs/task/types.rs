use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AnalyzerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// `pending -> running -> {completed, failed}`. A task that never got
    /// a slot may go straight from `pending` to `failed`.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pending => "⏳",
            Self::Running => "🔄",
            Self::Completed => "✅",
            Self::Failed => "❌",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    pub running_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<f64>,
    pub error: Option<String>,
    pub user_id: i64,
    pub group_id: Option<i64>,
}

impl Task {
    pub fn new(id: &str, user_id: i64, group_id: Option<i64>) -> Self {
        Self {
            id: id.to_string(),
            status: TaskStatus::Pending,
            started_at: Utc::now(),
            running_at: None,
            ended_at: None,
            duration_secs: None,
            error: None,
            user_id,
            group_id,
        }
    }

    pub fn mark_running(&mut self) -> Result<(), AnalyzerError> {
        self.transition(TaskStatus::Running)?;
        self.running_at = Some(Utc::now());
        Ok(())
    }

    /// Remote-reported durations win over the locally measured one.
    pub fn mark_completed(&mut self, reported_duration: Option<f64>) -> Result<(), AnalyzerError> {
        self.transition(TaskStatus::Completed)?;
        self.stamp_end(reported_duration);
        Ok(())
    }

    pub fn mark_failed(&mut self, error: &str) -> Result<(), AnalyzerError> {
        self.transition(TaskStatus::Failed)?;
        self.error = Some(error.to_string());
        self.stamp_end(None);
        Ok(())
    }

    pub fn elapsed_secs(&self) -> f64 {
        elapsed_between(self.started_at, Utc::now())
    }

    pub fn is_private(&self) -> bool {
        !matches!(self.group_id, Some(id) if id > 0)
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), AnalyzerError> {
        if !self.status.can_transition_to(next) {
            return Err(AnalyzerError::InvalidTransition {
                id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    fn stamp_end(&mut self, reported_duration: Option<f64>) {
        let ended = Utc::now();
        self.ended_at = Some(ended);
        self.duration_secs = match reported_duration {
            Some(secs) if secs > 0.0 => Some(secs),
            _ => Some(elapsed_between(self.started_at, ended)),
        };
    }
}

fn elapsed_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds().max(0);
    millis as f64 / 1000.0
}
