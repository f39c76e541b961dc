//! Query filters over stored entities.
//!
//! Every criterion is optional; an empty filter matches everything.

use serde::{Deserialize, Serialize};

use crate::models::{PrintJob, Task};
use crate::state_machine::{PrintJobStatus, TaskStatus};

/// Which assignment route a task uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    LivePool,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub owner_id: Option<String>,
    pub assigned_va_id: Option<String>,
    /// Empty means any status
    pub statuses: Vec<TaskStatus>,
    pub assignment: Option<AssignmentKind>,
    pub task_type: Option<String>,
    pub include_terminal: bool,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            owner_id: None,
            assigned_va_id: None,
            statuses: Vec::new(),
            assignment: None,
            task_type: None,
            include_terminal: true,
        }
    }
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn assigned_to(mut self, va_id: impl Into<String>) -> Self {
        self.assigned_va_id = Some(va_id.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_assignment(mut self, assignment: AssignmentKind) -> Self {
        self.assignment = Some(assignment);
        self
    }

    pub fn of_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    /// Exclude tasks in a terminal state
    pub fn active_only(mut self) -> Self {
        self.include_terminal = false;
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(owner_id) = &self.owner_id {
            if &task.owner_id != owner_id {
                return false;
            }
        }
        if let Some(va_id) = &self.assigned_va_id {
            if !task.is_assigned_to(va_id) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }
        if let Some(assignment) = self.assignment {
            let kind = if task.assignment.is_live_pool() {
                AssignmentKind::LivePool
            } else {
                AssignmentKind::Direct
            };
            if kind != assignment {
                return false;
            }
        }
        if let Some(task_type) = &self.task_type {
            if !task.task_type.eq_ignore_ascii_case(task_type) {
                return false;
            }
        }
        self.include_terminal || !task.is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJobFilter {
    pub owner_id: Option<String>,
    pub print_center_id: Option<String>,
    pub statuses: Vec<PrintJobStatus>,
    pub include_terminal: bool,
}

impl Default for PrintJobFilter {
    fn default() -> Self {
        Self {
            owner_id: None,
            print_center_id: None,
            statuses: Vec::new(),
            include_terminal: true,
        }
    }
}

impl PrintJobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn for_print_center(mut self, print_center_id: impl Into<String>) -> Self {
        self.print_center_id = Some(print_center_id.into());
        self
    }

    pub fn with_status(mut self, status: PrintJobStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.include_terminal = false;
        self
    }

    pub fn matches(&self, job: &PrintJob) -> bool {
        if let Some(owner_id) = &self.owner_id {
            if &job.owner_id != owner_id {
                return false;
            }
        }
        if let Some(print_center_id) = &self.print_center_id {
            if &job.print_center_id != print_center_id {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&job.status) {
            return false;
        }
        self.include_terminal || !job.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrintJobDraft, TaskDraft};
    use chrono::Utc;
    use uuid::Uuid;

    fn task(owner: &str, draft: TaskDraft) -> Task {
        Task::from_draft(Uuid::new_v4(), owner, draft, Utc::now())
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let mut done = task("s-1", TaskDraft::new("Essay", "assignment", 1));
        done.status = TaskStatus::Completed;
        assert!(TaskFilter::new().matches(&done));
        assert!(!TaskFilter::new().active_only().matches(&done));
    }

    #[test]
    fn test_task_criteria_combine() {
        let mut pool = task("s-1", TaskDraft::new("Essay", "assignment", 1));
        pool.status = TaskStatus::PendingAssignment;
        let direct = task("s-2", TaskDraft::new("Plan", "business", 3).direct_to("va-9"));

        let filter = TaskFilter::new()
            .with_status(TaskStatus::PendingAssignment)
            .with_assignment(AssignmentKind::LivePool);
        assert!(filter.matches(&pool));
        assert!(!filter.matches(&direct));

        assert!(TaskFilter::new().owned_by("s-2").of_type("BUSINESS").matches(&direct));
        assert!(!TaskFilter::new().assigned_to("va-9").matches(&direct));
    }

    #[test]
    fn test_print_job_filter() {
        let job = PrintJob::from_draft(
            Uuid::new_v4(),
            "s-1",
            PrintJobDraft::new("pc-1", "Thesis", 90),
            Utc::now(),
        );
        assert!(PrintJobFilter::new().for_print_center("pc-1").matches(&job));
        assert!(!PrintJobFilter::new().for_print_center("pc-2").matches(&job));
        assert!(!PrintJobFilter::new()
            .with_status(PrintJobStatus::Printing)
            .matches(&job));
    }
}
