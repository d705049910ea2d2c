//! Dashboard view state.
//!
//! The task list is the only canonical data here; it is replaced wholesale by
//! each applied fetch. Everything the screen shows besides the list (counts,
//! averages, calendar colors) is derived from it on demand. The remaining
//! fields are session-local UI state: the selected day, the edit marker,
//! per-category drafts and the skip ("mokel") days.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::models::principal::Principal;
use crate::models::task::{
    Category, Task, UpsertTask, DAYS_IN_MONTH, PROGRESS_COMPLETE, PROGRESS_NOT_STARTED,
};
use crate::services::dashboard::{self, DashboardStats};

/// How a form submission finds the task it should update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMatch {
    /// At most one task per category and day: submitting updates the first
    /// task with the selected day and the form's category.
    #[default]
    DayAndType,
    /// Tasks stack: submitting updates only the task opened with Edit (when it
    /// belongs to the form's category), anything else creates a new task.
    EditingId,
}

impl FromStr for UpdateMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day_type" => Ok(UpdateMatch::DayAndType),
            "editing_id" => Ok(UpdateMatch::EditingId),
            other => Err(format!("unknown update match rule '{other}'")),
        }
    }
}

/// One category form as rendered under the calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm<'a> {
    pub category: Category,
    pub label: &'static str,
    pub draft: &'a str,
    pub updating: bool,
}

/// Quick actions offered on a task row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskActions {
    pub mark_in_process: bool,
    pub mark_success: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    principal: Option<Principal>,
    tasks: Vec<Task>,
    selected_day: Option<i32>,
    editing_id: Option<i64>,
    skipped_days: BTreeSet<i32>,
    drafts: BTreeMap<Category, String>,
    notice: Option<String>,
    update_match: UpdateMatch,
}

impl DashboardView {
    pub fn new(update_match: UpdateMatch) -> Self {
        Self {
            update_match,
            ..Default::default()
        }
    }

    pub fn update_match(&self) -> UpdateMatch {
        self.update_match
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Switch the signed-in principal. A different principal starts from an
    /// empty view. Returns whether anything changed.
    pub fn set_principal(&mut self, principal: Option<Principal>) -> bool {
        let same_user =
            self.principal.as_ref().map(|p| &p.uid) == principal.as_ref().map(|p| &p.uid);
        if same_user {
            let changed = self.principal != principal;
            self.principal = principal;
            return changed;
        }
        let fresh = Self {
            principal,
            notice: self.notice.take(),
            ..Self::new(self.update_match)
        };
        *self = fresh;
        true
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replace the list with a fetched one. Returns whether it differed.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) -> bool {
        if self.tasks == tasks {
            return false;
        }
        self.tasks = tasks;
        true
    }

    pub fn selected_day(&self) -> Option<i32> {
        self.selected_day
    }

    pub fn select_day(&mut self, day: i32) -> bool {
        if !(1..=DAYS_IN_MONTH).contains(&day) {
            return false;
        }
        self.selected_day = Some(day);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_day = None;
    }

    pub fn is_skipped(&self, day: i32) -> bool {
        self.skipped_days.contains(&day)
    }

    pub fn skipped_days(&self) -> &BTreeSet<i32> {
        &self.skipped_days
    }

    /// Toggle the skip marker of the selected day. Returns the new state, or
    /// `None` when no day is selected.
    pub fn toggle_skip_selected(&mut self) -> Option<bool> {
        let day = self.selected_day?;
        if self.skipped_days.remove(&day) {
            Some(false)
        } else {
            self.skipped_days.insert(day);
            Some(true)
        }
    }

    pub fn draft(&self, category: Category) -> &str {
        self.drafts.get(&category).map(String::as_str).unwrap_or("")
    }

    pub fn set_draft(&mut self, category: Category, text: impl Into<String>) {
        self.drafts.insert(category, text.into());
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    /// Open a task for editing: mark it, load its content into its
    /// category's draft and jump to its day.
    pub fn start_edit(&mut self, id: i64) -> bool {
        let Some(task) = self.task(id) else {
            return false;
        };
        let (category, content, day) = (task.category(), task.content.clone(), task.day);

        self.editing_id = Some(id);
        if let Some(category) = category {
            self.drafts.insert(category, content);
        }
        self.selected_day = Some(day);
        true
    }

    pub fn forms(&self) -> Vec<CategoryForm<'_>> {
        Category::ALL
            .into_iter()
            .map(|category| CategoryForm {
                category,
                label: category.label(),
                draft: self.draft(category),
                updating: self.editing_id.is_some(),
            })
            .collect()
    }

    /// The task a submission of `category` on the selected day would update.
    pub fn find_existing(&self, category: Category) -> Option<&Task> {
        match self.update_match {
            UpdateMatch::DayAndType => {
                let day = self.selected_day?;
                self.tasks
                    .iter()
                    .find(|t| t.day == day && t.category() == Some(category))
            }
            UpdateMatch::EditingId => self
                .editing_id
                .and_then(|id| self.task(id))
                .filter(|t| t.category() == Some(category)),
        }
    }

    /// Build the upsert for submitting the `category` form, optionally
    /// forcing the progress. `None` when there is nothing to submit: no
    /// principal, no selected day or an empty draft.
    pub fn plan_submit(&self, category: Category, progress: Option<i32>) -> Option<UpsertTask> {
        let principal = self.principal.as_ref()?;
        let day = self.selected_day?;
        let content = self.draft(category);
        if content.is_empty() {
            return None;
        }

        let body = match self.find_existing(category) {
            Some(existing) => UpsertTask {
                id: Some(existing.id),
                user_id: Some(existing.user_id.clone()),
                task_type: Some(existing.task_type.clone()),
                content: Some(content.to_string()),
                day: Some(existing.day),
                progress: Some(progress.unwrap_or(existing.progress)),
            },
            None => UpsertTask {
                id: None,
                user_id: Some(principal.uid.clone()),
                task_type: Some(category.as_str().to_string()),
                content: Some(content.to_string()),
                day: Some(day),
                progress: Some(progress.unwrap_or(PROGRESS_NOT_STARTED)),
            },
        };
        Some(body)
    }

    /// Build the upsert that moves task `id` to `progress`, keeping the rest.
    pub fn plan_progress(&self, id: i64, progress: i32) -> Option<UpsertTask> {
        self.principal.as_ref()?;
        let task = self.task(id)?;
        Some(UpsertTask {
            id: Some(task.id),
            user_id: Some(task.user_id.clone()),
            task_type: Some(task.task_type.clone()),
            content: Some(task.content.clone()),
            day: Some(task.day),
            progress: Some(progress),
        })
    }

    /// Reset form state after a successful write.
    pub fn complete_write(&mut self) {
        self.editing_id = None;
        self.drafts.clear();
        self.notice = None;
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Tasks of the selected day, or all tasks when no day is selected.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        let day = self.selected_day;
        self.tasks
            .iter()
            .filter(move |t| day.map_or(true, |d| t.day == d))
    }

    pub fn actions_for(&self, task: &Task) -> TaskActions {
        if self.is_skipped(task.day) {
            return TaskActions::default();
        }
        TaskActions {
            mark_in_process: task.progress < PROGRESS_COMPLETE,
            mark_success: task.progress > PROGRESS_NOT_STARTED && task.progress < PROGRESS_COMPLETE,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        dashboard::build_stats(&self.tasks, &self.skipped_days)
    }
}
