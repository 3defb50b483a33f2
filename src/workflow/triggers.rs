//! Trigger specification and runner identifiers.
//!
//! Mirrors the `on:` mapping of the generated document: every supported
//! event kind is an optional field, most scoped by an event-subtype list,
//! with branch/tag include-exclude filters on `push` and `pull_request`.
//! Unset kinds are omitted from the serialized form entirely.

use serde::{Deserialize, Serialize};

/// Filter carrying only an event-subtype list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct TypesFilter<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<T>>,
}

impl<T> Default for TypesFilter<T> {
    fn default() -> Self {
        Self { types: None }
    }
}

impl<T> TypesFilter<T> {
    /// Scope the trigger to the given event subtypes.
    pub fn types(types: Vec<T>) -> Self {
        Self { types: Some(types) }
    }
}

/// Filter for event kinds with no options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyFilter {}

/// Branch/tag filters for `push`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    #[serde(
        default,
        rename = "branches-ignore",
        skip_serializing_if = "Option::is_none"
    )]
    pub branches_ignore: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, rename = "tags-ignore", skip_serializing_if = "Option::is_none")]
    pub tags_ignore: Option<Vec<String>>,
}

/// Subtype and branch/tag filters for `pull_request` and
/// `pull_request_target`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<PullRequestEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    #[serde(
        default,
        rename = "branches-ignore",
        skip_serializing_if = "Option::is_none"
    )]
    pub branches_ignore: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, rename = "tags-ignore", skip_serializing_if = "Option::is_none")]
    pub tags_ignore: Option<Vec<String>>,
}

/// One cron schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronEntry {
    pub cron: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunEvent {
    Created,
    Rerequested,
    Completed,
    RequestedAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSuiteEvent {
    Completed,
    Requested,
    Rerequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCommentEvent {
    Created,
    Edited,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuesEvent {
    Opened,
    Edited,
    Deleted,
    Transferred,
    Pinned,
    Unpinned,
    Closed,
    Reopened,
    Assigned,
    Unassigned,
    Labeled,
    Unlabeled,
    Locked,
    Unlocked,
    Milestoned,
    Demilestoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelEvent {
    Created,
    Edited,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneEvent {
    Created,
    Closed,
    Opened,
    Edited,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectEvent {
    Created,
    Updated,
    Closed,
    Reopened,
    Edited,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCardEvent {
    Created,
    Moved,
    Converted,
    Edited,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectColumnEvent {
    Created,
    Edited,
    Moved,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestEvent {
    Assigned,
    Unassigned,
    Labeled,
    Unlabeled,
    Opened,
    Edited,
    Closed,
    Reopened,
    Synchronize,
    ReadyForReview,
    Locked,
    Unlocked,
    ReviewRequested,
    ReviewRequestRemoved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestReviewEvent {
    Submitted,
    Edited,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestReviewCommentEvent {
    Created,
    Edited,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryPackageEvent {
    Published,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseEvent {
    Published,
    Unpublished,
    Created,
    Edited,
    Deleted,
    Prereleased,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchEvent {
    Started,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunEvent {
    Completed,
    Requested,
}

/// The workflow's trigger specification (`on:`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_run: Option<TypesFilter<CheckRunEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_suite: Option<TypesFilter<CheckSuiteEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_status: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gollum: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_comment: Option<TypesFilter<IssueCommentEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<TypesFilter<IssuesEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<TypesFilter<LabelEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<TypesFilter<MilestoneEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_build: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<TypesFilter<ProjectEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_card: Option<TypesFilter<ProjectCardEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_column: Option<TypesFilter<ProjectColumnEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_review: Option<TypesFilter<PullRequestReviewEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_review_comment: Option<TypesFilter<PullRequestReviewCommentEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_target: Option<PullRequestFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_package: Option<TypesFilter<RegistryPackageEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<TypesFilter<ReleaseEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<TypesFilter<WatchEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_run: Option<TypesFilter<WorkflowRunEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<CronEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<EmptyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_dispatch: Option<EmptyFilter>,
}

/// Runner identifiers accepted for `runs-on`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunsOn {
    #[serde(rename = "windows-latest")]
    WindowsLatest,
    #[serde(rename = "windows-2019")]
    Windows2019,
    #[default]
    #[serde(rename = "ubuntu-latest")]
    UbuntuLatest,
    #[serde(rename = "ubuntu-20.04")]
    Ubuntu2004,
    #[serde(rename = "ubuntu-18.04")]
    Ubuntu1804,
    #[serde(rename = "ubuntu-16.04")]
    Ubuntu1604,
    #[serde(rename = "macos-latest")]
    MacosLatest,
    #[serde(rename = "macos-10.15")]
    Macos1015,
}

impl RunsOn {
    /// The label as it appears in the generated document.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunsOn::WindowsLatest => "windows-latest",
            RunsOn::Windows2019 => "windows-2019",
            RunsOn::UbuntuLatest => "ubuntu-latest",
            RunsOn::Ubuntu2004 => "ubuntu-20.04",
            RunsOn::Ubuntu1804 => "ubuntu-18.04",
            RunsOn::Ubuntu1604 => "ubuntu-16.04",
            RunsOn::MacosLatest => "macos-latest",
            RunsOn::Macos1015 => "macos-10.15",
        }
    }
}

impl std::fmt::Display for RunsOn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_triggers_serialize_to_empty_map() {
        let yaml = serde_yaml::to_string(&Triggers::default()).unwrap();
        assert_eq!(yaml.trim(), "{}");
    }

    #[test]
    fn test_push_filter_uses_ignore_keys() {
        let triggers = Triggers {
            push: Some(PushFilter {
                branches: Some(vec!["main".to_string()]),
                branches_ignore: None,
                tags: None,
                tags_ignore: Some(vec!["v0.*".to_string()]),
            }),
            ..Default::default()
        };

        let yaml = serde_yaml::to_string(&triggers).unwrap();
        assert!(yaml.contains("push:"));
        assert!(yaml.contains("branches:"));
        assert!(yaml.contains("tags-ignore:"));
        assert!(!yaml.contains("branches-ignore"));
    }

    #[test]
    fn test_event_subtypes_serialize_snake_case() {
        let triggers = Triggers {
            pull_request: Some(PullRequestFilter {
                types: Some(vec![
                    PullRequestEvent::Opened,
                    PullRequestEvent::ReadyForReview,
                ]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let yaml = serde_yaml::to_string(&triggers).unwrap();
        assert!(yaml.contains("opened"));
        assert!(yaml.contains("ready_for_review"));
    }

    #[test]
    fn test_schedule_is_flat_cron_list() {
        let triggers = Triggers {
            schedule: Some(vec![CronEntry {
                cron: "0 0 * * *".to_string(),
            }]),
            ..Default::default()
        };

        let yaml = serde_yaml::to_string(&triggers).unwrap();
        assert!(yaml.contains("schedule:"));
        assert!(yaml.contains("cron:"));

        let back: Triggers = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.schedule.unwrap()[0].cron, "0 0 * * *");
    }

    #[test]
    fn test_runner_labels() {
        assert_eq!(RunsOn::default(), RunsOn::UbuntuLatest);
        assert_eq!(
            serde_yaml::to_string(&RunsOn::Macos1015).unwrap().trim(),
            "macos-10.15"
        );
        let parsed: RunsOn = serde_yaml::from_str("ubuntu-20.04").unwrap();
        assert_eq!(parsed, RunsOn::Ubuntu2004);
    }

    #[test]
    fn test_triggers_roundtrip_json() {
        let triggers = Triggers {
            workflow_dispatch: Some(EmptyFilter {}),
            issues: Some(TypesFilter::types(vec![
                IssuesEvent::Opened,
                IssuesEvent::Labeled,
            ])),
            ..Default::default()
        };

        let json = serde_json::to_string(&triggers).unwrap();
        let back: Triggers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, triggers);
        // Unset kinds are omitted entirely.
        assert!(!json.contains("check_run"));
    }
}
