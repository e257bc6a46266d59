//! Prerequisite status of templates that depend on another template.
//!
//! Only self-references and two-node mutual references are reported as
//! cycles. Longer chains (A -> B -> C -> A) resolve per immediate neighbour
//! and are not flagged; callers rely on that narrower scope.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schedule::TaskTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Ok,
    Disabled,
    Missing,
    Cycle,
}

impl DependencyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Disabled => "disabled",
            Self::Missing => "missing",
            Self::Cycle => "cycle",
        }
    }
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInfo {
    pub status: DependencyStatus,
    pub depends_on_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on_name: Option<String>,
}

impl DependencyInfo {
    pub fn is_ok(&self) -> bool {
        self.status == DependencyStatus::Ok
    }

    /// Human-readable note for an excluded dependent.
    pub fn describe(&self, dependent: &TaskTemplate) -> String {
        let target = self
            .depends_on_name
            .as_deref()
            .unwrap_or(self.depends_on_id.as_str());
        match self.status {
            DependencyStatus::Ok => format!("'{}' depends on '{target}'", dependent.task_name),
            DependencyStatus::Disabled => format!(
                "'{}' skipped: its dependency '{target}' is inactive",
                dependent.task_name
            ),
            DependencyStatus::Missing => format!(
                "'{}' skipped: its dependency '{target}' does not exist",
                dependent.task_name
            ),
            DependencyStatus::Cycle => format!(
                "'{}' skipped: circular dependency with '{target}'",
                dependent.task_name
            ),
        }
    }
}

/// Resolve the dependency of `template` against the full template set.
///
/// Returns `None` when the template has no dependency.
pub fn resolve_dependency(
    template: &TaskTemplate,
    templates_by_id: &HashMap<&str, &TaskTemplate>,
) -> Option<DependencyInfo> {
    let depends_on = template.depends_on.as_deref()?;

    let info = |status, name: Option<&str>| DependencyInfo {
        status,
        depends_on_id: depends_on.to_string(),
        depends_on_name: name.map(str::to_string),
    };

    if depends_on == template.id {
        return Some(info(DependencyStatus::Cycle, Some(template.task_name.as_str())));
    }

    let Some(target) = templates_by_id.get(depends_on) else {
        return Some(info(DependencyStatus::Missing, None));
    };

    let name = Some(target.task_name.as_str());
    if target.depends_on.as_deref() == Some(template.id.as_str()) {
        Some(info(DependencyStatus::Cycle, name))
    } else if !target.is_active {
        Some(info(DependencyStatus::Disabled, name))
    } else {
        Some(info(DependencyStatus::Ok, name))
    }
}

/// Dependency lookups over one template set.
pub struct DependencyResolver<'a> {
    templates: &'a [TaskTemplate],
    by_id: HashMap<&'a str, &'a TaskTemplate>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(templates: &'a [TaskTemplate]) -> Self {
        let by_id = templates.iter().map(|t| (t.id.as_str(), t)).collect();
        Self { templates, by_id }
    }

    pub fn resolve(&self, template: &TaskTemplate) -> Option<DependencyInfo> {
        resolve_dependency(template, &self.by_id)
    }

    /// Status for every template that declares a dependency, in input order.
    pub fn resolve_all(&self) -> Vec<(&'a TaskTemplate, DependencyInfo)> {
        self.templates
            .iter()
            .filter_map(|t| self.resolve(t).map(|info| (t, info)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TimeWindow;

    fn task(id: &str) -> TaskTemplate {
        TaskTemplate::flexible(id, format!("Task {id}"), TimeWindow::Anytime, 30)
    }

    fn status_of(templates: &[TaskTemplate], id: &str) -> Option<DependencyStatus> {
        let resolver = DependencyResolver::new(templates);
        let t = templates.iter().find(|t| t.id == id).unwrap();
        resolver.resolve(t).map(|i| i.status)
    }

    #[test]
    fn no_dependency_resolves_to_none() {
        let templates = vec![task("a")];
        assert_eq!(status_of(&templates, "a"), None);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let templates = vec![task("a").depending_on("a")];
        assert_eq!(status_of(&templates, "a"), Some(DependencyStatus::Cycle));
    }

    #[test]
    fn mutual_reference_is_a_cycle_for_both() {
        let templates = vec![task("a").depending_on("b"), task("b").depending_on("a")];
        assert_eq!(status_of(&templates, "a"), Some(DependencyStatus::Cycle));
        assert_eq!(status_of(&templates, "b"), Some(DependencyStatus::Cycle));
    }

    #[test]
    fn missing_and_disabled() {
        let templates = vec![
            task("a").depending_on("ghost"),
            task("b").depending_on("c"),
            task("c").inactive(),
        ];
        assert_eq!(status_of(&templates, "a"), Some(DependencyStatus::Missing));
        assert_eq!(status_of(&templates, "b"), Some(DependencyStatus::Disabled));
    }

    #[test]
    fn ok_carries_dependency_name() {
        let templates = vec![task("a").depending_on("b"), task("b")];
        let resolver = DependencyResolver::new(&templates);
        let info = resolver.resolve(&templates[0]).unwrap();
        assert!(info.is_ok());
        assert_eq!(info.depends_on_id, "b");
        assert_eq!(info.depends_on_name.as_deref(), Some("Task b"));
    }

    #[test]
    fn three_node_cycles_are_not_detected() {
        let templates = vec![
            task("a").depending_on("b"),
            task("b").depending_on("c"),
            task("c").depending_on("a"),
        ];
        for id in ["a", "b", "c"] {
            assert_eq!(status_of(&templates, id), Some(DependencyStatus::Ok));
        }
    }

    #[test]
    fn resolve_all_skips_independent_templates() {
        let templates = vec![task("a"), task("b").depending_on("a")];
        let resolver = DependencyResolver::new(&templates);
        let all = resolver.resolve_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0.id, "b");
    }

    #[test]
    fn describe_names_the_dependency() {
        let templates = vec![task("a").depending_on("ghost")];
        let resolver = DependencyResolver::new(&templates);
        let info = resolver.resolve(&templates[0]).unwrap();
        assert_eq!(
            info.describe(&templates[0]),
            "'Task a' skipped: its dependency 'ghost' does not exist"
        );
    }
}
