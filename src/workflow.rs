//! Status workflow for Spike records.
//!
//! A [`StatusSet`] is a small static state machine. [`StatusSet::get_allowed_transitions`]
//! only reports legal targets; callers that apply a change go through
//! [`StatusSet::check_transition`] first.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};

/// One named status and its allowed successors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub allowed_transition_ids: Vec<String>,
    #[serde(default)]
    pub is_initial: bool,
    #[serde(default)]
    pub is_final: bool,
}

impl StatusDefinition {
    fn new(id: &str, name: &str, description: &str, exits: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            allowed_transition_ids: exits.iter().map(|s| s.to_string()).collect(),
            is_initial: false,
            is_final: false,
        }
    }

    fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }

    fn terminal(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// Ordered set of statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSet {
    pub statuses: Vec<StatusDefinition>,
}

impl Default for StatusSet {
    fn default() -> Self {
        Self::default_spike()
    }
}

impl StatusSet {
    /// The five Spike statuses.
    pub fn default_spike() -> Self {
        Self {
            statuses: vec![
                StatusDefinition::new("DRAFT", "Draft", "Being written", &["SUBMITTED"]).initial(),
                StatusDefinition::new(
                    "SUBMITTED",
                    "Submitted",
                    "Awaiting review",
                    &["APPROVED", "REJECTED"],
                ),
                StatusDefinition::new("APPROVED", "Approved", "Accepted", &["ARCHIVED"]),
                StatusDefinition::new(
                    "REJECTED",
                    "Rejected",
                    "Sent back or abandoned",
                    &["DRAFT", "ARCHIVED"],
                ),
                StatusDefinition::new("ARCHIVED", "Archived", "Closed", &[]).terminal(),
            ],
        }
    }

    /// Parse and validate a status list from YAML.
    ///
    /// Accepts either a bare list or a mapping with a `statuses` key.
    pub fn from_yaml(content: &str) -> Result<Self, WorkflowError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Wrapped(StatusSet),
            Bare(Vec<StatusDefinition>),
        }

        let set = match serde_yaml::from_str::<Document>(content)
            .map_err(|e| WorkflowError::Invalid(e.to_string()))?
        {
            Document::Wrapped(set) => set,
            Document::Bare(statuses) => StatusSet { statuses },
        };
        set.validate()?;
        Ok(set)
    }

    pub fn get(&self, id: &str) -> Option<&StatusDefinition> {
        self.statuses.iter().find(|s| s.id == id)
    }

    pub fn initial(&self) -> Option<&StatusDefinition> {
        self.statuses.iter().find(|s| s.is_initial)
    }

    /// Legal targets from `id`. Unknown ids have none.
    pub fn get_allowed_transitions(&self, id: &str) -> Vec<&str> {
        self.get(id)
            .map(|s| s.allowed_transition_ids.iter().map(|t| t.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn is_valid_transition(&self, from: &str, to: &str) -> bool {
        self.get(from)
            .is_some_and(|s| s.allowed_transition_ids.iter().any(|t| t == to))
    }

    /// Guard applied before a status change.
    pub fn check_transition(&self, from: &str, to: &str) -> Result<(), WorkflowError> {
        if self.get(from).is_none() {
            return Err(WorkflowError::UnknownStatus(from.to_string()));
        }
        if self.get(to).is_none() {
            return Err(WorkflowError::UnknownStatus(to.to_string()));
        }
        if !self.is_valid_transition(from, to) {
            return Err(WorkflowError::IllegalTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        let initial = self.statuses.iter().filter(|s| s.is_initial).count();
        if initial != 1 {
            return Err(WorkflowError::Invalid(format!(
                "exactly one initial status is required, found {}",
                initial
            )));
        }

        for (i, status) in self.statuses.iter().enumerate() {
            if self.statuses[..i].iter().any(|s| s.id == status.id) {
                return Err(WorkflowError::Invalid(format!(
                    "status '{}' is defined twice",
                    status.id
                )));
            }
            if status.is_final && !status.allowed_transition_ids.is_empty() {
                return Err(WorkflowError::Invalid(format!(
                    "final status '{}' must not have transitions",
                    status.id
                )));
            }
            for target in &status.allowed_transition_ids {
                if self.get(target).is_none() {
                    return Err(WorkflowError::Invalid(format!(
                        "status '{}' has transition '{}' which is not defined",
                        status.id, target
                    )));
                }
            }
        }

        Ok(())
    }
}
