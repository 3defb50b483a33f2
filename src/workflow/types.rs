//! Workflow graph types and mutations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::triggers::{RunsOn, Triggers};
use crate::catalog::{Action, PortType};
use crate::error::{Error, Result};

/// A port snapshot on a step (`{id, type}`).
///
/// Snapshotted from the bound action when the step is added, so later
/// changes to the action's declared ports never mutate placed steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(rename = "type")]
    pub port_type: PortType,
}

/// A placed instance of an action within one workflow.
#[derive(Debug, Clone)]
pub struct Step {
    /// Locally unique id, assigned at add-time. Never empty.
    pub id: String,
    pub name: String,
    /// Free-form shell command text; meaningful only for `_shell/*` actions.
    pub run: String,
    /// Canvas placement. Opaque to the compiler.
    pub x: f64,
    pub y: f64,
    /// The bound action, shared across steps.
    pub action: Arc<Action>,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

/// A directed data-flow edge from one step's output port to another step's
/// input port. Endpoints are stored as ids, not references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from_step: String,
    pub from_output: String,
    pub to_step: String,
    pub to_input: String,
}

/// The mutable editing state of the builder.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub name: String,
    pub on: Triggers,
    pub runs_on: RunsOn,
    pub steps: Vec<Step>,
    pub connections: Vec<Connection>,
}

impl Workflow {
    /// Placeholder name of a freshly constructed workflow.
    pub const DEFAULT_NAME: &'static str = "My workflow";

    /// Create an empty workflow with defaults.
    pub fn new() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            on: Triggers::default(),
            runs_on: RunsOn::default(),
            steps: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Look up a step by id.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Place a new step bound to `action`, snapshotting its current ports.
    /// Returns the generated step id.
    pub fn add(&mut self, action: &Arc<Action>) -> String {
        let id = self.generate_id(&action.id);
        self.steps.push(Step {
            id: id.clone(),
            name: action.name.clone().unwrap_or_default(),
            run: String::new(),
            x: 0.0,
            y: 0.0,
            action: action.clone(),
            inputs: action
                .inputs
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|i| Port {
                    id: i.id.clone(),
                    port_type: i.port_type,
                })
                .collect(),
            outputs: action
                .outputs
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|o| Port {
                    id: o.id.clone(),
                    port_type: o.port_type,
                })
                .collect(),
        });
        id
    }

    /// Remove a step and every connection touching it. Unknown ids are a
    /// no-op.
    pub fn remove(&mut self, step_id: &str) {
        let Some(index) = self.steps.iter().position(|s| s.id == step_id) else {
            return;
        };
        self.steps.remove(index);
        self.connections
            .retain(|c| c.from_step != step_id && c.to_step != step_id);
    }

    /// Connect an output port to an input port.
    ///
    /// Both endpoints must name steps in this workflow, and the input port
    /// must not already have an incoming connection. Port ids are not
    /// validated: wiring to a port the action no longer declares is legal
    /// and skipped at compile time.
    pub fn connect(
        &mut self,
        from_step: &str,
        from_output: &str,
        to_step: &str,
        to_input: &str,
    ) -> Result<()> {
        if self.step(from_step).is_none() {
            return Err(Error::Validation(format!(
                "Connection source references unknown step '{}'",
                from_step
            )));
        }
        if self.step(to_step).is_none() {
            return Err(Error::Validation(format!(
                "Connection target references unknown step '{}'",
                to_step
            )));
        }
        if let Some(existing) = self
            .connections
            .iter()
            .find(|c| c.to_step == to_step && c.to_input == to_input)
        {
            return Err(Error::Validation(format!(
                "Input '{}' of step '{}' is already fed by step '{}'",
                to_input, to_step, existing.from_step
            )));
        }

        self.connections.push(Connection {
            from_step: from_step.to_string(),
            from_output: from_output.to_string(),
            to_step: to_step.to_string(),
            to_input: to_input.to_string(),
        });
        Ok(())
    }

    /// Remove the exact connection, if present. Returns whether one was
    /// removed.
    pub fn disconnect(
        &mut self,
        from_step: &str,
        from_output: &str,
        to_step: &str,
        to_input: &str,
    ) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| {
            !(c.from_step == from_step
                && c.from_output == from_output
                && c.to_step == to_step
                && c.to_input == to_input)
        });
        self.connections.len() != before
    }

    /// Derive a fresh unique step id from an action reference.
    ///
    /// The base is the repo segment (after `/`, before any `@`); collisions
    /// append `-1`, `-2`, ... taking the first unused suffix.
    fn generate_id(&self, action_id: &str) -> String {
        let base = action_id
            .split('/')
            .nth(1)
            .unwrap_or(action_id)
            .split('@')
            .next()
            .unwrap_or_default();

        for i in 0.. {
            let candidate = if i == 0 {
                base.to_string()
            } else {
                format!("{}-{}", base, i)
            };
            if self.step(&candidate).is_none() {
                return candidate;
            }
        }
        unreachable!("id space exhausted");
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionInput, ActionOutput};

    fn shell_action(kind: &str, name: &str) -> Arc<Action> {
        Arc::new(Action::builtin(
            &format!("_shell/{}", kind),
            name,
            "Run a script",
        ))
    }

    fn external_action(
        id: &str,
        inputs: Vec<(&str, PortType)>,
        outputs: Vec<&str>,
    ) -> Arc<Action> {
        let mut action = Action::with_summary(id, "Test action", "");
        action.inputs = Some(
            inputs
                .into_iter()
                .map(|(port_id, port_type)| ActionInput {
                    port_type,
                    id: port_id.to_string(),
                    description: String::new(),
                    default: String::new(),
                    required: false,
                })
                .collect(),
        );
        action.outputs = Some(
            outputs
                .into_iter()
                .map(|port_id| ActionOutput {
                    port_type: PortType::Output,
                    id: port_id.to_string(),
                    description: String::new(),
                })
                .collect(),
        );
        Arc::new(action)
    }

    #[test]
    fn test_new_workflow_defaults() {
        let workflow = Workflow::new();
        assert_eq!(workflow.name, "My workflow");
        assert_eq!(workflow.runs_on, RunsOn::UbuntuLatest);
        assert_eq!(workflow.on, Triggers::default());
        assert!(workflow.steps.is_empty());
        assert!(workflow.connections.is_empty());
    }

    #[test]
    fn test_add_snapshots_ports() {
        let action = external_action(
            "acme/tool@v1",
            vec![("in1", PortType::Input), ("token", PortType::EnvCustom)],
            vec!["out1"],
        );
        let mut workflow = Workflow::new();

        let id = workflow.add(&action);
        let step = workflow.step(&id).unwrap();

        assert_eq!(step.name, "Test action");
        assert_eq!(step.inputs.len(), 2);
        assert_eq!(step.inputs[1].port_type, PortType::EnvCustom);
        assert_eq!(step.outputs.len(), 1);
        assert!(Arc::ptr_eq(&step.action, &action));
    }

    #[test]
    fn test_id_generation_appends_suffixes() {
        let bash = shell_action("bash", "Bash");
        let mut workflow = Workflow::new();

        assert_eq!(workflow.add(&bash), "bash");
        assert_eq!(workflow.add(&bash), "bash-1");
        assert_eq!(workflow.add(&bash), "bash-2");
    }

    #[test]
    fn test_id_generation_uses_repo_segment() {
        let checkout = external_action("actions/checkout@v2", vec![], vec![]);
        let mut workflow = Workflow::new();
        assert_eq!(workflow.add(&checkout), "checkout");
    }

    #[test]
    fn test_remove_drops_touching_connections() {
        let a = external_action("acme/a@v1", vec![], vec!["out"]);
        let b = external_action("acme/b@v1", vec![("in", PortType::Input)], vec![]);
        let mut workflow = Workflow::new();

        let a_id = workflow.add(&a);
        let b_id = workflow.add(&b);
        workflow.connect(&a_id, "out", &b_id, "in").unwrap();

        workflow.remove(&a_id);
        assert!(workflow.step(&a_id).is_none());
        assert!(workflow.connections.is_empty());
        assert!(workflow.step(&b_id).is_some());
    }

    #[test]
    fn test_add_then_remove_restores_connections() {
        let a = external_action("acme/a@v1", vec![], vec!["out"]);
        let b = external_action("acme/b@v1", vec![("in", PortType::Input)], vec![]);
        let mut workflow = Workflow::new();

        let a_id = workflow.add(&a);
        let b_id = workflow.add(&b);
        workflow.connect(&a_id, "out", &b_id, "in").unwrap();
        let before = workflow.connections.clone();

        let c_id = workflow.add(&a);
        workflow.remove(&c_id);

        assert_eq!(workflow.connections, before);
    }

    #[test]
    fn test_connect_rejects_unknown_steps() {
        let a = external_action("acme/a@v1", vec![], vec!["out"]);
        let mut workflow = Workflow::new();
        let a_id = workflow.add(&a);

        let err = workflow.connect(&a_id, "out", "ghost", "in").unwrap_err();
        assert!(err.to_string().contains("ghost"));

        let err = workflow.connect("phantom", "out", &a_id, "in").unwrap_err();
        assert!(err.to_string().contains("phantom"));
    }

    #[test]
    fn test_connect_rejects_occupied_input() {
        let a = external_action("acme/a@v1", vec![], vec!["out"]);
        let b = external_action("acme/b@v1", vec![("in", PortType::Input)], vec![]);
        let mut workflow = Workflow::new();

        let a1 = workflow.add(&a);
        let a2 = workflow.add(&a);
        let b_id = workflow.add(&b);

        workflow.connect(&a1, "out", &b_id, "in").unwrap();
        let err = workflow.connect(&a2, "out", &b_id, "in").unwrap_err();
        assert!(err.to_string().contains("already fed"));

        // Fan-out from one output stays legal.
        let c = external_action("acme/c@v1", vec![("in", PortType::Input)], vec![]);
        let c_id = workflow.add(&c);
        workflow.connect(&a1, "out", &c_id, "in").unwrap();
    }

    #[test]
    fn test_disconnect_removes_exact_edge() {
        let a = external_action("acme/a@v1", vec![], vec!["out"]);
        let b = external_action("acme/b@v1", vec![("in", PortType::Input)], vec![]);
        let mut workflow = Workflow::new();

        let a_id = workflow.add(&a);
        let b_id = workflow.add(&b);
        workflow.connect(&a_id, "out", &b_id, "in").unwrap();

        assert!(!workflow.disconnect(&a_id, "other", &b_id, "in"));
        assert!(workflow.disconnect(&a_id, "out", &b_id, "in"));
        assert!(workflow.connections.is_empty());
    }
}
