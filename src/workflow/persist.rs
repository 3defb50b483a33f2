//! Workflow persistence.
//!
//! On disk a workflow is a single relational blob: steps hold their action's
//! bare reference string, connections hold endpoint ids. Hydration resolves
//! the distinct set of references through the registry (each exactly once)
//! and rebuilds live `Arc<Action>` bindings; the inverse projection strips
//! them back down to strings. The whole workflow is written atomically
//! under one blob key.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::triggers::{RunsOn, Triggers};
use super::types::{Connection, Port, Step, Workflow};
use crate::catalog::{Action, ActionRegistry};
use crate::error::{Error, Result};
use crate::storage::{BlobStore, WORKFLOW_KEY};

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStep {
    id: String,
    name: String,
    #[serde(default)]
    run: String,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    /// Bare action reference; rebound to a live action at load time.
    action: String,
    #[serde(default)]
    inputs: Vec<Port>,
    #[serde(default)]
    outputs: Vec<Port>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedConnection {
    from_step: String,
    from_output: String,
    to_step: String,
    to_input: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedWorkflow {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    on: Triggers,
    #[serde(default, rename = "runsOn")]
    runs_on: RunsOn,
    steps: Vec<PersistedStep>,
    #[serde(default)]
    connections: Vec<PersistedConnection>,
}

fn default_name() -> String {
    Workflow::DEFAULT_NAME.to_string()
}

/// Persists and loads the workflow through a [`BlobStore`].
pub struct WorkflowStore {
    store: Arc<dyn BlobStore>,
}

impl WorkflowStore {
    /// Create a store over the given blob storage.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Persist the workflow as one atomic blob.
    ///
    /// Fails with [`Error::State`] if any step is bound to an action with
    /// no id; ids are assigned at add-time, so this guards an unreachable
    /// state rather than an expected one.
    pub async fn save(&self, workflow: &Workflow) -> Result<()> {
        let blob = serialize(workflow)?;
        self.store.put(WORKFLOW_KEY, &blob).await?;
        debug!(steps = workflow.steps.len(), "Saved workflow");
        Ok(())
    }

    /// Load the persisted workflow, resolving action references through the
    /// registry.
    ///
    /// An absent or corrupt blob yields a default workflow. Connections
    /// referencing step ids absent from the loaded set are a fatal
    /// [`Error::Integrity`] naming the dangling ids.
    pub async fn load(&self, registry: &ActionRegistry) -> Result<Workflow> {
        let Some(blob) = self.store.get(WORKFLOW_KEY).await? else {
            return Ok(Workflow::new());
        };

        let persisted: PersistedWorkflow = match serde_json::from_str(&blob) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Discarding corrupt workflow blob: {}", e);
                return Ok(Workflow::new());
            }
        };

        hydrate(persisted, registry).await
    }
}

/// Project a workflow to its persisted JSON form.
fn serialize(workflow: &Workflow) -> Result<String> {
    let steps = workflow
        .steps
        .iter()
        .map(|step| {
            if step.action.id.is_empty() {
                return Err(Error::State(format!(
                    "Step '{}' is bound to an action with no id",
                    step.id
                )));
            }
            Ok(PersistedStep {
                id: step.id.clone(),
                name: step.name.clone(),
                run: step.run.clone(),
                x: step.x,
                y: step.y,
                action: step.action.id.clone(),
                inputs: step.inputs.clone(),
                outputs: step.outputs.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let connections = workflow
        .connections
        .iter()
        .map(|c| PersistedConnection {
            from_step: c.from_step.clone(),
            from_output: c.from_output.clone(),
            to_step: c.to_step.clone(),
            to_input: c.to_input.clone(),
        })
        .collect();

    let persisted = PersistedWorkflow {
        name: workflow.name.clone(),
        on: workflow.on.clone(),
        runs_on: workflow.runs_on,
        steps,
        connections,
    };
    Ok(serde_json::to_string(&persisted)?)
}

/// Rebuild a live workflow from its persisted form.
async fn hydrate(persisted: PersistedWorkflow, registry: &ActionRegistry) -> Result<Workflow> {
    // Distinct references, resolved exactly once each; identical lookups
    // are deduplicated here rather than fanned out per step.
    let mut references: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for step in &persisted.steps {
        if seen.insert(step.action.as_str()) {
            references.push(&step.action);
        }
    }

    let resolved = join_all(references.iter().map(|r| registry.get(r))).await;
    let mut actions: HashMap<String, Arc<Action>> = HashMap::new();
    for (reference, action) in references.iter().zip(resolved) {
        actions.insert(reference.to_string(), action?);
    }

    let mut ids = HashSet::new();
    for step in &persisted.steps {
        if step.id.is_empty() {
            return Err(Error::Integrity("Persisted step with empty id".to_string()));
        }
        if !ids.insert(step.id.as_str()) {
            return Err(Error::Integrity(format!(
                "Duplicate step id '{}' in persisted workflow",
                step.id
            )));
        }
    }

    let mut dangling: Vec<&str> = Vec::new();
    for connection in &persisted.connections {
        for endpoint in [&connection.from_step, &connection.to_step] {
            if !ids.contains(endpoint.as_str()) && !dangling.contains(&endpoint.as_str()) {
                dangling.push(endpoint);
            }
        }
    }
    if !dangling.is_empty() {
        return Err(Error::Integrity(format!(
            "Connections reference missing steps: {}",
            dangling.join(", ")
        )));
    }

    let steps = persisted
        .steps
        .into_iter()
        .map(|step| {
            // Present by construction: every reference was resolved above.
            let action = actions[&step.action].clone();
            Step {
                id: step.id,
                name: step.name,
                run: step.run,
                x: step.x,
                y: step.y,
                action,
                inputs: step.inputs,
                outputs: step.outputs,
            }
        })
        .collect();

    let connections = persisted
        .connections
        .into_iter()
        .map(|c| Connection {
            from_step: c.from_step,
            from_output: c.from_output,
            to_step: c.to_step,
            to_input: c.to_input,
        })
        .collect();

    Ok(Workflow {
        name: persisted.name,
        on: persisted.on,
        runs_on: persisted.runs_on,
        steps,
        connections,
    })
}
