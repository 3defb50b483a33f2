//! Workflow compilation.
//!
//! Projects the graph into a GitHub Actions configuration document: steps in
//! topological order, each input connection bound either as an `env` entry
//! (custom environment variable ports) or a `with` argument, referencing the
//! upstream output through the `${{ steps.<id>.outputs.<id> }}` expression
//! syntax. Output is deterministic: ties in the ordering are broken by step
//! insertion order and the binding maps are key-sorted.

use std::collections::BTreeMap;

use serde::Serialize;

use super::triggers::{RunsOn, Triggers};
use super::types::{Step, Workflow};
use crate::catalog::PortType;
use crate::error::{Error, Result};

/// Compile a workflow into its YAML configuration document.
///
/// Fails with [`Error::Cycle`] when the connections form a cycle, naming
/// the participating steps.
pub fn compile(workflow: &Workflow) -> Result<String> {
    let ordered = ordered_steps(workflow)?;
    let steps = ordered
        .iter()
        .map(|step| step_record(step, workflow))
        .collect();

    let document = Document {
        name: &workflow.name,
        on: &workflow.on,
        jobs: Jobs {
            job: Job {
                name: &workflow.name,
                runs_on: workflow.runs_on,
                steps,
            },
        },
    };

    Ok(serde_yaml::to_string(&document)?)
}

#[derive(Serialize)]
struct Document<'a> {
    name: &'a str,
    on: &'a Triggers,
    jobs: Jobs<'a>,
}

#[derive(Serialize)]
struct Jobs<'a> {
    job: Job<'a>,
}

#[derive(Serialize)]
struct Job<'a> {
    name: &'a str,
    #[serde(rename = "runs-on")]
    runs_on: RunsOn,
    steps: Vec<StepRecord<'a>>,
}

#[derive(Serialize)]
struct StepRecord<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    uses: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shell: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<BTreeMap<&'a str, String>>,
    #[serde(rename = "with", skip_serializing_if = "Option::is_none")]
    args: Option<BTreeMap<&'a str, String>>,
}

/// Order steps topologically. Steps with no relative constraint keep their
/// insertion order, so repeated compilation of the same graph is
/// byte-identical.
fn ordered_steps(workflow: &Workflow) -> Result<Vec<&Step>> {
    let index_of: std::collections::HashMap<&str, usize> = workflow
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();

    let n = workflow.steps.len();
    let mut in_degree = vec![0usize; n];
    let mut edges: Vec<(usize, usize)> = Vec::with_capacity(workflow.connections.len());
    for connection in &workflow.connections {
        let (Some(&from), Some(&to)) = (
            index_of.get(connection.from_step.as_str()),
            index_of.get(connection.to_step.as_str()),
        ) else {
            // Connections are validated against the step set at mutation and
            // load time; nothing else to do for an edge with no endpoint.
            continue;
        };
        edges.push((from, to));
        in_degree[to] += 1;
    }

    let mut emitted = vec![false; n];
    let mut ordered = Vec::with_capacity(n);
    while ordered.len() < n {
        // First not-yet-emitted step with no remaining prerequisites, in
        // insertion order.
        let next = (0..n).find(|&i| !emitted[i] && in_degree[i] == 0);
        let Some(next) = next else {
            return Err(Error::Cycle {
                steps: cycle_members(workflow, &edges, &emitted),
            });
        };

        emitted[next] = true;
        ordered.push(&workflow.steps[next]);
        for &(from, to) in &edges {
            if from == next {
                in_degree[to] -= 1;
            }
        }
    }

    Ok(ordered)
}

/// Narrow the unprocessed remainder down to the steps actually on a cycle:
/// iteratively shed nodes with no incoming or no outgoing edge within the
/// remainder, then report what survives in insertion order.
fn cycle_members(workflow: &Workflow, edges: &[(usize, usize)], emitted: &[bool]) -> Vec<String> {
    let mut remaining: Vec<bool> = emitted.iter().map(|&e| !e).collect();

    loop {
        let mut shed = false;
        for i in 0..remaining.len() {
            if !remaining[i] {
                continue;
            }
            let has_in = edges.iter().any(|&(f, t)| t == i && remaining[f]);
            let has_out = edges.iter().any(|&(f, t)| f == i && remaining[t]);
            if !has_in || !has_out {
                remaining[i] = false;
                shed = true;
            }
        }
        if !shed {
            break;
        }
    }

    workflow
        .steps
        .iter()
        .enumerate()
        .filter(|(i, _)| remaining[*i])
        .map(|(_, s)| s.id.clone())
        .collect()
}

/// Emit one pipeline-step record, binding incoming connections to `env` or
/// `with` entries.
fn step_record<'a>(step: &'a Step, workflow: &'a Workflow) -> StepRecord<'a> {
    let mut record = match step.action.shell_kind() {
        Some(kind) => StepRecord {
            id: &step.id,
            name: &step.name,
            uses: None,
            shell: Some(kind),
            run: Some(&step.run),
            env: None,
            args: None,
        },
        None => StepRecord {
            id: &step.id,
            name: &step.name,
            uses: Some(&step.action.id),
            shell: None,
            run: None,
            env: None,
            args: None,
        },
    };

    let mut env: BTreeMap<&str, String> = BTreeMap::new();
    let mut args: BTreeMap<&str, String> = BTreeMap::new();
    for connection in &workflow.connections {
        if connection.to_step != step.id {
            continue;
        }
        // Stale wiring after an action's inputs changed: skipped, by design.
        let Some(input) = step.inputs.iter().find(|p| p.id == connection.to_input) else {
            continue;
        };

        let expression = format!(
            "${{{{ steps.{}.outputs.{} }}}}",
            connection.from_step, connection.from_output
        );
        match input.port_type {
            PortType::EnvCustom => {
                env.insert(input.id.as_str(), expression);
            }
            _ => {
                args.insert(input.id.as_str(), expression);
            }
        }
    }

    if !env.is_empty() {
        record.env = Some(env);
    }
    if !args.is_empty() {
        record.args = Some(args);
    }
    record
}
