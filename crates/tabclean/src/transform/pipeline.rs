//! Ordered transformation pipeline.
//!
//! The pipeline is an editable list of steps. Running it always starts from
//! the original table handed in by the caller, so editing, removing, or
//! reordering steps never compounds on a previously transformed result.

use super::transformations::{TransformKind, apply_transformation};
use crate::error::{CleaningError, Result, ResultExt};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// Identifier of a pipeline step, unique within its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One transformation in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: StepId,
    #[serde(rename = "type")]
    pub kind: TransformKind,
    pub column: String,
}

/// Editing state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Building,
}

/// Ordered list of transformation steps plus the id allocator.
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    steps: Vec<PipelineStep>,
    next_id: u64,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `Idle` with no steps, `Building` otherwise.
    pub fn state(&self) -> PipelineState {
        if self.steps.is_empty() {
            PipelineState::Idle
        } else {
            PipelineState::Building
        }
    }

    pub fn step(&self, id: StepId) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    fn position(&self, id: StepId) -> Result<usize> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .ok_or(CleaningError::StepNotFound(id))
    }

    /// Append a step and return its freshly allocated id.
    ///
    /// The column is not checked here: an earlier step may be what creates
    /// it (for example a one-hot encoding). Fails with `StepIdExhausted`
    /// once the id space is used up.
    pub fn add_step(&mut self, kind: TransformKind, column: impl Into<String>) -> Result<StepId> {
        let id = StepId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(CleaningError::StepIdExhausted(id))?;
        self.steps.push(PipelineStep {
            id,
            kind,
            column: column.into(),
        });
        Ok(id)
    }

    pub fn remove_step(&mut self, id: StepId) -> Result<PipelineStep> {
        let pos = self.position(id)?;
        Ok(self.steps.remove(pos))
    }

    /// Change the kind and/or column of an existing step in place.
    pub fn update_step(
        &mut self,
        id: StepId,
        kind: Option<TransformKind>,
        column: Option<String>,
    ) -> Result<()> {
        let pos = self.position(id)?;
        let step = &mut self.steps[pos];
        if let Some(kind) = kind {
            step.kind = kind;
        }
        if let Some(column) = column {
            step.column = column;
        }
        Ok(())
    }

    /// Replace the step order with `order`, which must list every current
    /// step id exactly once.
    pub fn reorder(&mut self, order: &[StepId]) -> Result<()> {
        if order.len() != self.steps.len() {
            return Err(CleaningError::InvalidStepOrder(format!(
                "expected {} step ids, got {}",
                self.steps.len(),
                order.len()
            )));
        }

        let mut seen = HashSet::with_capacity(order.len());
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            if !seen.insert(*id) {
                return Err(CleaningError::InvalidStepOrder(format!(
                    "step {} listed twice",
                    id
                )));
            }
            let step = self
                .step(*id)
                .ok_or_else(|| CleaningError::InvalidStepOrder(format!("unknown step {}", id)))?;
            reordered.push(step.clone());
        }

        self.steps = reordered;
        Ok(())
    }

    /// Move one step to position `to` (clamped to the end).
    pub fn move_step(&mut self, id: StepId, to: usize) -> Result<()> {
        let from = self.position(id)?;
        let step = self.steps.remove(from);
        let to = to.min(self.steps.len());
        self.steps.insert(to, step);
        Ok(())
    }

    /// Replace all steps with a saved recipe.
    ///
    /// Ids must be unique and leave room for a successor; later
    /// [`add_step`](Self::add_step) calls continue after the largest loaded
    /// id. On error the pipeline is left as it was.
    pub fn load_recipe(&mut self, steps: Vec<PipelineStep>) -> Result<()> {
        let mut seen = HashSet::with_capacity(steps.len());
        let mut next_id = self.next_id;
        for step in &steps {
            if !seen.insert(step.id) {
                return Err(CleaningError::DuplicateStepId(step.id));
            }
            let after = step
                .id
                .0
                .checked_add(1)
                .ok_or(CleaningError::StepIdExhausted(step.id))?;
            next_id = next_id.max(after);
        }

        self.next_id = next_id;
        self.steps = steps;
        info!("Loaded recipe with {} steps", self.steps.len());
        Ok(())
    }

    pub fn load_recipe_json(&mut self, json: &str) -> Result<()> {
        let steps: Vec<PipelineStep> = serde_json::from_str(json)?;
        self.load_recipe(steps)
    }

    pub fn to_recipe(&self) -> Vec<PipelineStep> {
        self.steps.clone()
    }

    pub fn to_recipe_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.steps)?)
    }

    /// Fold every step over `original`.
    ///
    /// A step whose column does not exist at that point is skipped with a
    /// warning and the fold continues.
    pub fn run(&self, original: &Table) -> Table {
        run_pipeline(original, &self.steps)
    }

    /// Like [`run`](Self::run), but fails on the first step whose column
    /// does not exist.
    pub fn try_run(&self, original: &Table) -> Result<Table> {
        let mut table = original.clone();
        for step in &self.steps {
            table = apply_transformation(&table, step.kind, &step.column)
                .context(format!("Step {} ({} '{}')", step.id, step.kind, step.column))?;
        }
        Ok(table)
    }
}

/// Apply `steps` in order to a copy of `original`.
pub fn run_pipeline(original: &Table, steps: &[PipelineStep]) -> Table {
    steps.iter().fold(original.clone(), |table, step| {
        match apply_transformation(&table, step.kind, &step.column) {
            Ok(next) => next,
            Err(e) => {
                warn!("Skipping step {}: {}", step.id, e);
                table
            }
        }
    })
}
