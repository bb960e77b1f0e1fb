//! Payload and form-state types for the codon-optimization backend
//!
//! The wire shapes mirror the backend's `/run-modules` contract: a
//! `user_input_dict` with the sequence input, an organism map keyed by
//! display name, a tuning parameter normalized into [0,1], method and index
//! identifiers, and an output path. The response nests everything of
//! interest under `result.final_evaluation`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw sequence text or a reference to an uploaded file, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceInput {
    pub content: Option<String>,
    pub file_name: Option<String>,
}

impl SequenceInput {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            file_name: None,
        }
    }

    pub fn from_file(file_name: impl Into<String>) -> Self {
        Self {
            content: None,
            file_name: Some(file_name.into()),
        }
    }
}

/// Per-organism optimization settings as the backend expects them.
/// `optimized` distinguishes wanted (true) from unwanted (false) hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismSpec {
    pub genome_path: String,
    pub optimized: bool,
    pub expression_csv: Option<String>,
    pub priority: u32,
}

/// Complete job sent to `/run-modules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationJob {
    pub sequence: SequenceInput,
    /// Optimization/deoptimization tradeoff, normalized into [0,1].
    pub tuning_param: f64,
    pub organisms: HashMap<String, OrganismSpec>,
    pub optimization_method: String,
    pub optimization_cub_index: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunModulesRequest<'a> {
    pub user_input_dict: &'a OptimizationJob,
    pub should_run_output_module: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunModulesResponse {
    pub result: OptimizationResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizationResult {
    pub final_evaluation: FinalEvaluation,
    pub processing_time: Option<f64>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinalEvaluation {
    pub final_sequence: String,
    pub average_distance_score: f64,
    pub ratio_score: f64,
    pub weakest_link_score: f64,
}

/// One organism row as edited in the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismEntry {
    pub name: String,
    pub genome_path: String,
    pub priority: u32,
    pub expression_data_path: Option<String>,
}

/// Flat snapshot of the form, persisted verbatim between launches.
/// The tuning parameter is kept on the UI's 0..=100 scale and only
/// normalized when a job is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub dna_sequence: String,
    pub wanted_organisms: Vec<OrganismEntry>,
    pub unwanted_organisms: Vec<OrganismEntry>,
    pub tuning_parameter: u32,
    pub optimization_method: String,
    pub cub_index: String,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        Self {
            dna_sequence: String::new(),
            wanted_organisms: Vec::new(),
            unwanted_organisms: Vec::new(),
            tuning_parameter: 50,
            optimization_method: "single_codon_diff".to_string(),
            cub_index: "CAI".to_string(),
        }
    }
}

impl FormSnapshot {
    /// Build the backend job from the current form state.
    pub fn to_job(&self, output_path: impl Into<String>) -> OptimizationJob {
        let mut organisms = HashMap::new();
        for entry in &self.wanted_organisms {
            organisms.insert(entry.name.clone(), entry.to_spec(true));
        }
        for entry in &self.unwanted_organisms {
            organisms.insert(entry.name.clone(), entry.to_spec(false));
        }

        OptimizationJob {
            sequence: SequenceInput::from_text(self.dna_sequence.clone()),
            tuning_param: f64::from(self.tuning_parameter) / 100.0,
            organisms,
            optimization_method: self.optimization_method.clone(),
            optimization_cub_index: self.cub_index.clone(),
            output_path: output_path.into(),
        }
    }
}

impl OrganismEntry {
    fn to_spec(&self, optimized: bool) -> OrganismSpec {
        OrganismSpec {
            genome_path: self.genome_path.clone(),
            optimized,
            expression_csv: self.expression_data_path.clone(),
            priority: self.priority,
        }
    }
}
