//! Client-side validation of sequence and organism input
//!
//! Mirrors what the form enforces before a job is submitted. Validation
//! failures are collected into a list and displayed inline; they are never
//! fatal and never logged remotely.

use crate::submit::types::FormSnapshot;

/// IUPAC nucleotide codes accepted in a sequence (canonical bases plus
/// ambiguity codes).
const IUPAC_BASES: &[char] = &[
    'A', 'T', 'G', 'C', 'N', 'R', 'Y', 'S', 'W', 'K', 'M', 'B', 'D', 'H', 'V',
];

/// Trivial format sniff for pasted or uploaded sequence text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fasta,
    GenBank,
    Plain,
}

pub fn detect_format(text: &str) -> SequenceFormat {
    let trimmed = text.trim_start();
    if trimmed.starts_with('>') {
        SequenceFormat::Fasta
    } else if text.contains("LOCUS") && text.contains("ORIGIN") {
        SequenceFormat::GenBank
    } else {
        SequenceFormat::Plain
    }
}

/// Accepts plain sequences or FASTA (header line skipped). Whitespace is
/// stripped and case is ignored; every remaining character must be an IUPAC
/// code and at least one base must remain.
pub fn validate_sequence(sequence: &str) -> Result<(), String> {
    if sequence.trim().is_empty() {
        return Err("DNA sequence is required".to_string());
    }

    let lines: Vec<&str> = sequence.trim().lines().collect();
    let body: String = if lines.first().is_some_and(|line| line.starts_with('>')) {
        lines[1..].concat()
    } else {
        lines.concat()
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if cleaned.chars().any(|c| !IUPAC_BASES.contains(&c)) {
        return Err(
            "Sequence contains invalid characters. Only DNA bases (A, T, G, C) and IUPAC codes are allowed"
                .to_string(),
        );
    }

    if cleaned.is_empty() {
        return Err("Sequence cannot be empty".to_string());
    }

    Ok(())
}

/// Genome references must point at GenBank files.
pub fn validate_genome_path(genome_path: &str) -> Result<(), String> {
    let trimmed = genome_path.trim();
    if trimmed.is_empty() {
        return Err("GenBank genome file path is required".to_string());
    }

    let lower = trimmed.to_lowercase();
    if !lower.ends_with(".gb") && !lower.ends_with(".gbf") {
        return Err(
            "Genome file must be in GenBank format (.gb or .gbf extension)".to_string(),
        );
    }

    Ok(())
}

/// Priority bounds are inclusive on both ends.
pub fn validate_organism(genome_path: &str, priority: u32) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(err) = validate_genome_path(genome_path) {
        errors.push(err);
    }

    if !(1..=100).contains(&priority) {
        errors.push("Priority must be between 1 and 100".to_string());
    }

    errors
}

/// Validate a whole submission; an empty result means the form may be sent.
/// `has_sequence_file` marks an uploaded file standing in for pasted text.
pub fn validate_submission(snapshot: &FormSnapshot, has_sequence_file: bool) -> Vec<String> {
    let mut errors = Vec::new();

    if snapshot.dna_sequence.trim().is_empty() && !has_sequence_file {
        errors.push("DNA sequence is required (either manual entry or file upload)".to_string());
    }

    if !snapshot.dna_sequence.trim().is_empty() {
        if let Err(err) = validate_sequence(&snapshot.dna_sequence) {
            errors.push(format!("DNA sequence: {err}"));
        }
    }

    if snapshot.wanted_organisms.is_empty() && snapshot.unwanted_organisms.is_empty() {
        errors.push("At least one wanted or unwanted organism must be specified".to_string());
    }

    for (index, organism) in snapshot
        .wanted_organisms
        .iter()
        .chain(snapshot.unwanted_organisms.iter())
        .enumerate()
    {
        for err in validate_organism(&organism.genome_path, organism.priority) {
            errors.push(format!("Organism {}: {err}", index + 1));
        }
    }

    errors
}
