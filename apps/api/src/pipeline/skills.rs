//! Skill coverage: which required skills already appear in the resume text.
//!
//! Deterministic, case-insensitive substring presence. Feeds the tailoring
//! prompt as analytical scaffolding; the model's own match_score is separate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCoverage {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// matched / required × 100; 0 when nothing is required.
    pub match_percentage: f64,
}

pub fn analyze_skills(resume_text: &str, required_skills: &[String]) -> SkillCoverage {
    let resume_lower = resume_text.to_lowercase();

    let (matched_skills, missing_skills): (Vec<String>, Vec<String>) = required_skills
        .iter()
        .cloned()
        .partition(|skill| resume_lower.contains(&skill.to_lowercase()));

    let match_percentage = if required_skills.is_empty() {
        0.0
    } else {
        matched_skills.len() as f64 / required_skills.len() as f64 * 100.0
    };

    SkillCoverage {
        matched_skills,
        missing_skills,
        match_percentage,
    }
}
