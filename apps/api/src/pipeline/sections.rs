//! Section segmentation: splits raw resume text into titled sections using a
//! configurable whitelist of header keywords. No LLM calls.

use crate::pipeline::schema::ResumeSection;

const DEFAULT_HEADERS: &[&str] = &[
    "EXPERIENCE",
    "EDUCATION",
    "SKILLS",
    "PROJECTS",
    "SUMMARY",
    "INTERNSHIPS",
    "EXTRACURRICULAR",
    "CERTIFICATIONS",
];

/// Recognized section headers. Matching is case-insensitive against a whole,
/// trimmed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeaders(Vec<String>);

impl Default for SectionHeaders {
    fn default() -> Self {
        Self(DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect())
    }
}

impl SectionHeaders {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(headers.into_iter().map(Into::into).collect())
    }

    /// Parses a comma-separated list. Returns `None` when no header survives trimming.
    pub fn parse_list(raw: &str) -> Option<Self> {
        let headers: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .collect();
        (!headers.is_empty()).then(|| Self::new(headers))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unicode-aware: `ÜBER MICH` matches `über mich`.
    pub fn is_header(&self, line: &str) -> bool {
        let line = line.trim().to_lowercase();
        self.0.iter().any(|h| h.to_lowercase() == line)
    }
}

/// Segments resume text into sections.
///
/// - Blank lines are skipped; other lines are trimmed.
/// - Text before the first recognized header is discarded.
/// - A header with no content lines before the next header produces no section.
/// - The section title is the header line as written.
pub fn extract_sections(text: &str, headers: &SectionHeaders) -> Vec<ResumeSection> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if headers.is_header(line) {
            if let Some(section) = current.take().and_then(close_section) {
                sections.push(section);
            }
            current = Some((line.to_string(), Vec::new()));
        } else if let Some((_, content)) = current.as_mut() {
            content.push(line);
        }
    }

    if let Some(section) = current.and_then(close_section) {
        sections.push(section);
    }

    sections
}

fn close_section((title, content): (String, Vec<&str>)) -> Option<ResumeSection> {
    (!content.is_empty()).then(|| ResumeSection {
        title,
        content: content.join("\n"),
    })
}
