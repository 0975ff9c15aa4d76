// Shared prompt fragments.
// Each pipeline stage defines its own prompts in pipeline::prompts;
// this file holds the cross-cutting pieces they all append.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Honesty rule shared by the tailoring and cover-letter stages.
pub const AUTHENTICITY_INSTRUCTION: &str = "\
    CRITICAL: Never fabricate experience, employers, degrees, or achievements. \
    Every claim must be traceable to the candidate's original resume. \
    Skills the candidate does not yet have may only appear with an honest \
    qualifier such as \"(learning)\", \"(basic)\" or \"(familiar)\".";
