//! The résumé pipeline: JD analysis → resume tailoring → cover letter, run as
//! a background task whose progress is streamed to the client.

pub mod context;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod schema;
pub mod sections;
pub mod skills;
pub mod stages;
pub mod stream;
