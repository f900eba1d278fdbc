use crate::error::GuidanceError;
use crate::prompts::Phase;
use crate::session::SessionData;

/// Renders a completed (or partial) planning session into its three output
/// documents. Pure string rendering; writing the result anywhere is the
/// caller's responsibility.
pub struct OutputGenerator<'a> {
    session: &'a SessionData,
}

impl<'a> OutputGenerator<'a> {
    pub fn new(session: &'a SessionData) -> Self {
        Self { session }
    }

    /// Structured text report: H1 title, session metadata, one H2 section per
    /// phase in methodology order with bold question-id labels.
    pub fn generate_markdown(&self) -> String {
        let meta = &self.session.session;
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", meta.name));
        if let Some(description) = &meta.description {
            out.push_str(&format!("{description}\n\n"));
        }
        out.push_str(&format!(
            "*Generated {} — {} answers recorded*\n\n",
            meta.updated_at.format("%Y-%m-%d %H:%M UTC"),
            self.session.answers.len()
        ));

        for phase in Phase::ALL {
            out.push_str(&format!("## {} Phase\n\n", phase.title()));
            let answers = self.session.answers_for_phase(phase);
            if answers.is_empty() {
                out.push_str("*No answers recorded for this phase.*\n\n");
                continue;
            }
            for answer in answers {
                out.push_str(&format!("**{}**: {}\n\n", answer.question_id, answer.response));
            }
        }

        out
    }

    /// Machine-readable export of the whole session.
    pub fn generate_json(&self) -> Result<String, GuidanceError> {
        serde_json::to_string_pretty(self.session)
            .map_err(|e| GuidanceError::InvalidResponse(e.to_string()))
    }

    /// Hand-off document for an AI coding assistant: role preamble, the
    /// project analysis grouped by phase, and the requested deliverables.
    pub fn generate_ai_prompt(&self) -> String {
        let mut out = String::new();

        out.push_str(
            "You are an expert project manager and technical architect. Based on the \
             following project analysis, create a detailed implementation plan.\n\n",
        );
        out.push_str(&format!("PROJECT: {}\n\n", self.session.session.name));
        out.push_str("ANALYSIS:\n\n");

        for phase in Phase::ALL {
            let answers = self.session.answers_for_phase(phase);
            if answers.is_empty() {
                continue;
            }
            out.push_str(&format!("{}:\n", phase.title()));
            for answer in answers {
                out.push_str(&format!("- {}: {}\n", answer.question_id, answer.response));
            }
            out.push('\n');
        }

        out.push_str(
            "Please provide:\n\
             1. A technical architecture recommendation\n\
             2. An implementation roadmap with milestones\n\
             3. Risk mitigation strategies\n\
             4. Technology stack recommendations\n\
             5. Resource allocation suggestions\n\
             6. Success metrics and validation checkpoints\n",
        );

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Answer, SessionMetadata, SessionStatus};
    use chrono::Utc;

    fn sample_session() -> SessionData {
        let answer = |id: &str, text: &str| Answer {
            question_id: id.to_string(),
            response: text.to_string(),
            answered_at: Utc::now(),
            confidence: Some(4),
            notes: None,
        };
        SessionData {
            session: SessionMetadata {
                id: "s1".to_string(),
                name: "Inventory Tracker".to_string(),
                description: Some("Warehouse stock tracking".to_string()),
                status: SessionStatus::Completed,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            answers: vec![
                answer("C-01", "Track stock levels in real time"),
                answer("O-01", "Barcode scanning is a must-have"),
                answer("R-01", "Offline warehouses are the main risk"),
                answer("E-01", "Start with a single-warehouse pilot"),
            ],
            conversations: vec![],
        }
    }

    #[test]
    fn markdown_has_title_and_four_phase_sections() {
        let session = sample_session();
        let md = OutputGenerator::new(&session).generate_markdown();

        assert!(md.starts_with("# Inventory Tracker"));
        assert!(md.contains("## Clarify Phase"));
        assert!(md.contains("## Organize Phase"));
        assert!(md.contains("## Refine Phase"));
        assert!(md.contains("## Equip Phase"));
        assert!(md.contains("**C-01**: Track stock levels in real time"));
    }

    #[test]
    fn markdown_marks_empty_phases() {
        let mut session = sample_session();
        session.answers.retain(|a| a.question_id.starts_with('C'));
        let md = OutputGenerator::new(&session).generate_markdown();
        assert!(md.contains("*No answers recorded for this phase.*"));
    }

    #[test]
    fn json_export_parses_back() {
        let session = sample_session();
        let json = OutputGenerator::new(&session).generate_json().unwrap();
        let parsed: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.answers.len(), 4);
        assert_eq!(parsed.session.name, "Inventory Tracker");
    }

    #[test]
    fn ai_prompt_has_role_project_analysis_and_deliverables() {
        let session = sample_session();
        let prompt = OutputGenerator::new(&session).generate_ai_prompt();

        assert!(prompt.starts_with("You are an expert project manager"));
        assert!(prompt.contains("PROJECT: Inventory Tracker"));
        assert!(prompt.contains("ANALYSIS:"));
        assert!(prompt.contains("Please provide:"));
        assert!(prompt.contains("technical architecture"));
        assert!(prompt.contains("Risk mitigation"));
    }
}
