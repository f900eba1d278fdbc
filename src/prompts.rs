use serde::{Deserialize, Serialize};

/// The four planning phases of the methodology. Each selects its own prompt
/// template; unrecognized keys fall back to Clarify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Clarify,
    Organize,
    Refine,
    Equip,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Clarify, Phase::Organize, Phase::Refine, Phase::Equip];

    /// Parse a phase key, defaulting to Clarify for anything unrecognized.
    /// Mirrors the template table's lookup-with-default behavior.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "organize" => Phase::Organize,
            "refine" => Phase::Refine,
            "equip" => Phase::Equip,
            _ => Phase::Clarify,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Clarify => "clarify",
            Phase::Organize => "organize",
            Phase::Refine => "refine",
            Phase::Equip => "equip",
        }
    }

    /// Human-readable title, used in report headings.
    pub fn title(&self) -> &'static str {
        match self {
            Phase::Clarify => "Clarify",
            Phase::Organize => "Organize",
            Phase::Refine => "Refine",
            Phase::Equip => "Equip",
        }
    }

    /// Question-id prefix letter for this phase (ids look like "C-01").
    pub fn id_prefix(&self) -> char {
        match self {
            Phase::Clarify => 'C',
            Phase::Organize => 'O',
            Phase::Refine => 'R',
            Phase::Equip => 'E',
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System + user instruction pair sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

struct PhaseTemplate {
    system: &'static str,
    guidance: &'static str,
}

static CLARIFY: PhaseTemplate = PhaseTemplate {
    system: "You are an expert project planning consultant helping users clarify their \
             project vision. Ask probing questions to help them think deeper about their \
             project's purpose, users, and scope. Be encouraging but challenge vague statements.",
    guidance: "Help me think deeper about this question. Ask follow-up questions to help me \
               be more specific and comprehensive in my answer.",
};

static ORGANIZE: PhaseTemplate = PhaseTemplate {
    system: "You are an expert product manager helping users organize their project \
             requirements. Focus on prioritization, feature definition, and user needs. \
             Help them distinguish between must-haves and nice-to-haves.",
    guidance: "Help me organize and prioritize my thoughts on this question. Challenge me \
               to be more specific about priorities and trade-offs.",
};

static REFINE: PhaseTemplate = PhaseTemplate {
    system: "You are an expert risk analyst and project consultant helping users identify \
             and plan for potential challenges. Focus on realistic assessment of risks, \
             constraints, and validation strategies.",
    guidance: "Help me think critically about potential risks and challenges. Ask probing \
               questions about what could go wrong and how to validate assumptions.",
};

static EQUIP: PhaseTemplate = PhaseTemplate {
    system: "You are an expert technical architect helping users create implementation \
             plans. Focus on practical next steps, technical decisions, and actionable \
             recommendations.",
    guidance: "Help me create a practical implementation plan based on my project analysis. \
               Focus on specific, actionable next steps.",
};

fn template_for(phase: Phase) -> &'static PhaseTemplate {
    match phase {
        Phase::Clarify => &CLARIFY,
        Phase::Organize => &ORGANIZE,
        Phase::Refine => &REFINE,
        Phase::Equip => &EQUIP,
    }
}

/// Render the prompt pair for a phase and question. An empty current answer is
/// rendered as the literal "Not answered yet" so the model knows the user is
/// starting from scratch.
pub fn phase_prompt(phase: Phase, question_text: &str, current_answer: &str) -> PromptPair {
    let template = template_for(phase);
    let answer = if current_answer.trim().is_empty() {
        "Not answered yet"
    } else {
        current_answer
    };

    let user = format!(
        "Question: {question_text}\n\n\
         Current answer: {answer}\n\n\
         {}\n\n\
         Please provide specific follow-up questions or suggestions to help me improve \
         my answer. Keep your response concise and actionable.",
        template.guidance
    );

    PromptPair {
        system: template.system.to_string(),
        user: user.trim().to_string(),
    }
}
