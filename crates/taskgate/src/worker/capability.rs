/// What a worker role is advertised to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Research,
    Code,
    Data,
    Analysis,
}

pub const GENERAL_PURPOSE: &str = "General purpose worker";

impl Capability {
    /// Look up a role by name. A trailing `-agent` is ignored, so both
    /// `research` and `research-agent` map to [`Capability::Research`].
    pub fn for_role(role: &str) -> Option<Self> {
        let role = role.strip_suffix("-agent").unwrap_or(role);
        match role {
            "research" => Some(Self::Research),
            "code" => Some(Self::Code),
            "data" => Some(Self::Data),
            "analysis" => Some(Self::Analysis),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Research => "Performs research and information gathering tasks",
            Self::Code => "Handles code generation, analysis, and refactoring",
            Self::Data => "Processes data operations, transformations, and analytics",
            Self::Analysis => "Conducts analytical tasks and generates insights",
        }
    }

    pub fn render(&self, task: &str) -> String {
        match self {
            Self::Research => format!(
                "Research findings for '{task}': Gathered information from 5 sources, identified 3 key insights, compiled comprehensive report."
            ),
            Self::Code => format!(
                "Code analysis for '{task}': Generated 50 lines of code, applied best practices, added documentation and tests."
            ),
            Self::Data => format!(
                "Data processing for '{task}': Processed 1000 records, applied transformations, generated visualizations and summary statistics."
            ),
            Self::Analysis => format!(
                "Analysis results for '{task}': Identified patterns, performed statistical analysis, generated 5 actionable recommendations."
            ),
        }
    }
}

pub fn describe_role(role: &str) -> &'static str {
    Capability::for_role(role)
        .map(|capability| capability.description())
        .unwrap_or(GENERAL_PURPOSE)
}

/// Result text for `task` as produced by a worker playing `role`.
pub fn render_result(role: &str, task: &str) -> String {
    match Capability::for_role(role) {
        Some(capability) => capability.render(task),
        None => format!("Worker {role} processed: {task}"),
    }
}
