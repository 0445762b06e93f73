// All LLM prompt text for the customization pipeline.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Persona used by the optimizer when the caller did not pick a role.
pub const DEFAULT_ROLE: &str = "Helpful Assistant";

/// Optimizer instruction. `{role}` and `{raw_prompt}` are filled in a single pass.
pub const OPTIMIZER_PROMPT_TEMPLATE: &str = r#"You are an expert prompt engineer. Your task is to take a user's initial prompt idea and a specified AI role, and then refine the prompt idea into a well-structured body of text that an LLM (acting in the specified role) can effectively execute.

User's Initial Prompt Idea (this might be a simple instruction, a template with placeholders like {{variable}}, or a general concept):
"{raw_prompt}"

Specified AI Role for the target LLM: "{role}"

---
Your Goal:
Transform the 'User's Initial Prompt Idea' into a more effective prompt body. This refined prompt body will be given to an LLM that is ALREADY instructed to 'Act as a {role}'.
Therefore, DO NOT include "Act as a {role}" or similar role-setting instructions in your output.

Consider the following elements when refining the prompt idea:
1. Task Identification: Clearly identify the primary task the target LLM (acting as '{role}') needs to perform based on the 'User's Initial Prompt Idea'.
2. Implicit Requirements: Infer and make explicit any requirements for the target LLM's output. This could include desired format, length, style, tone, constraints, or information to include/exclude.
3. Actionable Instructions: Formulate clear instructions for the target LLM on how to approach the task. If the initial idea contains placeholders (e.g., {{variable_name}}), ensure they are preserved in your refined output.

---
Output Format:
Provide ONLY the refined prompt body. It should be ready to be directly processed by the target LLM.
Preserve every {{variable_name}} placeholder found in the 'User's Initial Prompt Idea' exactly as written. Do not rename, translate, or drop any of them.

Example:
If User's Initial Prompt Idea is: "tell me about {{topic}}" and AI Role is "Teacher",
Your output might be:
Please explain the key concepts of {{topic}} in a way that is easy for a high school student to understand. Include a real-world example and a brief summary of its importance.
(Notice: No "Act as a Teacher" here, and {{topic}} is preserved.)

---
Now, generate the refined prompt body based on the provided 'User's Initial Prompt Idea' and 'Specified AI Role'."#;

/// Builds the optimizer prompt for a raw template and an optional role.
pub fn build_optimizer_prompt(raw_template: &str, role: Option<&str>) -> String {
    let role = role.filter(|r| !r.trim().is_empty()).unwrap_or(DEFAULT_ROLE);
    marker_pattern()
        .replace_all(OPTIMIZER_PROMPT_TEMPLATE, |caps: &Captures| match &caps[1] {
            "role" => role,
            _ => raw_template,
        })
        .into_owned()
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{(role|raw_prompt)\}").expect("optimizer marker pattern is valid")
    })
}

/// Role-setting header prepended to the final execution prompt.
pub fn role_header(role: &str) -> String {
    format!("Act as a {role}.\n\n")
}
