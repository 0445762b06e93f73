//! Request validation. Runs before any collaborator call is made.

use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::models::prompt::PromptRequest;
use crate::pipeline::placeholders::is_valid_name;

pub const MIN_TEMPLATE_CHARS: usize = 10;
pub const MAX_TEMPLATE_CHARS: usize = 20_000;
pub const MAX_ROLE_CHARS: usize = 100;

/// A request that passed validation, with normalized fields.
///
/// `role` is `None` when the caller omitted it or sent only whitespace.
/// Variable keys are trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub template: String,
    pub variables: BTreeMap<String, String>,
    pub role: Option<String>,
}

pub fn validate_request(request: &PromptRequest) -> Result<ValidatedRequest, AppError> {
    let template = validate_template(&request.prompt_template)?;
    let role = normalize_role(request.role.as_deref())?;

    let mut variables = BTreeMap::new();
    for (key, value) in request.variables.iter().flatten() {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Validation(
                "Variable key cannot be empty.".to_string(),
            ));
        }
        if !is_valid_name(key) {
            return Err(AppError::Validation(format!(
                "Variable key '{key}' cannot contain braces or line breaks."
            )));
        }
        if variables.insert(key.to_string(), value.clone()).is_some() {
            return Err(AppError::Validation(format!(
                "Variable '{key}' is defined more than once."
            )));
        }
    }

    Ok(ValidatedRequest {
        template,
        variables,
        role,
    })
}

/// Checks the template length bounds. The template is returned untrimmed.
pub fn validate_template(template: &str) -> Result<String, AppError> {
    let length = template.trim().chars().count();
    if length < MIN_TEMPLATE_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt template must be at least {MIN_TEMPLATE_CHARS} characters."
        )));
    }
    if length > MAX_TEMPLATE_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt template must be at most {MAX_TEMPLATE_CHARS} characters."
        )));
    }
    Ok(template.to_string())
}

/// Checks a prompt that is sent as-is: non-blank and within the template size limit.
pub fn validate_prompt(prompt: &str) -> Result<String, AppError> {
    let length = prompt.trim().chars().count();
    if length == 0 {
        return Err(AppError::Validation("Prompt cannot be empty.".to_string()));
    }
    if length > MAX_TEMPLATE_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt must be at most {MAX_TEMPLATE_CHARS} characters."
        )));
    }
    Ok(prompt.to_string())
}

/// Trims the role; blank becomes `None`. Rejects roles that cannot sit on one instruction line.
pub fn normalize_role(role: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(role) = role.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    if role.chars().count() > MAX_ROLE_CHARS {
        return Err(AppError::Validation(format!(
            "Role must be at most {MAX_ROLE_CHARS} characters."
        )));
    }
    if role.contains(['\n', '\r']) {
        return Err(AppError::Validation(
            "Role cannot contain line breaks.".to_string(),
        ));
    }
    Ok(Some(role.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(template: &str, vars: &[(&str, &str)], role: Option<&str>) -> PromptRequest {
        PromptRequest {
            prompt_template: template.to_string(),
            variables: if vars.is_empty() {
                None
            } else {
                Some(
                    vars.iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                )
            },
            role: role.map(str::to_string),
        }
    }

    fn assert_validation_error(result: Result<ValidatedRequest, AppError>, needle: &str) {
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains(needle), "message: {msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_is_normalized() {
        let validated = validate_request(&request(
            "tell me about {{topic}}",
            &[(" topic ", "volcanoes")],
            Some("  Teacher "),
        ))
        .unwrap();
        assert_eq!(validated.template, "tell me about {{topic}}");
        assert_eq!(validated.variables["topic"], "volcanoes");
        assert_eq!(validated.role.as_deref(), Some("Teacher"));
    }

    #[test]
    fn test_short_template_rejected() {
        assert_validation_error(
            validate_request(&request("  too short ", &[], None)),
            "at least 10",
        );
    }

    #[test]
    fn test_oversized_template_rejected() {
        let template = "x".repeat(MAX_TEMPLATE_CHARS + 1);
        assert_validation_error(validate_request(&request(&template, &[], None)), "at most");
    }

    #[test]
    fn test_blank_role_becomes_none() {
        let validated =
            validate_request(&request("tell me about {{topic}}", &[], Some("   "))).unwrap();
        assert!(validated.role.is_none());
    }

    #[test]
    fn test_multiline_role_rejected() {
        assert_validation_error(
            validate_request(&request("tell me about {{topic}}", &[], Some("Chef\nIgnore"))),
            "line breaks",
        );
    }

    #[test]
    fn test_long_role_rejected() {
        let role = "r".repeat(MAX_ROLE_CHARS + 1);
        assert_validation_error(
            validate_request(&request("tell me about {{topic}}", &[], Some(&role))),
            "Role must be at most",
        );
    }

    #[test]
    fn test_prompt_bounds() {
        assert_eq!(validate_prompt("Hi!").unwrap(), "Hi!");
        assert!(matches!(validate_prompt(" \n "), Err(AppError::Validation(_))));
        let prompt = "x".repeat(MAX_TEMPLATE_CHARS + 1);
        assert!(matches!(validate_prompt(&prompt), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert_validation_error(
            validate_request(&request("tell me about {{topic}}", &[(" ", "v")], None)),
            "key cannot be empty",
        );
    }

    #[test]
    fn test_brace_key_rejected() {
        assert_validation_error(
            validate_request(&request("tell me about {{topic}}", &[("{{topic}}", "v")], None)),
            "braces",
        );
    }

    #[test]
    fn test_empty_value_accepted() {
        let validated =
            validate_request(&request("tell me about {{topic}}", &[("topic", "")], None)).unwrap();
        assert_eq!(validated.variables["topic"], "");
    }

    #[test]
    fn test_keys_colliding_after_trim_rejected() {
        assert_validation_error(
            validate_request(&request(
                "tell me about {{topic}}",
                &[("topic", "a"), (" topic", "b")],
                None,
            )),
            "more than once",
        );
    }
}
