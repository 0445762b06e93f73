use serde::Serialize;

/// Roles offered by the client role picker. Free-text roles are also accepted.
pub const KNOWN_ROLES: &[&str] = &[
    "Prompt Engineer",
    "Story Teller",
    "Code Assistant",
    "Marketing Copywriter",
    "Content Summarizer",
    "Helpful Assistant",
    "Technical Writer",
    "Travel Agent",
    "Chef",
];

#[derive(Debug, Clone, Serialize)]
pub struct RoleOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn role_options() -> Vec<RoleOption> {
    KNOWN_ROLES
        .iter()
        .map(|&role| RoleOption {
            value: role,
            label: role,
        })
        .collect()
}

/// Case-insensitive match against the built-in role list.
pub fn is_known_role(role: &str) -> bool {
    let role = role.trim();
    KNOWN_ROLES.iter().any(|known| known.eq_ignore_ascii_case(role))
}
