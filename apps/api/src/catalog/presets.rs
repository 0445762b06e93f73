use std::collections::BTreeMap;

use serde::Serialize;

/// A ready-made template with sample variable values.
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub slug: &'static str,
    pub name: &'static str,
    pub template: &'static str,
    pub variables: BTreeMap<&'static str, &'static str>,
}

struct PresetDef {
    slug: &'static str,
    name: &'static str,
    template: &'static str,
    variables: &'static [(&'static str, &'static str)],
}

const PRESETS: &[PresetDef] = &[
    PresetDef {
        slug: "creative-writing",
        name: "Creative Writing",
        template: "Write a short story about {{protagonist}} who discovers a {{magical_object}} in {{setting}}.",
        variables: &[
            ("protagonist", "a curious explorer"),
            ("magical_object", "glowing orb"),
            ("setting", "an ancient forest"),
        ],
    },
    PresetDef {
        slug: "code-generation-python",
        name: "Code Generation (Python)",
        template: "Generate a Python function that {{description}}.\n\n```python\n# Your code here\n```",
        variables: &[("description", "calculates the factorial of a number")],
    },
    PresetDef {
        slug: "summarization",
        name: "Summarization",
        template: "Summarize the following text concisely:\n\n{{text_to_summarize}}",
        variables: &[("text_to_summarize", "Enter long text here...")],
    },
    PresetDef {
        slug: "email-composer",
        name: "Email Composer",
        template: "Draft a {{email_type}} email to {{recipient}} regarding {{subject}}. The tone should be {{tone}}.",
        variables: &[
            ("email_type", "follow-up"),
            ("recipient", "a potential client"),
            ("subject", "our last meeting"),
            ("tone", "professional and courteous"),
        ],
    },
    PresetDef {
        slug: "recipe-generator",
        name: "Recipe Generator",
        template: "Create a recipe for {{dish_name}} that includes {{main_ingredient}} and is suitable for a {{dietary_restriction}} diet. The cooking time should be around {{cooking_time}}.",
        variables: &[
            ("dish_name", "a quick weekday dinner"),
            ("main_ingredient", "chicken breast"),
            ("dietary_restriction", "gluten-free"),
            ("cooking_time", "30 minutes"),
        ],
    },
    PresetDef {
        slug: "travel-itinerary",
        name: "Travel Itinerary",
        template: "Plan a {{duration_days}}-day travel itinerary for a trip to {{destination}}, focusing on {{interest_points}} and suitable for {{traveler_type}}.",
        variables: &[
            ("duration_days", "7"),
            ("destination", "Kyoto, Japan"),
            ("interest_points", "historical temples and local cuisine"),
            ("traveler_type", "a solo traveler"),
        ],
    },
    PresetDef {
        slug: "marketing-slogan",
        name: "Marketing Slogan",
        template: "Generate a catchy marketing slogan for a {{product_name}} that targets {{target_audience}} and highlights its {{key_benefit}}.",
        variables: &[
            ("product_name", "new eco-friendly water bottle"),
            ("target_audience", "environmentally conscious millennials"),
            ("key_benefit", "sustainability and style"),
        ],
    },
];

/// Default preset loaded by clients on first render.
pub const DEFAULT_PRESET_SLUG: &str = "code-generation-python";

fn to_preset(def: &PresetDef) -> Preset {
    Preset {
        slug: def.slug,
        name: def.name,
        template: def.template,
        variables: def.variables.iter().copied().collect(),
    }
}

pub fn all_presets() -> Vec<Preset> {
    PRESETS.iter().map(to_preset).collect()
}

pub fn find_preset(slug: &str) -> Option<Preset> {
    PRESETS
        .iter()
        .find(|def| def.slug.eq_ignore_ascii_case(slug.trim()))
        .map(to_preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::placeholders::placeholder_names;
    use crate::pipeline::validation::MIN_TEMPLATE_CHARS;

    #[test]
    fn test_preset_variables_cover_template_placeholders() {
        for preset in all_presets() {
            let names = placeholder_names(preset.template);
            let keys: Vec<String> = preset.variables.keys().map(|k| k.to_string()).collect();
            assert_eq!(
                names.into_iter().collect::<Vec<_>>(),
                keys,
                "preset {} has mismatched variables",
                preset.slug
            );
        }
    }

    #[test]
    fn test_preset_templates_pass_length_check() {
        for preset in all_presets() {
            assert!(preset.template.chars().count() >= MIN_TEMPLATE_CHARS);
        }
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<_> = all_presets().into_iter().map(|p| p.slug).collect();
        let total = slugs.len();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), total);
    }

    #[test]
    fn test_find_preset() {
        assert_eq!(find_preset(DEFAULT_PRESET_SLUG).unwrap().name, "Code Generation (Python)");
        let email = find_preset("Email-Composer").unwrap();
        assert_eq!(email.variables["tone"], "professional and courteous");
        assert!(find_preset("does-not-exist").is_none());
    }
}
