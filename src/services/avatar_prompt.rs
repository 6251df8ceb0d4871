//! Assembles the avatar prompt from its template sections.

use serde_json::{Map, Value};

use crate::domain::ports::PromptBundle;

/// Join the five sections in order, filling `{key}` placeholders in the
/// context and daily-state sections from `user_state`.
///
/// A section whose placeholders cannot all be resolved is used verbatim.
pub fn build_avatar_prompt(bundle: &PromptBundle, user_state: &Map<String, Value>) -> String {
    let context = fill_placeholders(&bundle.context, user_state)
        .unwrap_or_else(|| bundle.context.clone());
    let daily_state = fill_placeholders(&bundle.daily_state, user_state)
        .unwrap_or_else(|| bundle.daily_state.clone());

    [
        bundle.identity.trim(),
        context.trim(),
        daily_state.trim(),
        bundle.style_rules.trim(),
        bundle.purpose.trim(),
    ]
    .join("\n")
    .trim()
    .to_string()
}

/// Substitute `{name}` with values from `vars`. `{{` and `}}` are literal
/// braces. Returns `None` on an unknown name or an unbalanced brace.
pub fn fill_placeholders(template: &str, vars: &Map<String, Value>) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        '{' => return None,
                        other => name.push(other),
                    }
                }
                match vars.get(&name)? {
                    Value::String(s) => out.push_str(s),
                    other => out.push_str(&other.to_string()),
                }
            }
            '}' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn bundle() -> PromptBundle {
        PromptBundle {
            identity: "  You are Reflecto.\n".to_string(),
            context: "User {name} on {date}.".to_string(),
            daily_state: "Energy {energy}/10 {{raw}}".to_string(),
            style_rules: "Be gentle.".to_string(),
            purpose: "\nHelp them notice.  ".to_string(),
        }
    }

    #[test]
    fn test_sections_joined_in_order() {
        let prompt = build_avatar_prompt(
            &bundle(),
            &vars(json!({"name": "Ada", "date": "2026-02-08", "energy": 6})),
        );
        assert_eq!(
            prompt,
            "You are Reflecto.\nUser Ada on 2026-02-08.\nEnergy 6/10 {raw}\nBe gentle.\nHelp them notice."
        );
    }

    #[test]
    fn test_unresolved_section_kept_raw() {
        let prompt = build_avatar_prompt(&bundle(), &vars(json!({"energy": 3})));
        assert!(prompt.contains("User {name} on {date}."));
        assert!(prompt.contains("Energy 3/10 {raw}"));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(fill_placeholders("oops {name", &Map::new()), None);
        assert_eq!(fill_placeholders("oops }", &Map::new()), None);
        assert_eq!(fill_placeholders("plain", &Map::new()).as_deref(), Some("plain"));
    }

    #[test]
    fn test_empty_bundle() {
        assert_eq!(build_avatar_prompt(&PromptBundle::default(), &Map::new()), "");
    }
}
