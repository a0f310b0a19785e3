// prompts.rs - Prompt assembly from agent/task templates
//! Renders role and task prompts by substituting `{name}` placeholders.

use crate::config::{AgentProfile, TaskProfile};
use std::collections::HashMap;

/// Substitute `{name}` placeholders with values from `vars`.
///
/// Single pass over the template: substituted values are never rescanned, so
/// values containing brace characters cannot trigger further substitution.
/// Unknown placeholders are left in place.
pub fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];

        let close = after.find('}');
        let next_open = after[1..].find('{').map(|i| i + 1);

        match close {
            // A placeholder only counts when its '}' comes before any nested '{'
            Some(c) if next_open.map_or(true, |n| c < n) => {
                let key = &after[1..c];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&after[..=c]),
                }
                rest = &after[c + 1..];
            }
            _ => {
                out.push('{');
                rest = &after[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Build the persona half of an agent's system prompt.
pub fn build_agent_prompt(agent: &AgentProfile, vars: &HashMap<&str, String>) -> String {
    let prompt = format!(
        "Role: {}\nGoal: {}\nBackstory: {}\n",
        agent.role, agent.goal, agent.backstory
    );
    render_template(&prompt, vars)
}

/// Build the task half of an agent's system prompt.
pub fn build_task_prompt(task: &TaskProfile, vars: &HashMap<&str, String>) -> String {
    let prompt = format!(
        "Task: {}\nExpected Output: {}\n",
        task.description, task.expected_output
    );
    render_template(&prompt, vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_substitutes_known_placeholders() {
        let rendered = render_template(
            "Research {topic} with tones: {tones}",
            &vars(&[("topic", "History of Rome"), ("tones", "educational")]),
        );
        assert_eq!(rendered, "Research History of Rome with tones: educational");
    }

    #[test]
    fn test_unknown_placeholders_left_verbatim() {
        let rendered = render_template("{topic} and {missing}", &vars(&[("topic", "Rome")]));
        assert_eq!(rendered, "Rome and {missing}");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let v = vars(&[("topic", "Rome"), ("tones", "casual")]);
        let first = render_template("T: {topic}, S: {tones}, X: {other}", &v);
        let second = render_template("T: {topic}, S: {tones}, X: {other}", &v);
        assert_eq!(first, second);
    }

    #[test]
    fn test_value_containing_braces_is_not_rescanned() {
        let rendered = render_template(
            "Research {topic}",
            &vars(&[("topic", "JSON like {tones} or {}")]),
        );
        assert_eq!(rendered, "Research JSON like {tones} or {}");
    }

    #[test]
    fn test_unbalanced_braces_survive() {
        let v = vars(&[("topic", "Rome")]);
        assert_eq!(render_template("open { only {topic}", &v), "open { only Rome");
        assert_eq!(render_template("{topic} close } only", &v), "Rome close } only");
        assert_eq!(render_template("dangling {", &v), "dangling {");
    }

    #[test]
    fn test_agent_prompt_includes_persona_fields() {
        let agent = AgentProfile {
            role: "Researcher for {topic}".to_string(),
            goal: "Find facts".to_string(),
            backstory: "Years of digging".to_string(),
        };
        let prompt = build_agent_prompt(&agent, &vars(&[("topic", "Rome")]));
        assert!(prompt.contains("Role: Researcher for Rome"));
        assert!(prompt.contains("Goal: Find facts"));
        assert!(prompt.contains("Backstory: Years of digging"));
    }
}
