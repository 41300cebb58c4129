//! Extracts a structured [`Plan`] from free-form model text.
//!
//! Models wrap their JSON in Markdown fences, add preambles, or trail off
//! with commentary. The parser tolerates all of that: it locates the
//! first balanced `{...}` block anywhere in the text and interprets that
//! block as the plan, ignoring everything else.

use serde_json::Value;

use crate::error::PlanParseError;
use crate::model::{Plan, PlanTask, Priority};

/// Parse a [`Plan`] out of raw model text.
///
/// Fails only if no balanced brace block can be found, or the block
/// found does not parse as a JSON object. Individual malformed fields
/// within an otherwise-valid object are recovered with defaults rather
/// than failing the whole parse (see module-level field rules below).
pub fn parse_plan(text: &str) -> Result<Plan, PlanParseError> {
    let block = extract_first_brace_block(text).ok_or(PlanParseError::NoBraceBlock)?;
    let value: Value = serde_json::from_str(block)
        .map_err(|e| PlanParseError::MalformedObject(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| PlanParseError::MalformedObject("top-level value is not an object".into()))?;

    let goals = string_array(object.get("goals"));
    let constraints = string_array(object.get("constraints"));
    let tasks = object
        .get("tasks")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(parse_task).collect())
        .unwrap_or_default();

    Ok(Plan::new(goals, tasks, constraints))
}

fn parse_task(value: &Value) -> PlanTask {
    let description = value
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown task".to_string());

    let priority = value
        .get("priority")
        .and_then(Value::as_str)
        .and_then(parse_priority)
        .unwrap_or(Priority::Medium);

    let dependencies = value
        .get("dependencies")
        .map(string_array)
        .unwrap_or_default();

    PlanTask::new(description, priority, dependencies)
}

fn parse_priority(raw: &str) -> Option<Priority> {
    match raw.to_lowercase().as_str() {
        "high" => Some(Priority::High),
        "medium" => Some(Priority::Medium),
        "low" => Some(Priority::Low),
        _ => None,
    }
}

/// Filter a JSON array to its string entries, dropping anything else.
fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Locate the first balanced `{...}` block in `text`, tracking string
/// literals so that braces inside quoted strings don't unbalance the
/// scan. Returns the slice including both braces.
pub(crate) fn extract_first_brace_block(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        let ch = byte as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let text = r#"{"goals":["Ship X"],"tasks":[{"description":"do X","priority":"high"}],"constraints":["budget"]}"#;
        let plan = parse_plan(text).unwrap();
        assert_eq!(plan.goals, vec!["Ship X".to_string()]);
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].description, "do X");
        assert_eq!(plan.tasks[0].priority, Priority::High);
        assert_eq!(plan.constraints, vec!["budget".to_string()]);
    }

    #[test]
    fn tolerates_markdown_fences_and_preamble() {
        let text = "Sure, here is the plan:\n```json\n{\"goals\":[\"A\"],\"tasks\":[],\"constraints\":[]}\n```\nLet me know if you'd like changes.";
        let plan = parse_plan(text).unwrap();
        assert_eq!(plan.goals, vec!["A".to_string()]);
    }

    #[test]
    fn nested_braces_in_strings_dont_unbalance() {
        let text = r#"{"goals":["handle {curly} in text"],"tasks":[],"constraints":[]}"#;
        let plan = parse_plan(text).unwrap();
        assert_eq!(plan.goals, vec!["handle {curly} in text".to_string()]);
    }

    #[test]
    fn missing_task_description_defaults() {
        let text = r#"{"goals":[],"tasks":[{"priority":"low"}],"constraints":[]}"#;
        let plan = parse_plan(text).unwrap();
        assert_eq!(plan.tasks[0].description, "Unknown task");
        assert_eq!(plan.tasks[0].priority, Priority::Low);
    }

    #[test]
    fn invalid_priority_defaults_to_medium() {
        let text = r#"{"goals":[],"tasks":[{"description":"x","priority":"urgent"}],"constraints":[]}"#;
        let plan = parse_plan(text).unwrap();
        assert_eq!(plan.tasks[0].priority, Priority::Medium);
    }

    #[test]
    fn non_string_goal_entries_are_dropped() {
        let text = r#"{"goals":["A",42,null,"B"],"tasks":[],"constraints":[]}"#;
        let plan = parse_plan(text).unwrap();
        assert_eq!(plan.goals, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn non_string_dependency_entries_are_dropped() {
        let text = r#"{"goals":[],"tasks":[{"description":"x","dependencies":["a",1,"b"]}],"constraints":[]}"#;
        let plan = parse_plan(text).unwrap();
        assert_eq!(
            plan.tasks[0].dependencies,
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn no_brace_block_fails() {
        let err = parse_plan("no json here at all").unwrap_err();
        assert_eq!(err, PlanParseError::NoBraceBlock);
    }

    #[test]
    fn unbalanced_braces_fail() {
        let err = parse_plan("{\"goals\": [\"A\"");
        assert!(err.is_err());
    }

    #[test]
    fn non_object_brace_block_fails() {
        // A balanced brace block that parses as JSON but isn't an object
        // is impossible for `{...}` syntax, but malformed JSON inside it
        // should still fail cleanly.
        let err = parse_plan("{not valid json}");
        assert!(matches!(err, Err(PlanParseError::MalformedObject(_))));
    }

    #[test]
    fn each_plan_gets_a_fresh_id() {
        let text = r#"{"goals":[],"tasks":[],"constraints":[]}"#;
        let a = parse_plan(text).unwrap();
        let b = parse_plan(text).unwrap();
        assert_ne!(a.id, b.id);
    }
}
