//! Extracts a [`BlindEvaluation`] from free-form model text.
//!
//! Unlike the plan parser, this one **never raises** — an unparseable or
//! malformed evaluation is an expected outcome, not an error condition.
//! Any failure (no brace block, invalid JSON, wrong shape) substitutes
//! [`BlindEvaluation::conservative_default`].

use serde_json::Value;

use crate::model::{BlindEvaluation, VsGoal, VsPrevious};
use crate::plan_parser::extract_first_brace_block;

const MAX_LIST_LEN: usize = 10;

/// Parse a [`BlindEvaluation`] out of raw model text, never failing.
pub fn parse_evaluation(text: &str) -> BlindEvaluation {
    try_parse_evaluation(text).unwrap_or_else(BlindEvaluation::conservative_default)
}

fn try_parse_evaluation(text: &str) -> Option<BlindEvaluation> {
    let block = extract_first_brace_block(text)?;
    let value: Value = serde_json::from_str(block).ok()?;
    let object = value.as_object()?;

    let vs_previous = object
        .get("vs_previous")
        .and_then(Value::as_str)
        .and_then(parse_vs_previous)
        .unwrap_or(VsPrevious::Same);

    let vs_goal = object
        .get("vs_goal")
        .and_then(Value::as_str)
        .and_then(parse_vs_goal)
        .unwrap_or(VsGoal::Same);

    let contradictions = string_list_capped(object.get("contradictions"));
    let missing = string_list_capped(object.get("missing"));
    let risks = string_list_capped(object.get("risks"));

    Some(BlindEvaluation {
        vs_previous,
        vs_goal,
        contradictions,
        missing,
        risks,
    })
}

fn parse_vs_previous(raw: &str) -> Option<VsPrevious> {
    match raw.to_lowercase().as_str() {
        "better" => Some(VsPrevious::Better),
        "same" => Some(VsPrevious::Same),
        "worse" => Some(VsPrevious::Worse),
        _ => None,
    }
}

fn parse_vs_goal(raw: &str) -> Option<VsGoal> {
    match raw.to_lowercase().as_str() {
        "closer" => Some(VsGoal::Closer),
        "same" => Some(VsGoal::Same),
        "farther" => Some(VsGoal::Farther),
        _ => None,
    }
}

fn string_list_capped(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .take(MAX_LIST_LEN)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_evaluation() {
        let text = r#"{"vs_previous":"better","vs_goal":"closer","contradictions":[],"missing":[],"risks":[]}"#;
        let eval = parse_evaluation(text);
        assert_eq!(eval.vs_previous, VsPrevious::Better);
        assert_eq!(eval.vs_goal, VsGoal::Closer);
    }

    #[test]
    fn tolerates_markdown_wrapping() {
        let text = "```json\n{\"vs_previous\":\"worse\",\"vs_goal\":\"farther\",\"contradictions\":[\"x\"],\"missing\":[],\"risks\":[]}\n```";
        let eval = parse_evaluation(text);
        assert_eq!(eval.vs_previous, VsPrevious::Worse);
        assert_eq!(eval.contradictions, vec!["x".to_string()]);
    }

    #[test]
    fn unrecognized_enum_defaults_to_neutral() {
        let text = r#"{"vs_previous":"much better!","vs_goal":"unclear","contradictions":[],"missing":[],"risks":[]}"#;
        let eval = parse_evaluation(text);
        assert_eq!(eval.vs_previous, VsPrevious::Same);
        assert_eq!(eval.vs_goal, VsGoal::Same);
    }

    #[test]
    fn missing_keys_default_to_neutral() {
        let eval = parse_evaluation("{}");
        assert_eq!(eval.vs_previous, VsPrevious::Same);
        assert_eq!(eval.vs_goal, VsGoal::Same);
        assert!(eval.contradictions.is_empty());
    }

    #[test]
    fn lists_are_capped_at_ten() {
        let items: Vec<String> = (0..15).map(|i| format!("\"item{i}\"")).collect();
        let text = format!(
            r#"{{"vs_previous":"same","vs_goal":"same","contradictions":[{}],"missing":[],"risks":[]}}"#,
            items.join(",")
        );
        let eval = parse_evaluation(&text);
        assert_eq!(eval.contradictions.len(), MAX_LIST_LEN);
    }

    #[test]
    fn never_raises_on_garbage_text() {
        let eval = parse_evaluation("the model rambled and never produced json");
        let default = BlindEvaluation::conservative_default();
        assert_eq!(eval.vs_previous, default.vs_previous);
        assert_eq!(eval.vs_goal, default.vs_goal);
        assert_eq!(eval.contradictions, default.contradictions);
        assert_eq!(eval.missing, default.missing);
        assert_eq!(eval.risks, default.risks);
    }

    #[test]
    fn never_raises_on_malformed_json() {
        let eval = parse_evaluation("{this is not valid json at all}");
        assert_eq!(eval.contradictions, vec!["Evaluation parsing failed".to_string()]);
    }

    #[test]
    fn no_numeric_fields_ever_produced() {
        let eval = parse_evaluation(
            r#"{"vs_previous":"better","vs_goal":"closer","score":9.5,"contradictions":[],"missing":[],"risks":[]}"#,
        );
        let json = serde_json::to_value(&eval).unwrap();
        for value in json.as_object().unwrap().values() {
            assert!(!value.is_number());
        }
    }
}
