//! services/api/src/parse.rs
//!
//! Decodes the solver model's free-form text into a `SolvedProblem`.
//!
//! The model is instructed to answer with a strict JSON object, but in
//! practice it often wraps that object in markdown code fences. Stripping and
//! decoding are kept as two separate, synchronous functions so the brittle
//! assumption about model output stays unit-testable away from any network
//! code.

use math_mentor_core::domain::SolvedProblem;
use math_mentor_core::ports::{PortError, PortResult};
use regex::Regex;
use serde::Deserialize;

/// The JSON shape the solver model has agreed to answer with.
#[derive(Deserialize)]
struct RawSolved {
    problem: String,
    solution: String,
}

/// Removes markdown code-fence markup (```json ... ``` or bare ``` ... ```)
/// from the model's answer, leaving whatever was inside untouched.
pub fn strip_fences(text: &str) -> String {
    let fence_regex = Regex::new(r"```(?:json)?\n?|```").unwrap();
    fence_regex.replace_all(text, "").trim().to_string()
}

/// Parses fence-stripped text as a JSON object with string fields `problem`
/// and `solution`. No repair is attempted: invalid JSON or a missing field
/// fails with `PortError::Parse`.
pub fn decode_solved(text: &str) -> PortResult<SolvedProblem> {
    let raw: RawSolved =
        serde_json::from_str(text).map_err(|e| PortError::Parse(e.to_string()))?;
    Ok(SolvedProblem {
        problem: raw.problem,
        solution: raw.solution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let wrapped = "```json\n{\"problem\":\"2+2\",\"solution\":\"4\"}\n```";
        assert_eq!(strip_fences(wrapped), "{\"problem\":\"2+2\",\"solution\":\"4\"}");
    }

    #[test]
    fn strips_bare_fences() {
        let wrapped = "```\n{\"problem\":\"x=1\",\"solution\":\"x is 1\"}\n```";
        assert_eq!(
            strip_fences(wrapped),
            "{\"problem\":\"x=1\",\"solution\":\"x is 1\"}"
        );
    }

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn decodes_the_agreed_shape() {
        let solved = decode_solved("{\"problem\":\"2+2\",\"solution\":\"Add 2 and 2 to get 4\"}")
            .expect("should decode");
        assert_eq!(solved.problem, "2+2");
        assert_eq!(solved.solution, "Add 2 and 2 to get 4");
    }

    #[test]
    fn decodes_the_na_sentinel_pair_verbatim() {
        let solved =
            decode_solved("{\"problem\":\"N/A\",\"solution\":\"N/A\"}").expect("should decode");
        assert_eq!(solved.problem, "N/A");
        assert_eq!(solved.solution, "N/A");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = decode_solved("the problem is 2+2 and the answer is 4").unwrap_err();
        assert!(matches!(err, PortError::Parse(_)));
    }

    #[test]
    fn missing_solution_field_is_a_parse_error() {
        let err = decode_solved("{\"problem\":\"2+2\"}").unwrap_err();
        assert!(matches!(err, PortError::Parse(_)));
    }

    #[test]
    fn strip_then_decode_handles_a_fenced_answer_end_to_end() {
        let raw = "```json\n{\"problem\":\"3x = 9\",\"solution\":\"Divide both sides by 3.\\nx = 3\"}\n```";
        let solved = decode_solved(&strip_fences(raw)).expect("should decode");
        assert_eq!(solved.problem, "3x = 9");
        assert_eq!(solved.solution, "Divide both sides by 3.\nx = 3");
    }
}
