// src/evaluator/parser.rs — Parse judge responses into verdicts

use super::PairwiseWinner;

/// A single-answer judgment parsed from judge text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVerdict {
    pub value: String,
    pub score: f64,
    pub reasoning: String,
}

/// Criteria verdict: the last non-empty line is `Y` or `N`; everything
/// before it is the reasoning.
///
/// ```text
/// The answer addresses the question directly ...
/// Y
/// ```
pub fn parse_criteria_verdict(response: &str) -> Result<ParsedVerdict, String> {
    let lines: Vec<&str> = response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let Some((last, rest)) = lines.split_last() else {
        return Err("empty judge response".into());
    };

    let verdict = last
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_ascii_uppercase();
    let score = match verdict.as_str() {
        "Y" | "YES" => 1.0,
        "N" | "NO" => 0.0,
        _ => {
            return Err(format!(
                "expected a final Y or N line, got '{}'",
                crate::util::truncate_str(last, 60)
            ))
        }
    };

    Ok(ParsedVerdict {
        value: if score > 0.0 { "Y".into() } else { "N".into() },
        score,
        reasoning: rest.join("\n"),
    })
}

/// Pairwise verdict: the last `[[X]]` marker wins, with `A` the first
/// answer, `B` the second and `C` a tie. Returns the winner and the text
/// before the marker.
pub fn parse_pairwise_verdict(response: &str) -> Result<(PairwiseWinner, String), String> {
    let text = response.trim();
    let Some(start) = text.rfind("[[") else {
        return Err(
            "output must contain a double bracketed verdict [[A]], [[B]] or [[C]]".into(),
        );
    };
    let after = &text[start + 2..];
    let Some(end) = after.find("]]") else {
        return Err("unterminated [[ verdict marker".into());
    };

    let winner = match after[..end].trim().to_ascii_uppercase().as_str() {
        "A" => PairwiseWinner::First,
        "B" => PairwiseWinner::Second,
        "C" => PairwiseWinner::Tie,
        other => return Err(format!("unknown verdict '[[{}]]'", other)),
    };
    Ok((winner, text[..start].trim().to_string()))
}

/// QA grade against a gold answer: a `GRADE: CORRECT|INCORRECT` line,
/// or the last line mentioning either word.
pub fn parse_qa_grade(response: &str) -> Result<ParsedVerdict, String> {
    let grade_line = response
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| {
            let upper = l.to_ascii_uppercase();
            upper.starts_with("GRADE:") || upper.contains("CORRECT")
        })
        .ok_or_else(|| "no CORRECT/INCORRECT grade found".to_string())?;

    let upper = grade_line.to_ascii_uppercase();
    let correct = if upper.contains("INCORRECT") {
        false
    } else if upper.contains("CORRECT") {
        true
    } else {
        return Err(format!("unreadable grade line '{}'", grade_line));
    };

    let reasoning = response
        .lines()
        .map(str::trim)
        .filter(|l| *l != grade_line && !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ParsedVerdict {
        value: if correct { "CORRECT".into() } else { "INCORRECT".into() },
        score: if correct { 1.0 } else { 0.0 },
        reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_yes() {
        let v = parse_criteria_verdict("The answer is on topic.\nIt is complete.\nY").unwrap();
        assert_eq!(v.value, "Y");
        assert_eq!(v.score, 1.0);
        assert_eq!(v.reasoning, "The answer is on topic.\nIt is complete.");
    }

    #[test]
    fn test_criteria_no_with_punctuation() {
        let v = parse_criteria_verdict("Too long.\n\n  n.  \n").unwrap();
        assert_eq!(v.value, "N");
        assert_eq!(v.score, 0.0);
    }

    #[test]
    fn test_criteria_missing_verdict() {
        assert!(parse_criteria_verdict("I think it is fine").is_err());
        assert!(parse_criteria_verdict("   \n").is_err());
    }

    #[test]
    fn test_pairwise_markers() {
        let (w, r) = parse_pairwise_verdict("B cites sources.\n[[B]]").unwrap();
        assert_eq!(w, PairwiseWinner::Second);
        assert_eq!(r, "B cites sources.");
        assert_eq!(parse_pairwise_verdict("[[A]]").unwrap().0, PairwiseWinner::First);
        assert_eq!(parse_pairwise_verdict("equal [[c]]").unwrap().0, PairwiseWinner::Tie);
    }

    #[test]
    fn test_pairwise_last_marker_wins() {
        let (w, _) = parse_pairwise_verdict("Not [[A]] but rather [[B]]").unwrap();
        assert_eq!(w, PairwiseWinner::Second);
    }

    #[test]
    fn test_pairwise_malformed() {
        assert!(parse_pairwise_verdict("Assistant A is better").is_err());
        assert!(parse_pairwise_verdict("[[D]]").is_err());
        assert!(parse_pairwise_verdict("[[A").is_err());
    }

    #[test]
    fn test_qa_grade() {
        let v = parse_qa_grade("Matches the reference.\nGRADE: CORRECT").unwrap();
        assert_eq!(v.value, "CORRECT");
        assert_eq!(v.reasoning, "Matches the reference.");
        let v = parse_qa_grade("GRADE: INCORRECT").unwrap();
        assert_eq!(v.score, 0.0);
        assert!(parse_qa_grade("no idea").is_err());
    }
}
