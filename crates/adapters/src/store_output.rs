//! Parsing of task store query output
//!
//! The store prints a JSON array mixed with banners and warnings. The array
//! starts on the first line beginning with `[` and runs to its matching `]`.

use social_scheduler_domain::{StoreError, TaskRecord};

/// How to treat output the parser cannot understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Unparseable output reads as "no records" (logged at warn)
    #[default]
    Lenient,
    /// Unparseable output is a [`StoreError::Parse`]
    Strict,
}

impl ParseMode {
    pub fn from_lenient(lenient: bool) -> Self {
        if lenient {
            ParseMode::Lenient
        } else {
            ParseMode::Strict
        }
    }
}

/// Extract and decode the task records embedded in `output`
pub fn parse_records(output: &str, mode: ParseMode) -> Result<Vec<TaskRecord>, StoreError> {
    match decode(output) {
        Ok(records) => Ok(records),
        Err(e) if mode == ParseMode::Lenient => {
            // Callers cannot tell this apart from an empty queue
            tracing::warn!(error = %e, "Ignoring unparseable task store output");
            Ok(vec![])
        }
        Err(e) => Err(e),
    }
}

fn decode(output: &str) -> Result<Vec<TaskRecord>, StoreError> {
    let json = extract_json_array(output)
        .ok_or_else(|| StoreError::Parse("no JSON array in output".to_string()))?;
    serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))
}

/// Slice of `output` holding the first top-level JSON array.
///
/// The array must open at the start of a line (after indentation); brackets
/// inside JSON strings do not count toward nesting.
pub fn extract_json_array(output: &str) -> Option<&str> {
    let mut offset = 0;
    let mut start = None;
    for line in output.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        if line.trim_start().starts_with('[') {
            start = Some(offset + indent);
            break;
        }
        offset += line.len();
    }
    let start = start?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in output[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&output[start..start + i + 1]);
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

    const SAMPLE: &str = r#"Using repo at ~/.dstask
[
  {
    "uuid": "a1",
    "status": "pending",
    "id": 1,
    "summary": "Launch [beta] post",
    "notes": "",
    "tags": ["social", "draft", "twitter"],
    "project": "",
    "priority": "P2",
    "created": "2026-01-10T10:00:00Z",
    "resolved": "0001-01-01T00:00:00Z",
    "due": "0001-01-01T00:00:00Z"
  }
]
1 task shown"#;

    #[test]
    fn test_extracts_array_between_banners() {
        let records = parse_records(SAMPLE, ParseMode::Strict).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary, "Launch [beta] post");
        assert_eq!(records[0].id.as_str(), "1");
    }

    #[test]
    fn test_single_line_array() {
        let output = "warning: something\n[{\"id\": 4, \"summary\": \"]\"}] trailing";
        assert_eq!(
            extract_json_array(output),
            Some("[{\"id\": 4, \"summary\": \"]\"}]")
        );
    }

    #[test]
    fn test_empty_array() {
        let records = parse_records("No matches\n[]\n", ParseMode::Strict).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_lenient_swallows_missing_array() {
        let records = parse_records("dstask: nothing to show", ParseMode::Lenient).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_lenient_swallows_malformed_json() {
        let output = "[\n  {\"id\": \n]";
        assert!(parse_records(output, ParseMode::Lenient).unwrap().is_empty());
        assert!(matches!(
            parse_records(output, ParseMode::Strict),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn test_strict_reports_missing_array() {
        assert!(matches!(
            parse_records("no json here", ParseMode::Strict),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn test_bracket_mid_line_is_not_a_start() {
        assert_eq!(extract_json_array("see [docs] for help"), None);
    }
}
