//! Golden-output comparison

/// Mismatch between golden and observed output
///
/// Comparison is byte-for-byte; line excerpts are decoded lossily and only
/// used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDiff {
    pub expected_len: usize,
    pub actual_len: usize,
    pub first_diff_line: Option<usize>,
    pub expected_excerpt: Option<String>,
    pub actual_excerpt: Option<String>,
}

impl OutputDiff {
    /// Compare expected against actual, returning None when they match exactly
    pub fn new(expected: &[u8], actual: &[u8]) -> Option<Self> {
        if expected == actual {
            return None;
        }

        let expected_text = String::from_utf8_lossy(expected);
        let actual_text = String::from_utf8_lossy(actual);
        let expected_lines: Vec<&str> = expected_text.lines().collect();
        let actual_lines: Vec<&str> = actual_text.lines().collect();

        let mut first_diff_line = None;
        let mut expected_excerpt = None;
        let mut actual_excerpt = None;

        for (i, (e, a)) in expected_lines.iter().zip(actual_lines.iter()).enumerate() {
            if e != a {
                first_diff_line = Some(i + 1);
                expected_excerpt = Some(e.to_string());
                actual_excerpt = Some(a.to_string());
                break;
            }
        }

        // Handle length mismatch when all shared lines agree
        if first_diff_line.is_none() && expected_lines.len() != actual_lines.len() {
            let line = expected_lines.len().min(actual_lines.len()) + 1;
            first_diff_line = Some(line);
            expected_excerpt = expected_lines.get(line - 1).map(|s| s.to_string());
            actual_excerpt = actual_lines.get(line - 1).map(|s| s.to_string());
        }

        Some(Self {
            expected_len: expected.len(),
            actual_len: actual.len(),
            first_diff_line,
            expected_excerpt,
            actual_excerpt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_equal_output_is_no_diff() {
        assert_eq!(OutputDiff::new(b"42\n", b"42\n"), None);
        assert_eq!(OutputDiff::new(b"", b""), None);
    }

    #[test]
    fn test_first_differing_line() {
        let diff = OutputDiff::new(b"one\ntwo\nthree\n", b"one\nTWO\nthree\n").unwrap();
        assert_eq!(diff.first_diff_line, Some(2));
        assert_eq!(diff.expected_excerpt.as_deref(), Some("two"));
        assert_eq!(diff.actual_excerpt.as_deref(), Some("TWO"));
    }

    #[test]
    fn test_shorter_actual_output() {
        let diff = OutputDiff::new(b"a\nb\nc\n", b"a\n").unwrap();
        assert_eq!(diff.first_diff_line, Some(2));
        assert_eq!(diff.expected_excerpt.as_deref(), Some("b"));
        assert_eq!(diff.actual_excerpt, None);
    }

    #[test]
    fn test_longer_actual_output() {
        let diff = OutputDiff::new(b"a\n", b"a\nextra\n").unwrap();
        assert_eq!(diff.first_diff_line, Some(2));
        assert_eq!(diff.expected_excerpt, None);
        assert_eq!(diff.actual_excerpt.as_deref(), Some("extra"));
    }

    #[test]
    fn test_trailing_newline_still_differs() {
        // lines() hides a missing final newline, the byte lengths do not
        let diff = OutputDiff::new(b"42\n", b"42").unwrap();
        assert_eq!(diff.expected_len, 3);
        assert_eq!(diff.actual_len, 2);
        assert_eq!(diff.first_diff_line, None);
    }

    #[test]
    fn test_non_utf8_output_still_diffs() {
        let diff = OutputDiff::new(b"ok\n", &[0xff, 0xfe, 0x0a]).unwrap();
        assert_eq!(diff.expected_len, 3);
        assert_eq!(diff.actual_len, 3);
        assert_eq!(diff.first_diff_line, Some(1));
    }
}
