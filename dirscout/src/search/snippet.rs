use memchr::memmem::Finder;

use crate::results::LineMatch;

/// Bytes of context kept on each side of the term
const CONTEXT_BYTES: usize = 10;

/// Finds every line of `contents` containing `term` literally.
///
/// Lines are split on `\n` and numbered from 0. For each matching line the
/// snippet spans from 10 bytes before the first occurrence to 10 bytes past
/// its end, clipped to the line. An empty term matches nothing.
pub fn scan(contents: &[u8], term: &str) -> Vec<LineMatch> {
    if term.is_empty() {
        return Vec::new();
    }

    let finder = Finder::new(term.as_bytes());
    contents
        .split(|&b| b == b'\n')
        .enumerate()
        .filter_map(|(line_number, line)| {
            let idx = finder.find(line)?;
            Some(LineMatch {
                line_number,
                snippet: snippet(line, idx, term.len()),
            })
        })
        .collect()
}

fn snippet(line: &[u8], idx: usize, term_len: usize) -> String {
    let lower = idx.saturating_sub(CONTEXT_BYTES);
    let upper = (idx + term_len + CONTEXT_BYTES).min(line.len());
    String::from_utf8_lossy(&line[lower..upper]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let matches = scan(b"this is the contents of a file", "file");
        assert_eq!(matches, vec![LineMatch::new(0, "ents of a file")]);
    }

    #[test]
    fn test_two_lines() {
        let matches = scan(
            b"this is the contents of a file\nthis file also contains a second line",
            "file",
        );
        assert_eq!(
            matches,
            vec![
                LineMatch::new(0, "ents of a file"),
                LineMatch::new(1, "this file also cont"),
            ]
        );
    }

    #[test]
    fn test_no_match_and_empty_input() {
        assert!(scan(b"nothing to see here", "file").is_empty());
        assert!(scan(b"", "file").is_empty());
        assert!(scan(b"\n\n\n", "file").is_empty());
        assert!(scan(b"some text", "").is_empty());
    }

    #[test]
    fn test_term_longer_than_line() {
        assert!(scan(b"fi\nfil\n", "file").is_empty());
        let matches = scan(b"file", "file");
        assert_eq!(matches, vec![LineMatch::new(0, "file")]);
    }

    #[test]
    fn test_match_at_line_end_is_clipped() {
        let line = "0123456789abcdefghijTERM";
        let matches = scan(line.as_bytes(), "TERM");
        assert_eq!(matches[0].snippet, "abcdefghijTERM");
    }

    #[test]
    fn test_match_mid_line_window() {
        let line = "aaaaaaaaaaaaaaaaaaaa0123456789TERM0123456789bbbbbbbbbb";
        let matches = scan(line.as_bytes(), "TERM");
        assert_eq!(matches[0].snippet, "0123456789TERM0123456789");
    }

    #[test]
    fn test_first_occurrence_only() {
        let matches = scan(b"x needle y needle z", "needle");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].snippet, "x needle y needle ");
    }

    #[test]
    fn test_case_sensitive() {
        assert!(scan(b"FILE File", "file").is_empty());
    }

    #[test]
    fn test_line_numbers_ascending_and_zero_based() {
        let mut contents = String::new();
        for i in 0..200 {
            if i % 7 == 0 {
                contents.push_str(&format!("line {i} has the needle\n"));
            } else {
                contents.push_str(&format!("line {i} is plain\n"));
            }
        }

        let matches = scan(contents.as_bytes(), "needle");
        let numbers: Vec<_> = matches.iter().map(|m| m.line_number).collect();
        let expected: Vec<usize> = (0..200).filter(|i| i % 7 == 0).collect();
        assert_eq!(numbers, expected);
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_snippet_bounds_within_line() {
        let lines = ["n", "needle", "xneedle", "needlex", "a needle in a haystack"];
        for line in lines {
            for m in scan(line.as_bytes(), "needle") {
                assert!(m.snippet.len() <= line.len());
                assert!(line.contains(&m.snippet));
                assert!(m.snippet.contains("needle"));
            }
        }
    }

    #[test]
    fn test_carriage_return_is_kept() {
        let matches = scan(b"needle\r\nnext", "needle");
        assert_eq!(matches, vec![LineMatch::new(0, "needle\r")]);
    }
}
