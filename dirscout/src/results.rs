use std::path::PathBuf;

use crate::errors::SearchError;

/// A single matching line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// 0-based line number within the file
    pub line_number: usize,
    /// Bounded window of the line around the first occurrence of the term
    pub snippet: String,
}

impl LineMatch {
    pub fn new(line_number: usize, snippet: impl Into<String>) -> Self {
        Self {
            line_number,
            snippet: snippet.into(),
        }
    }
}

/// All matches found in a single file, in ascending line order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    /// Directory the file was found in
    pub directory: PathBuf,
    /// Name of the file within `directory`
    pub file_name: String,
    pub matches: Vec<LineMatch>,
}

impl FileResult {
    /// Full path of the file
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Counts and failures reported once a run has finished
#[derive(Debug, Default)]
pub struct SearchSummary {
    pub directories_visited: u64,
    pub files_scanned: u64,
    /// File results the caller had not received when the run was finished
    pub unread_results: usize,
    /// Entries that could not be listed or read and were skipped
    pub failures: Vec<SearchError>,
}

impl SearchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// The complete, collected output of a search
#[derive(Debug, Default)]
pub struct SearchOutput {
    /// Results per file, sorted by path
    pub file_results: Vec<FileResult>,
    /// Total number of matching lines
    pub total_matches: usize,
    /// Number of files with at least one match
    pub files_with_matches: usize,
    pub directories_visited: u64,
    pub files_scanned: u64,
    pub failures: Vec<SearchError>,
}

impl SearchOutput {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a file result to the output
    pub fn add_file_result(&mut self, file_result: FileResult) {
        if file_result.matches.is_empty() {
            return;
        }
        self.total_matches += file_result.matches.len();
        self.files_with_matches += 1;
        self.file_results.push(file_result);
    }

    /// Folds the end-of-run summary into the output and orders results by path
    pub fn finish(&mut self, summary: SearchSummary) {
        self.directories_visited = summary.directories_visited;
        self.files_scanned = summary.files_scanned;
        self.failures = summary.failures;
        self.file_results.sort_by_key(|r| r.path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_result(dir: &str, name: &str, lines: &[usize]) -> FileResult {
        FileResult {
            directory: PathBuf::from(dir),
            file_name: name.to_string(),
            matches: lines
                .iter()
                .map(|&n| LineMatch::new(n, format!("line {n}")))
                .collect(),
        }
    }

    #[test]
    fn test_file_result_path() {
        let result = file_result("src/search", "engine.rs", &[0]);
        assert_eq!(result.path(), PathBuf::from("src/search/engine.rs"));
    }

    #[test]
    fn test_add_file_result() {
        let mut output = SearchOutput::new();
        output.add_file_result(file_result("a", "one.txt", &[0, 4]));
        output.add_file_result(file_result("a", "two.txt", &[]));
        output.add_file_result(file_result("b", "three.txt", &[7]));

        assert_eq!(output.total_matches, 3);
        assert_eq!(output.files_with_matches, 2);
        assert_eq!(output.file_results.len(), 2);
    }

    #[test]
    fn test_finish_sorts_and_copies_counts() {
        let mut output = SearchOutput::new();
        output.add_file_result(file_result("b", "z.txt", &[1]));
        output.add_file_result(file_result("a", "y.txt", &[2]));
        output.add_file_result(file_result("a", "x.txt", &[3]));

        output.finish(SearchSummary {
            directories_visited: 2,
            files_scanned: 5,
            unread_results: 0,
            failures: vec![SearchError::usage("boom")],
        });

        let paths: Vec<_> = output.file_results.iter().map(FileResult::path).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a/x.txt"),
                PathBuf::from("a/y.txt"),
                PathBuf::from("b/z.txt")
            ]
        );
        assert_eq!(output.directories_visited, 2);
        assert_eq!(output.files_scanned, 5);
        assert_eq!(output.failures.len(), 1);
    }
}
