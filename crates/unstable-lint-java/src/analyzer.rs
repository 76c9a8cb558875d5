//! Analyzer orchestrating discovery, resolution and rule evaluation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use unstable_lint_core::{Config, LintResult, RuleBox, UsageRule, Violation};

use crate::error::AnalyzerError;
use crate::program::Program;

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: UsageRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config.
    pub fn config_file(self, path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let config = Config::from_file(path.as_ref())?;
        Ok(self.config(config))
    }

    /// Sets whether to fail on syntax errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or an
    /// exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            let cwd = std::env::current_dir().map_err(|source| AnalyzerError::Io {
                path: root.clone(),
                source,
            })?;
            cwd.join(&root)
        };

        let mut patterns = self.exclude_patterns;
        patterns.extend(config.analyzer.exclude.iter().cloned());
        let exclude = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude,
            fail_on_parse_error: self.fail_on_parse_error || config.analyzer.fail_on_parse_error,
            respect_gitignore: config.analyzer.respect_gitignore,
            config,
        })
    }
}

/// Runs restricted-API rules over a Java source tree.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
    respect_gitignore: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Analyzes every `.java` file under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or reading fails, or if a file has
    /// syntax errors and `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.discover_files()?;
        info!("Found {} Java files to analyze", files.len());

        let sources = files
            .into_iter()
            .map(|path| {
                let text = read_source(&path)?;
                Ok((path, text))
            })
            .collect::<Result<Vec<_>, AnalyzerError>>()?;

        self.run(sources)
    }

    /// Analyzes in-memory sources as one program.
    ///
    /// # Errors
    ///
    /// Returns an error if a source has syntax errors and
    /// `fail_on_parse_error` is set, or nests too deeply to analyze.
    pub fn analyze_sources<P, S>(&self, sources: &[(P, S)]) -> Result<LintResult, AnalyzerError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let sources = sources
            .iter()
            .map(|(p, s)| (p.as_ref().to_path_buf(), s.as_ref().to_string()))
            .collect();
        self.run(sources)
    }

    fn run(&self, sources: Vec<(PathBuf, String)>) -> Result<LintResult, AnalyzerError> {
        let mut program = Program::parse(sources)?;

        if self.fail_on_parse_error {
            if let Some(path) = program.units_with_errors().first() {
                return Err(AnalyzerError::Parse {
                    path: path.to_path_buf(),
                    message: "source contains syntax errors".to_string(),
                });
            }
        }

        let rules: Vec<&RuleBox> = self
            .rules
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();

        let mut result = LintResult::new();
        for unit in 0..program.unit_count() {
            if let Some(path) = program.path(unit) {
                debug!("Analyzing: {}", path.display());
            }
            let usages = program.usages(unit)?;
            result.usages_checked += usages.len();
            result.files_checked += 1;

            for rule in &rules {
                let violations = rule.check(&usages, program.table());
                result
                    .violations
                    .extend(self.apply_severity_override(rule.name(), violations));
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(&self, rule_name: &str, mut violations: Vec<Violation>) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all Java source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(self.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("java") {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        if files.is_empty() {
            warn!("No Java files found under {}", self.root.display());
        }

        files.sort();
        Ok(files)
    }

    /// Checks a path against the exclude patterns, both as given and
    /// relative to the root.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches_path(relative))
    }
}

/// Reads a source file; invalid UTF-8 is replaced with U+FFFD.
fn read_source(path: &Path) -> Result<String, AnalyzerError> {
    let bytes = std::fs::read(path).map_err(|source| AnalyzerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!("{} is not valid UTF-8; decoding lossily", path.display());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.rule_count(), 0);
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root("/project")
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build analyzer");

        // Config defaults contribute build/ and target/.
        assert!(analyzer.should_exclude(Path::new("/project/build/gen/A.java")));
        assert!(analyzer.should_exclude(Path::new("/project/src/generated/B.java")));
        assert!(analyzer.should_exclude(Path::new("/project/target/C.java")));
        assert!(!analyzer.should_exclude(Path::new("/project/src/main/java/D.java")));
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let result = Analyzer::builder().root(".").exclude("[").build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn config_file_errors_are_typed() {
        let result = Analyzer::builder().config_file("/nonexistent/unstable-lint.toml");
        assert!(matches!(result, Err(AnalyzerError::Config(_))));
    }

    #[test]
    fn fail_on_parse_error_stops_the_run() {
        let analyzer = Analyzer::builder()
            .fail_on_parse_error(true)
            .build()
            .expect("builds");
        let err = analyzer
            .analyze_sources(&[("Broken.java", "class Broken { void m( }")])
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { .. }));
    }

    #[test]
    fn latin1_source_is_read_lossily() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Latin.java");
        std::fs::write(&path, b"// caf\xe9\nclass Latin {}\n").expect("write");

        let text = read_source(&path).expect("lossy read");
        assert!(text.starts_with("// caf\u{fffd}"));
        assert!(text.contains("class Latin"));
    }
}
