//! TOML parsing for practice tests and submissions.
//!
//! Loads test definitions and submission files from TOML, and validates test
//! definitions for common authoring mistakes.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{PracticeTest, Question, Skill, Submission};

/// Intermediate TOML structure for a practice test file.
#[derive(Debug, Deserialize)]
struct TomlTestFile {
    test: TomlTestHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_skill_str")]
    skill: String,
}

fn default_skill_str() -> String {
    "reading".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default)]
    prompt: String,
    answer: String,
}

/// Intermediate TOML structure for a submission file.
#[derive(Debug, Deserialize)]
struct TomlSubmissionFile {
    submission: TomlSubmissionHeader,
    #[serde(default)]
    answers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TomlSubmissionHeader {
    learner_id: String,
    test_id: String,
}

/// Parse a single TOML file into a `PracticeTest`.
pub fn parse_practice_test(path: &Path) -> Result<PracticeTest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file: {}", path.display()))?;

    parse_practice_test_str(&content, path)
}

/// Parse a TOML string into a `PracticeTest` (useful for testing).
pub fn parse_practice_test_str(content: &str, source_path: &Path) -> Result<PracticeTest> {
    let parsed: TomlTestFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let skill: Skill = parsed
        .test
        .skill
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            prompt: q.prompt,
            answer: q.answer,
        })
        .collect();

    Ok(PracticeTest {
        id: parsed.test.id,
        name: parsed.test.name,
        description: parsed.test.description,
        skill,
        questions,
    })
}

/// Parse a single TOML file into a `Submission`.
pub fn parse_submission(path: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;

    parse_submission_str(&content, path)
}

/// Parse a TOML string into a `Submission`.
pub fn parse_submission_str(content: &str, source_path: &Path) -> Result<Submission> {
    let parsed: TomlSubmissionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    anyhow::ensure!(
        !parsed.submission.learner_id.trim().is_empty(),
        "submission has an empty learner_id: {}",
        source_path.display()
    );
    anyhow::ensure!(
        !parsed.submission.test_id.trim().is_empty(),
        "submission has an empty test_id: {}",
        source_path.display()
    );

    Ok(Submission {
        learner_id: parsed.submission.learner_id,
        test_id: parsed.submission.test_id,
        answers: parsed.answers,
    })
}

/// Recursively load all `.toml` practice tests from a directory.
pub fn load_test_directory(dir: &Path) -> Result<Vec<PracticeTest>> {
    let mut tests = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            tests.extend(load_test_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_practice_test(&path) {
                Ok(test) => tests.push(test),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(tests)
}

/// Recursively load all `.toml` submissions from a directory.
pub fn load_submission_directory(dir: &Path) -> Result<Vec<Submission>> {
    let mut submissions = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            submissions.extend(load_submission_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_submission(&path) {
                Ok(submission) => submissions.push(submission),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(submissions)
}

/// A warning from practice-test validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a practice test for common issues.
pub fn validate_practice_test(test: &PracticeTest) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if test.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "test has no questions".into(),
        });
    }

    if !test.skill.is_scorable() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "skill '{}' has no answer key and cannot be marked",
                test.skill
            ),
        });
    }

    // Check for duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for question in &test.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    // Check for empty answers
    for question in &test.questions {
        if question.answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "answer is empty and can never be matched".into(),
            });
        }
    }

    // Check for empty prompts
    for question in &test.questions {
        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TEST_TOML: &str = r#"
[test]
id = "academic-reading-1"
name = "Academic Reading Practice 1"
description = "True/false/not given questions on a short passage"
skill = "reading"

[[questions]]
id = "q1"
prompt = "The museum opened before 1900. (true / false / not given)"
answer = "true"

[[questions]]
id = "q2"
prompt = "Entry was free on weekdays. (true / false / not given)"
answer = "not given"
"#;

    const VALID_SUBMISSION_TOML: &str = r#"
[submission]
learner_id = "learner-042"
test_id = "academic-reading-1"

[answers]
q1 = "True"
q2 = "false"
"#;

    #[test]
    fn parse_valid_test() {
        let test =
            parse_practice_test_str(VALID_TEST_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(test.id, "academic-reading-1");
        assert_eq!(test.skill, Skill::Reading);
        assert_eq!(test.questions.len(), 2);
        assert_eq!(test.questions[1].answer, "not given");
    }

    #[test]
    fn parse_defaults_to_reading() {
        let toml = r#"
[test]
id = "minimal"
name = "Minimal"

[[questions]]
id = "q1"
answer = "yes"
"#;
        let test = parse_practice_test_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(test.skill, Skill::Reading);
        assert_eq!(test.questions[0].prompt, "");
    }

    #[test]
    fn parse_unknown_skill_fails() {
        let toml = r#"
[test]
id = "bad"
name = "Bad"
skill = "mathematics"
"#;
        assert!(parse_practice_test_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_valid_submission() {
        let submission =
            parse_submission_str(VALID_SUBMISSION_TOML, &PathBuf::from("sub.toml")).unwrap();
        assert_eq!(submission.learner_id, "learner-042");
        assert_eq!(submission.test_id, "academic-reading-1");
        assert_eq!(submission.answers["q1"], "True");
    }

    #[test]
    fn parse_submission_rejects_blank_ids() {
        let toml = r#"
[submission]
learner_id = "  "
test_id = "t1"
"#;
        assert!(parse_submission_str(toml, &PathBuf::from("sub.toml")).is_err());
    }

    #[test]
    fn validate_duplicate_question_ids() {
        let toml = r#"
[test]
id = "dupes"
name = "Dupes"

[[questions]]
id = "same"
prompt = "First?"
answer = "a"

[[questions]]
id = "same"
prompt = "Second?"
answer = "b"
"#;
        let test = parse_practice_test_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_practice_test(&test);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_empty_answer_and_unscorable_skill() {
        let toml = r#"
[test]
id = "essay"
name = "Essay"
skill = "writing"

[[questions]]
id = "q1"
prompt = "Write an essay."
answer = "  "
"#;
        let test = parse_practice_test_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_practice_test(&test);
        assert!(warnings.iter().any(|w| w.message.contains("cannot be marked")));
        assert!(warnings.iter().any(|w| w.message.contains("answer is empty")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_practice_test_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.toml"), VALID_TEST_TOML).unwrap();
        // A broken file is skipped with a warning, not a hard failure.
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();

        let tests = load_test_directory(dir.path()).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].id, "academic-reading-1");
    }

    #[test]
    fn load_submissions_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sub.toml"), VALID_SUBMISSION_TOML).unwrap();

        let submissions = load_submission_directory(dir.path()).unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].learner_id, "learner-042");
    }
}
