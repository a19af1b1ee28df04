//! Evaluation dataset: the table of RAG outputs to be scored.
//!
//! Each row is one evaluation unit: a question, the generated answer, the
//! retrieved context passages in rank order, and optionally the ground-truth
//! answer(s). Columns must have equal row counts; a mismatch is a fatal
//! configuration error, not something scoring recovers from.

use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One evaluation row as it appears in a JSON dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagRecord {
    /// The user question.
    pub question: String,
    /// The answer generated by the pipeline under evaluation.
    pub answer: String,
    /// Retrieved context passages, in retrieval-rank order.
    #[serde(default)]
    pub contexts: Vec<String>,
    /// Ground-truth answer sentences (if annotated).
    #[serde(default)]
    pub ground_truths: Option<Vec<String>>,
}

/// A column-oriented batch of evaluation rows.
///
/// Immutable once constructed; metric drivers only ever read from it.
#[derive(Debug, Clone)]
pub struct EvaluationDataset {
    questions: Vec<String>,
    answers: Vec<String>,
    contexts: Vec<Vec<String>>,
    ground_truths: Option<Vec<Vec<String>>>,
}

impl EvaluationDataset {
    /// Build a dataset from columns, validating that row counts agree.
    pub fn from_columns(
        questions: Vec<String>,
        answers: Vec<String>,
        contexts: Vec<Vec<String>>,
        ground_truths: Option<Vec<Vec<String>>>,
    ) -> Result<Self> {
        let expected = questions.len();

        if answers.len() != expected {
            return Err(RagEvalError::ColumnMismatch {
                column: "answer",
                expected,
                actual: answers.len(),
            });
        }
        if contexts.len() != expected {
            return Err(RagEvalError::ColumnMismatch {
                column: "contexts",
                expected,
                actual: contexts.len(),
            });
        }
        if let Some(ref gts) = ground_truths {
            if gts.len() != expected {
                return Err(RagEvalError::ColumnMismatch {
                    column: "ground_truths",
                    expected,
                    actual: gts.len(),
                });
            }
        }

        Ok(Self {
            questions,
            answers,
            contexts,
            ground_truths,
        })
    }

    /// Build a dataset from row records.
    ///
    /// The `ground_truths` column exists only if every record carries one;
    /// a partially-annotated file is rejected rather than silently scored
    /// with holes.
    pub fn from_records(records: Vec<RagRecord>) -> Result<Self> {
        let expected = records.len();
        let annotated = records.iter().filter(|r| r.ground_truths.is_some()).count();

        let mut questions = Vec::with_capacity(expected);
        let mut answers = Vec::with_capacity(expected);
        let mut contexts = Vec::with_capacity(expected);
        let mut ground_truths = Vec::with_capacity(expected);

        for record in records {
            questions.push(record.question);
            answers.push(record.answer);
            contexts.push(record.contexts);
            if let Some(gt) = record.ground_truths {
                ground_truths.push(gt);
            }
        }

        let ground_truths = match annotated {
            0 => None,
            n if n == expected => Some(ground_truths),
            n => {
                return Err(RagEvalError::ColumnMismatch {
                    column: "ground_truths",
                    expected,
                    actual: n,
                });
            }
        };

        Self::from_columns(questions, answers, contexts, ground_truths)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Check if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question column.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Answer column.
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Contexts column (passages in retrieval-rank order per row).
    pub fn contexts(&self) -> &[Vec<String>] {
        &self.contexts
    }

    /// Ground-truth column, if the dataset is annotated.
    pub fn ground_truths(&self) -> Option<&[Vec<String>]> {
        self.ground_truths.as_deref()
    }

    /// Get a subset of rows (for quick testing).
    pub fn take(&self, n: usize) -> Self {
        Self {
            questions: self.questions.iter().take(n).cloned().collect(),
            answers: self.answers.iter().take(n).cloned().collect(),
            contexts: self.contexts.iter().take(n).cloned().collect(),
            ground_truths: self
                .ground_truths
                .as_ref()
                .map(|gts| gts.iter().take(n).cloned().collect()),
        }
    }

    /// Load from a JSON file holding an array of [`RagRecord`]s.
    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagEvalError::DatasetNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;
        let records: Vec<RagRecord> = serde_json::from_str(&content)
            .map_err(|e| RagEvalError::Serialization(format!("Failed to parse dataset: {}", e)))?;
        Self::from_records(records)
    }
}

/// Create a small annotated dataset for smoke runs.
pub fn create_sample_dataset() -> EvaluationDataset {
    let records = vec![
        RagRecord {
            question: "What mechanism does Rust use to achieve memory safety?".to_string(),
            answer: "Rust uses an ownership system and borrow checker to achieve memory safety without garbage collection.".to_string(),
            contexts: vec![
                "Rust is a systems programming language focused on safety, speed, and concurrency. It achieves memory safety without garbage collection through its ownership system.".to_string(),
                "The borrow checker ensures references are valid and prevents data races at compile time.".to_string(),
            ],
            ground_truths: Some(vec![
                "Rust achieves memory safety through its ownership system and borrow checker.".to_string(),
            ]),
        },
        RagRecord {
            question: "Who created Python and when was it first released?".to_string(),
            answer: "Python was created by Guido van Rossum and first released in 1991.".to_string(),
            contexts: vec![
                "Python is a high-level, interpreted programming language known for its clear syntax. Created by Guido van Rossum, Python was first released in 1991.".to_string(),
            ],
            ground_truths: Some(vec![
                "Guido van Rossum created Python.".to_string(),
                "Python was first released in 1991.".to_string(),
            ]),
        },
        RagRecord {
            question: "What is the difference between supervised and unsupervised learning?".to_string(),
            answer: "Supervised learning uses labeled data to train models, while unsupervised learning finds patterns in unlabeled data.".to_string(),
            contexts: vec![
                "Supervised learning uses labeled data to train models, while unsupervised learning finds patterns in unlabeled data.".to_string(),
                "Neural networks are computing systems inspired by biological neural networks in animal brains.".to_string(),
            ],
            ground_truths: Some(vec![
                "Supervised learning trains on labeled data; unsupervised learning finds patterns in unlabeled data.".to_string(),
            ]),
        },
    ];

    // The sample rows are well-formed by construction.
    EvaluationDataset::from_records(records).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_columns_validates_lengths() {
        let result = EvaluationDataset::from_columns(
            vec!["q1".to_string(), "q2".to_string()],
            vec!["a1".to_string()],
            vec![vec![], vec![]],
            None,
        );
        assert!(matches!(
            result,
            Err(RagEvalError::ColumnMismatch {
                column: "answer",
                expected: 2,
                actual: 1,
            })
        ));
    }

    #[test]
    fn test_from_records_rejects_partial_ground_truths() {
        let records = vec![
            RagRecord {
                question: "q1".to_string(),
                answer: "a1".to_string(),
                contexts: vec![],
                ground_truths: Some(vec!["gt1".to_string()]),
            },
            RagRecord {
                question: "q2".to_string(),
                answer: "a2".to_string(),
                contexts: vec![],
                ground_truths: None,
            },
        ];
        assert!(EvaluationDataset::from_records(records).is_err());
    }

    #[test]
    fn test_take() {
        let dataset = create_sample_dataset();
        assert_eq!(dataset.len(), 3);

        let subset = dataset.take(2);
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.ground_truths().unwrap().len(), 2);
    }

    #[test]
    fn test_sample_dataset() {
        let dataset = create_sample_dataset();
        assert!(!dataset.is_empty());
        assert!(dataset.ground_truths().is_some());

        for contexts in dataset.contexts() {
            assert!(!contexts.is_empty());
        }
    }

    #[test]
    fn test_load_json_roundtrip() {
        use std::io::Write;

        let records = vec![RagRecord {
            question: "q".to_string(),
            answer: "a".to_string(),
            contexts: vec!["c".to_string()],
            ground_truths: None,
        }];
        let json = serde_json::to_string(&records).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let dataset = EvaluationDataset::load_json(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.questions()[0], "q");
        assert!(dataset.ground_truths().is_none());
    }

    #[test]
    fn test_load_json_missing_file() {
        let result = EvaluationDataset::load_json(Path::new("/nonexistent/dataset.json"));
        assert!(matches!(result, Err(RagEvalError::DatasetNotFound(_))));
    }
}
