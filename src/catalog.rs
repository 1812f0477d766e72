//! Harbor and trivia content sources.
//!
//! A catalog file is TOML with one `[[harbor]]` table per harbor and one
//! `[[question]]` table per trivia question:
//!
//! ```toml
//! [[harbor]]
//! id = "helsinki"
//! name = "Helsinki South Harbour"
//! position = { latitude = 60.1675, longitude = 24.9525 }
//! difficulty = "easy"
//! clues = [{ text = "Capital of Finland" }]
//!
//! [[question]]
//! id = "q-ferry"
//! prompt = "Which city has the most ferry departures to Helsinki?"
//! answers = [
//!     { id = "tallinn", text = "Tallinn", correct = true },
//!     { id = "stockholm", text = "Stockholm" },
//! ]
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use satama_core::{Difficulty, Harbor, TriviaQuestion};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

use crate::error::CatalogError;

/// Source of harbors for location rounds.
pub trait HarborCatalog {
    /// Harbors in catalog order, restricted to `difficulty` when given.
    fn fetch_harbors(&self, difficulty: Option<Difficulty>) -> Result<Vec<Harbor>, CatalogError>;
}

/// Source of questions for trivia rounds.
pub trait TriviaCatalog {
    /// Questions in catalog order, restricted to `difficulty` when given.
    fn fetch_questions(
        &self,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<TriviaQuestion>, CatalogError>;
}

/// Catalog content held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryCatalog {
    #[serde(default, rename = "harbor")]
    harbors: Vec<Harbor>,
    #[serde(default, rename = "question")]
    questions: Vec<TriviaQuestion>,
}

impl MemoryCatalog {
    /// Creates a validated catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for duplicate ids or malformed questions.
    #[instrument(skip_all, fields(harbors = harbors.len(), questions = questions.len()))]
    pub fn new(harbors: Vec<Harbor>, questions: Vec<TriviaQuestion>) -> Result<Self, CatalogError> {
        let catalog = Self { harbors, questions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses and validates catalog TOML.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for malformed TOML, out-of-range coordinates,
    /// duplicate ids or questions without exactly one correct answer.
    #[instrument(skip(content), fields(bytes = content.len()))]
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(content)
            .map_err(|e| CatalogError::new(format!("Failed to parse catalog: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut harbor_ids = HashSet::new();
        for harbor in &self.harbors {
            if !harbor_ids.insert(harbor.id().as_str()) {
                warn!(harbor_id = %harbor.id(), "Duplicate harbor id");
                return Err(CatalogError::new(format!("Duplicate harbor id {}", harbor.id())));
            }
        }

        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if !question_ids.insert(question.id().as_str()) {
                warn!(question_id = %question.id(), "Duplicate question id");
                return Err(CatalogError::new(format!(
                    "Duplicate question id {}",
                    question.id()
                )));
            }
            question.validate()?;
        }

        debug!(
            harbors = self.harbors.len(),
            questions = self.questions.len(),
            "Catalog validated"
        );
        Ok(())
    }

    /// All harbors.
    pub fn harbors(&self) -> &[Harbor] {
        &self.harbors
    }

    /// All questions.
    pub fn questions(&self) -> &[TriviaQuestion] {
        &self.questions
    }

    /// Harbor and question counts for every difficulty.
    pub fn counts(&self) -> Vec<(Difficulty, usize, usize)> {
        Difficulty::iter()
            .map(|d| {
                let harbors = self.harbors.iter().filter(|h| *h.difficulty() == d).count();
                let questions = self.questions.iter().filter(|q| *q.difficulty() == d).count();
                (d, harbors, questions)
            })
            .collect()
    }
}

impl HarborCatalog for MemoryCatalog {
    #[instrument(skip(self))]
    fn fetch_harbors(&self, difficulty: Option<Difficulty>) -> Result<Vec<Harbor>, CatalogError> {
        let harbors: Vec<Harbor> = self
            .harbors
            .iter()
            .filter(|h| difficulty.is_none_or(|d| *h.difficulty() == d))
            .cloned()
            .collect();
        debug!(count = harbors.len(), "Harbors fetched");
        Ok(harbors)
    }
}

impl TriviaCatalog for MemoryCatalog {
    #[instrument(skip(self))]
    fn fetch_questions(
        &self,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<TriviaQuestion>, CatalogError> {
        let questions: Vec<TriviaQuestion> = self
            .questions
            .iter()
            .filter(|q| difficulty.is_none_or(|d| *q.difficulty() == d))
            .cloned()
            .collect();
        debug!(count = questions.len(), "Questions fetched");
        Ok(questions)
    }
}

/// Catalog loaded from a TOML file.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
    content: MemoryCatalog,
}

impl FileCatalog {
    /// Reads and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the file cannot be read or its content
    /// is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        debug!("Loading catalog file");
        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::new(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let content = MemoryCatalog::from_toml(&content)?;
        info!(
            harbors = content.harbors().len(),
            questions = content.questions().len(),
            "Catalog loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Path the catalog was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed catalog content.
    pub fn content(&self) -> &MemoryCatalog {
        &self.content
    }
}

impl HarborCatalog for FileCatalog {
    fn fetch_harbors(&self, difficulty: Option<Difficulty>) -> Result<Vec<Harbor>, CatalogError> {
        self.content.fetch_harbors(difficulty)
    }
}

impl TriviaCatalog for FileCatalog {
    fn fetch_questions(
        &self,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<TriviaQuestion>, CatalogError> {
        self.content.fetch_questions(difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[harbor]]
id = "helsinki"
name = "Helsinki South Harbour"
position = { latitude = 60.1675, longitude = 24.9525 }
difficulty = "easy"
clues = [{ text = "Capital of Finland" }, { image = "img/helsinki.jpg" }]

[[harbor]]
id = "kotka"
name = "Port of HaminaKotka"
position = { latitude = 60.4667, longitude = 26.9458 }
difficulty = "hard"

[[question]]
id = "q-ferry"
prompt = "Which city has the most ferry departures to Helsinki?"
difficulty = "easy"
answers = [
    { id = "tallinn", text = "Tallinn", correct = true },
    { id = "stockholm", text = "Stockholm" },
]
"#;

    #[test]
    fn parses_and_filters_by_difficulty() {
        let catalog = MemoryCatalog::from_toml(CATALOG).unwrap();
        assert_eq!(catalog.harbors().len(), 2);
        assert_eq!(catalog.harbors()[0].clues().len(), 2);

        let easy = catalog.fetch_harbors(Some(Difficulty::Easy)).unwrap();
        assert_eq!(easy.len(), 1);
        assert_eq!(easy[0].id().as_str(), "helsinki");
        assert!(catalog.fetch_questions(Some(Difficulty::Hard)).unwrap().is_empty());
        assert_eq!(catalog.fetch_harbors(None).unwrap().len(), 2);
    }

    #[test]
    fn harbor_difficulty_defaults_to_medium() {
        let toml = r#"
[[harbor]]
id = "turku"
name = "Port of Turku"
position = { latitude = 60.4351, longitude = 22.2206 }
"#;
        let catalog = MemoryCatalog::from_toml(toml).unwrap();
        assert_eq!(*catalog.harbors()[0].difficulty(), Difficulty::Medium);
        assert!(catalog.questions().is_empty());
    }

    #[test]
    fn rejects_out_of_range_position() {
        let toml = r#"
[[harbor]]
id = "nowhere"
name = "Nowhere"
position = { latitude = 91.0, longitude = 0.0 }
"#;
        assert!(MemoryCatalog::from_toml(toml).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let doubled = format!("{CATALOG}\n{}", &CATALOG[CATALOG.find("[[question]]").unwrap()..]);
        let err = MemoryCatalog::from_toml(&doubled).unwrap_err();
        assert!(err.message.contains("Duplicate question id"));
    }

    #[test]
    fn rejects_question_without_correct_answer() {
        let toml = r#"
[[question]]
id = "q-none"
prompt = "Pick one"
answers = [{ id = "a", text = "A" }, { id = "b", text = "B" }]
"#;
        assert!(MemoryCatalog::from_toml(toml).is_err());
    }

    #[test]
    fn counts_cover_every_difficulty() {
        let catalog = MemoryCatalog::from_toml(CATALOG).unwrap();
        assert_eq!(
            catalog.counts(),
            vec![
                (Difficulty::Easy, 1, 1),
                (Difficulty::Medium, 0, 0),
                (Difficulty::Hard, 1, 0),
            ]
        );
    }
}
