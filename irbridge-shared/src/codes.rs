use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{self, TOLERANCE};
use crate::error::CodeBookError;
use crate::protocol::MAX_SAMPLES;

/// Code book shipped with the tool.
pub const DEFAULT_CODE_BOOK: &str = include_str!("../codes/default.json");

/// A named reference signal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub name: String,
    /// Pulse durations in microseconds
    pub samples: Vec<u16>,
}

impl Code {
    pub fn new(name: impl Into<String>, samples: Vec<u16>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct CodeBookFile {
    #[serde(default = "default_tolerance")]
    tolerance: u16,
    codes: Vec<Code>,
    #[serde(default)]
    translations: Vec<TranslationEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
struct TranslationEntry {
    from: String,
    to: String,
}

fn default_tolerance() -> u16 {
    TOLERANCE
}

/// Known codes, their names and the translation rules between them.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct CodeBook {
    codes: Vec<Code>,
    translations: BTreeMap<usize, usize>,
    tolerance: u16,
}

impl CodeBook {
    /// Build a code book from codes in table order and `(from, to)` index
    /// pairs.
    pub fn new<T>(codes: Vec<Code>, translations: T) -> Result<Self, CodeBookError>
    where
        T: IntoIterator<Item = (usize, usize)>,
    {
        let mut names = HashSet::new();

        for code in &codes {
            if !names.insert(code.name.as_str()) {
                return Err(CodeBookError::DuplicateName(code.name.clone()));
            }
            if code.samples.is_empty() {
                return Err(CodeBookError::EmptyCode(code.name.clone()));
            }
            if code.samples.len() > MAX_SAMPLES {
                return Err(CodeBookError::TooLong {
                    name: code.name.clone(),
                    count: code.samples.len(),
                    max: MAX_SAMPLES,
                });
            }
        }

        let translations: BTreeMap<usize, usize> = translations.into_iter().collect();

        for (&from, &to) in &translations {
            for index in [from, to] {
                if index >= codes.len() {
                    return Err(CodeBookError::UnknownCode(format!("#{}", index)));
                }
            }
        }

        Ok(Self {
            codes,
            translations,
            tolerance: TOLERANCE,
        })
    }

    pub fn with_tolerance(mut self, tolerance: u16) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Parse a JSON code book. Translations name their codes.
    pub fn from_json(s: &str) -> Result<Self, CodeBookError> {
        let file: CodeBookFile = serde_json::from_str(s)?;

        let find = |name: &str| {
            file.codes
                .iter()
                .position(|code| code.name == name)
                .ok_or_else(|| CodeBookError::UnknownCode(name.to_string()))
        };

        let translations = file
            .translations
            .iter()
            .map(|entry| Ok((find(&entry.from)?, find(&entry.to)?)))
            .collect::<Result<Vec<_>, CodeBookError>>()?;

        Ok(Self::new(file.codes, translations)?.with_tolerance(file.tolerance))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CodeBookError> {
        let s = fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    pub fn classify(&self, samples: &[u16]) -> Option<usize> {
        classifier::classify(&self.codes, samples, self.tolerance)
    }

    pub fn get(&self, index: usize) -> Option<&Code> {
        self.codes.get(index)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.get(index).map(|code| code.name.as_str())
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.codes.iter().position(|code| code.name == name)
    }

    /// Code to send when `index` is received, if any.
    pub fn translation(&self, index: usize) -> Option<usize> {
        self.translations.get(&index).copied()
    }

    pub fn translations(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.translations.iter().map(|(&from, &to)| (from, to))
    }

    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    pub fn tolerance(&self) -> u16 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn small() -> CodeBook {
        CodeBook::new(
            vec![
                Code::new("on", vec![100, 200, 300]),
                Code::new("off", vec![300, 200, 100]),
                Code::new("other", vec![1000, 1000]),
            ],
            [(0, 2)],
        )
        .unwrap()
    }

    #[test]
    fn lookups() {
        let book = small();
        assert_eq!(book.len(), 3);
        assert_eq!(book.find("off"), Some(1));
        assert_eq!(book.find("missing"), None);
        assert_eq!(book.name(2), Some("other"));
        assert_eq!(book.name(3), None);
        assert_eq!(book.translation(0), Some(2));
        assert_eq!(book.translation(1), None);
        assert_eq!(book.translations().collect::<Vec<_>>(), vec![(0, 2)]);
        assert_eq!(book.tolerance(), TOLERANCE);
    }

    #[test]
    fn classify_uses_book_tolerance() {
        let book = small();
        assert_eq!(book.classify(&[150, 250, 350]), Some(0));

        let strict = small().with_tolerance(10);
        assert_eq!(strict.classify(&[150, 250, 350]), None);
        assert_eq!(strict.classify(&[305, 195, 110]), Some(1));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = CodeBook::new(
            vec![Code::new("x", vec![1]), Code::new("x", vec![2])],
            [],
        )
        .unwrap_err();
        assert!(matches!(err, CodeBookError::DuplicateName(name) if name == "x"));
    }

    #[test]
    fn empty_code_is_rejected() {
        let err = CodeBook::new(vec![Code::new("x", vec![])], []).unwrap_err();
        assert!(matches!(err, CodeBookError::EmptyCode(_)));
    }

    #[test]
    fn oversized_code_is_rejected() {
        let err =
            CodeBook::new(vec![Code::new("x", vec![500; MAX_SAMPLES + 1])], []).unwrap_err();
        assert!(matches!(err, CodeBookError::TooLong { .. }));
    }

    #[test]
    fn translation_out_of_range_is_rejected() {
        let err = CodeBook::new(vec![Code::new("x", vec![1])], [(0, 1)]).unwrap_err();
        assert!(matches!(err, CodeBookError::UnknownCode(_)));
    }

    #[test]
    fn json_translations_by_name() {
        let book = CodeBook::from_json(
            r#"{
                "codes": [
                    { "name": "a", "samples": [1, 2] },
                    { "name": "b", "samples": [3, 4] }
                ],
                "translations": [ { "from": "b", "to": "a" } ]
            }"#,
        )
        .unwrap();

        assert_eq!(book.translation(1), Some(0));
        assert_eq!(book.translation(0), None);
        assert_eq!(book.tolerance(), TOLERANCE);
    }

    #[test]
    fn json_tolerance_override() {
        let book = CodeBook::from_json(
            r#"{ "tolerance": 40, "codes": [ { "name": "a", "samples": [500] } ] }"#,
        )
        .unwrap();
        assert_eq!(book.tolerance(), 40);
        assert_eq!(book.classify(&[540]), Some(0));
        assert_eq!(book.classify(&[541]), None);
    }

    #[test]
    fn json_unknown_translation_name() {
        let err = CodeBook::from_json(
            r#"{
                "codes": [ { "name": "a", "samples": [1] } ],
                "translations": [ { "from": "a", "to": "nope" } ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodeBookError::UnknownCode(name) if name == "nope"));
    }

    #[test]
    fn json_syntax_error() {
        let err = CodeBook::from_json("{ \"codes\": [").unwrap_err();
        assert!(matches!(err, CodeBookError::Json(_)));
    }

    #[test]
    fn default_book() {
        let book = CodeBook::from_json(DEFAULT_CODE_BOOK).unwrap();
        assert_eq!(book.len(), 10);
        assert_eq!(book.name(0), Some("A ON"));
        assert_eq!(book.name(9), Some("3 OFF"));
        assert_eq!(book.translation(0), Some(6));
        assert_eq!(book.translation(1), Some(7));
        assert_eq!(book.translations().count(), 2);

        for (index, code) in book.codes().iter().enumerate() {
            assert_eq!(book.classify(&code.samples), Some(index), "{}", code.name);
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "codes": [ {{ "name": "only", "samples": [10, 20] }} ] }}"#
        )
        .unwrap();

        let book = CodeBook::load(file.path()).unwrap();
        assert_eq!(book.find("only"), Some(0));
    }

    #[test]
    fn load_missing_file() {
        let err = CodeBook::load("/nonexistent/irbridge-codes.json").unwrap_err();
        assert!(matches!(err, CodeBookError::Io(_)));
    }
}
