use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::fmt;

use crate::config::ConfigError;

static CORPUS_DIR: Dir = include_dir!("src/corpora");

/// A four-character target phrase. Identity is the character sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Idiom {
    chars: [char; Idiom::LEN],
}

impl Idiom {
    pub const LEN: usize = 4;

    pub fn new(chars: [char; Idiom::LEN]) -> Self {
        Self { chars }
    }

    /// Parse one corpus-file entry: four single-character strings.
    pub fn from_parts(parts: &[String; Idiom::LEN]) -> Result<Self, ConfigError> {
        let mut chars = ['\0'; Idiom::LEN];
        for (slot, part) in chars.iter_mut().zip(parts) {
            let mut it = part.chars();
            match (it.next(), it.next()) {
                (Some(c), None) => *slot = c,
                _ => return Err(ConfigError::MalformedIdiom(parts.concat())),
            }
        }
        Ok(Self { chars })
    }

    pub fn char_at(&self, i: usize) -> char {
        self.chars[i]
    }

    pub fn chars(&self) -> &[char; Idiom::LEN] {
        &self.chars
    }
}

impl fmt::Display for Idiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// On-disk shape of an embedded corpus file.
#[allow(dead_code)]
#[derive(Deserialize, Debug)]
struct CorpusFile {
    name: String,
    size: u32,
    idioms: Vec<[String; Idiom::LEN]>,
    fillers: String,
}

/// An immutable idiom collection plus the filler alphabet used to pad the
/// grid positions the target does not occupy.
#[derive(Clone, Debug)]
pub struct Corpus {
    pub name: String,
    idioms: Vec<Idiom>,
    fillers: Vec<char>,
}

impl Corpus {
    /// Fails fast on an empty idiom list or empty filler alphabet; a session
    /// is never created over an unusable corpus.
    pub fn new(name: String, idioms: Vec<Idiom>, fillers: Vec<char>) -> Result<Self, ConfigError> {
        if idioms.is_empty() {
            return Err(ConfigError::EmptyCorpus);
        }
        if fillers.is_empty() {
            return Err(ConfigError::EmptyFillers);
        }
        Ok(Self {
            name,
            idioms,
            fillers,
        })
    }

    /// Load a built-in corpus embedded at compile time.
    pub fn load(file_name: &str) -> Result<Self, ConfigError> {
        let file = CORPUS_DIR
            .get_file(format!("{file_name}.json"))
            .ok_or_else(|| ConfigError::UnknownCorpus(file_name.to_string()))?;

        let file_as_str = file
            .contents_utf8()
            .expect("Unable to interpret corpus file as a string");

        let parsed: CorpusFile = from_str(file_as_str).expect("Unable to deserialize corpus json");

        let idioms = parsed
            .idioms
            .iter()
            .map(Idiom::from_parts)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(parsed.name, idioms, parsed.fillers.chars().collect())
    }

    pub fn idioms(&self) -> &[Idiom] {
        &self.idioms
    }

    pub fn fillers(&self) -> &[char] {
        &self.fillers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idiom_displays_as_joined_characters() {
        let idiom = Idiom::new(['畫', '蛇', '添', '足']);
        assert_eq!(idiom.to_string(), "畫蛇添足");
        assert_eq!(idiom.char_at(2), '添');
    }

    #[test]
    fn idiom_from_parts_accepts_single_characters() {
        let parts = [
            "守".to_string(),
            "株".to_string(),
            "待".to_string(),
            "兔".to_string(),
        ];
        let idiom = Idiom::from_parts(&parts).unwrap();
        assert_eq!(idiom.to_string(), "守株待兔");
    }

    #[test]
    fn idiom_from_parts_rejects_multi_char_entries() {
        let parts = [
            "守株".to_string(),
            "待".to_string(),
            "兔".to_string(),
            "也".to_string(),
        ];
        assert!(matches!(
            Idiom::from_parts(&parts),
            Err(ConfigError::MalformedIdiom(_))
        ));
    }

    #[test]
    fn idiom_from_parts_rejects_empty_entries() {
        let parts = [
            "".to_string(),
            "待".to_string(),
            "兔".to_string(),
            "也".to_string(),
        ];
        assert!(matches!(
            Idiom::from_parts(&parts),
            Err(ConfigError::MalformedIdiom(_))
        ));
    }

    #[test]
    fn load_classic_corpus() {
        let corpus = Corpus::load("classic").unwrap();

        assert_eq!(corpus.name, "classic");
        assert_eq!(corpus.idioms().len(), 40);
        assert!(!corpus.fillers().is_empty());
        assert!(corpus
            .idioms()
            .iter()
            .any(|i| i.to_string() == "畫蛇添足"));
    }

    #[test]
    fn load_extended_corpus() {
        let corpus = Corpus::load("extended").unwrap();

        assert_eq!(corpus.name, "extended");
        assert!(!corpus.idioms().is_empty());
        assert!(!corpus.fillers().is_empty());
    }

    #[test]
    fn load_unknown_corpus_is_a_config_error() {
        assert_eq!(
            Corpus::load("nonexistent").unwrap_err(),
            ConfigError::UnknownCorpus("nonexistent".to_string())
        );
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let result = Corpus::new("empty".into(), vec![], vec!['X']);
        assert_eq!(result.unwrap_err(), ConfigError::EmptyCorpus);
    }

    #[test]
    fn empty_filler_alphabet_is_rejected() {
        let idioms = vec![Idiom::new(['一', '帆', '風', '順'])];
        let result = Corpus::new("no-fillers".into(), idioms, vec![]);
        assert_eq!(result.unwrap_err(), ConfigError::EmptyFillers);
    }

    #[test]
    fn corpus_file_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 1,
            "idioms": [["一", "石", "二", "鳥"]],
            "fillers": "天地"
        }
        "#;

        let parsed: CorpusFile = from_str(json_data).expect("Failed to deserialize test corpus");

        assert_eq!(parsed.name, "test");
        assert_eq!(parsed.size, 1);
        assert_eq!(parsed.idioms.len(), 1);
        assert_eq!(parsed.fillers, "天地");
    }
}
