//! Language frequency profiles.
//!
//! A profile holds the character, bigram and trigram frequencies of a sample
//! text in some language. It provides the reference coincidence index and
//! the plain alphabet for an analysis.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::frequency::{FrequencyRow, FrequencyTable, NgramCounter};
use crate::config::FilterConfig;
use crate::error::Result;
use crate::text::alphabet::{Alphabet, IgnoreSet};
use crate::text::collation::{CharKey, Collator};
use crate::text::locale::Locale;
use crate::text::tokenize::{tokenize, user_character_key};

/// Rules for extracting a profile from a sample text.
///
/// Every entry must be a single user character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphabetRules {
    /// Language of the sample; the caller's locale is used when absent.
    pub locale: Option<Locale>,
    /// Characters always listed, even with zero occurrences.
    pub include: Vec<String>,
    /// Characters never counted.
    pub ignore: Vec<String>,
    /// When non-empty, only these characters are counted.
    pub include_exclusively: Vec<String>,
    /// Characters rewritten before counting (e.g. `"É" → "E"`).
    pub replace: BTreeMap<String, String>,
}

impl AlphabetRules {
    /// Parses rules from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads rules from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn keys(chars: &[String], collator: &Collator) -> Result<Vec<CharKey>> {
        chars
            .iter()
            .map(|c| user_character_key(c, collator))
            .collect()
    }

    fn replacements(&self, collator: &Collator) -> Result<HashMap<CharKey, CharKey>> {
        self.replace
            .iter()
            .map(|(from, to)| {
                Ok((
                    user_character_key(from, collator)?,
                    user_character_key(to, collator)?,
                ))
            })
            .collect()
    }
}

/// Character, bigram and trigram frequencies of a language.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    collator: Collator,
    characters: FrequencyTable,
    bigrams: FrequencyTable,
    trigrams: FrequencyTable,
}

impl LanguageProfile {
    /// Extracts a profile from a sample text.
    ///
    /// Replacements are applied first. Then, if `include_exclusively` is set,
    /// only those characters are counted; otherwise every character that is
    /// not ignored (by the rules or by `filter`) is. N-grams are broken by
    /// characters that are not counted.
    pub fn extract(
        sample: &str,
        rules: &AlphabetRules,
        collator: &Collator,
        filter: &FilterConfig,
    ) -> Result<Self> {
        let replace = rules.replacements(collator)?;
        let exclusive = Alphabet::from_iter(AlphabetRules::keys(&rules.include_exclusively, collator)?);
        let included = Alphabet::from_iter(AlphabetRules::keys(&rules.include, collator)?);
        let ignored: IgnoreSet = AlphabetRules::keys(&rules.ignore, collator)?
            .into_iter()
            .collect();

        let seed = if exclusive.is_empty() {
            FrequencyTable::seeded(&included)
        } else {
            FrequencyTable::seeded(&exclusive)
        };
        let mut counter = NgramCounter::new(collator, seed);

        for c in tokenize(sample, collator) {
            let c = replace.get(&c).cloned().unwrap_or(c);
            let counted = if exclusive.is_empty() {
                !ignored.contains(&c) && filter.accepts(&c)
            } else {
                exclusive.contains(&c)
            };
            if counted {
                counter.accept(&c);
            } else {
                counter.reject();
            }
        }

        let (characters, bigrams, trigrams) = counter.finish();
        info!(
            locale = %collator.locale(),
            characters = characters.len(),
            occurrences = characters.total(),
            "extracted language profile"
        );

        Ok(Self {
            collator: collator.clone(),
            characters,
            bigrams,
            trigrams,
        })
    }

    /// Returns the locale of the profile.
    pub fn locale(&self) -> &Locale {
        self.collator.locale()
    }

    /// Returns the collator the tables were keyed with.
    pub fn collator(&self) -> &Collator {
        &self.collator
    }

    pub fn characters(&self) -> &FrequencyTable {
        &self.characters
    }

    pub fn bigrams(&self) -> &FrequencyTable {
        &self.bigrams
    }

    pub fn trigrams(&self) -> &FrequencyTable {
        &self.trigrams
    }

    /// Coincidence index of the language, from its character frequencies.
    pub fn coincidence_index(&self) -> Option<f64> {
        self.characters.coincidence_index()
    }

    /// The characters of the language, used as the plain alphabet.
    pub fn alphabet(&self) -> Alphabet {
        self.characters.iter().map(|e| e.key().clone()).collect()
    }

    /// Converts the profile to its serializable form.
    pub fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            locale: self.locale().clone(),
            characters: self.characters.rows(),
            bigrams: self.bigrams.rows(),
            trigrams: self.trigrams.rows(),
        }
    }

    /// Rebuilds a profile, keying the rows with the record's locale.
    pub fn from_record(record: &ProfileRecord) -> Self {
        let collator = Collator::for_locale(record.locale.clone());
        debug!(locale = %record.locale, rows = record.characters.len(), "loaded language profile");
        Self {
            characters: FrequencyTable::from_rows(&record.characters, &collator),
            bigrams: FrequencyTable::from_rows(&record.bigrams, &collator),
            trigrams: FrequencyTable::from_rows(&record.trigrams, &collator),
            collator,
        }
    }

    /// Serializes the profile as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    /// Parses a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: ProfileRecord = serde_json::from_str(json)?;
        Ok(Self::from_record(&record))
    }

    /// Loads a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Writes the profile to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Serializable form of a [`LanguageProfile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Language of the sample.
    pub locale: Locale,
    /// Character counts.
    pub characters: Vec<FrequencyRow>,
    /// Bigram counts.
    #[serde(default)]
    pub bigrams: Vec<FrequencyRow>,
    /// Trigram counts.
    #[serde(default)]
    pub trigrams: Vec<FrequencyRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn extract(sample: &str, rules: &AlphabetRules) -> LanguageProfile {
        LanguageProfile::extract(sample, rules, &Collator::default(), &FilterConfig::default())
            .unwrap()
    }

    fn counts(table: &FrequencyTable) -> Vec<(String, u64)> {
        table
            .iter()
            .map(|e| (e.as_str().to_string(), e.count()))
            .collect()
    }

    #[test]
    fn test_extract_with_ignore_and_include() {
        let rules = AlphabetRules {
            include: vec!["z".into()],
            ignore: vec![",".into()],
            ..Default::default()
        };
        let profile = extract("ab, ba", &rules);

        assert_eq!(
            counts(profile.characters()),
            vec![("a".into(), 2), ("b".into(), 2), ("z".into(), 0)]
        );
        assert_eq!(counts(profile.bigrams()), vec![("ab".into(), 1), ("ba".into(), 1)]);
        assert!(profile.trigrams().is_empty());
    }

    #[test]
    fn test_extract_exclusively() {
        let rules = AlphabetRules {
            include_exclusively: vec!["a".into(), "c".into()],
            ..Default::default()
        };
        let profile = extract("aXa c", &rules);
        assert_eq!(
            counts(profile.characters()),
            vec![("a".into(), 2), ("c".into(), 1)]
        );
        assert!(profile.bigrams().is_empty());
    }

    #[test]
    fn test_replace_before_counting() {
        let mut replace = BTreeMap::new();
        replace.insert("é".to_string(), "e".to_string());
        let rules = AlphabetRules {
            replace,
            ..Default::default()
        };
        let profile = extract("ée", &rules);
        assert_eq!(counts(profile.characters()), vec![("e".into(), 2)]);
        assert_eq!(counts(profile.bigrams()), vec![("ee".into(), 1)]);
    }

    #[test]
    fn test_invalid_rule_character() {
        let rules = AlphabetRules {
            ignore: vec!["ab".into()],
            ..Default::default()
        };
        let result =
            LanguageProfile::extract("x", &rules, &Collator::default(), &FilterConfig::default());
        assert!(matches!(result, Err(AnalysisError::NotUserCharacter(_))));
    }

    #[test]
    fn test_coincidence_index_and_alphabet() {
        let profile = extract("aabb", &AlphabetRules::default());
        let ci = profile.coincidence_index().unwrap();
        assert!((ci - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(profile.alphabet().to_strings(), vec!["a", "b"]);
    }

    #[test]
    fn test_json_round_trip() {
        let profile = extract("hello world", &AlphabetRules::default());
        let json = profile.to_json().unwrap();
        let loaded = LanguageProfile::from_json(&json).unwrap();

        assert_eq!(loaded.locale(), profile.locale());
        assert_eq!(loaded.characters(), profile.characters());
        assert_eq!(loaded.bigrams(), profile.bigrams());
        assert_eq!(loaded.coincidence_index(), profile.coincidence_index());
    }

    #[test]
    fn test_rules_from_json() {
        let rules = AlphabetRules::from_json(
            r#"{ "locale": "es", "ignore": [" "], "replace": { "Á": "A" } }"#,
        )
        .unwrap();
        assert_eq!(rules.locale.map(|l| l.to_string()), Some("es".to_string()));
        assert_eq!(rules.ignore, vec![" "]);
        assert!(rules.include.is_empty());
    }
}
