use serde::{Deserialize, Serialize};
use uip_types::Citizenship;

/// Closed set of jurisdictions the rule chain knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Jurisdiction {
    India,
    UnitedStates,
    Unrecognized,
}

impl Jurisdiction {
    /// ISO country code, if recognized.
    pub fn country_code(&self) -> Option<&'static str> {
        match self {
            Jurisdiction::India => Some("IN"),
            Jurisdiction::UnitedStates => Some("US"),
            Jurisdiction::Unrecognized => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Jurisdiction::India => "India",
            Jurisdiction::UnitedStates => "US",
            Jurisdiction::Unrecognized => "unrecognized jurisdiction",
        }
    }

    /// Citizenship that counts as domestic here.
    pub fn domestic_citizenship(&self) -> Option<Citizenship> {
        match self {
            Jurisdiction::India => Some(Citizenship::In),
            Jurisdiction::UnitedStates => Some(Citizenship::Us),
            Jurisdiction::Unrecognized => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Jurisdiction::Unrecognized)
    }
}

/// Derives a jurisdiction from a free-text location.
pub trait JurisdictionClassifier: Send + Sync {
    fn classify(&self, location: &str) -> Jurisdiction;
}

/// Keyword matcher over the lower-cased location.
///
/// Phrases match as substrings; tokens must match a whole word, so "us"
/// does not fire on "house" or "campus".
#[derive(Clone, Debug)]
pub struct KeywordJurisdictionClassifier {
    entries: Vec<KeywordEntry>,
}

#[derive(Clone, Debug)]
struct KeywordEntry {
    jurisdiction: Jurisdiction,
    phrases: Vec<String>,
    tokens: Vec<String>,
}

impl KeywordJurisdictionClassifier {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register keywords for a jurisdiction. Earlier registrations win.
    pub fn with_keywords(
        mut self,
        jurisdiction: Jurisdiction,
        phrases: &[&str],
        tokens: &[&str],
    ) -> Self {
        self.entries.push(KeywordEntry {
            jurisdiction,
            phrases: phrases.iter().map(|p| p.to_lowercase()).collect(),
            tokens: tokens.iter().map(|t| t.to_lowercase()).collect(),
        });
        self
    }
}

impl Default for KeywordJurisdictionClassifier {
    fn default() -> Self {
        Self::empty()
            .with_keywords(
                Jurisdiction::India,
                &["india", "vizag", "visakhapatnam", "andhra"],
                &[],
            )
            .with_keywords(
                Jurisdiction::UnitedStates,
                &["united states", "austin", "texas"],
                &["us", "usa"],
            )
    }
}

impl JurisdictionClassifier for KeywordJurisdictionClassifier {
    fn classify(&self, location: &str) -> Jurisdiction {
        let lowered = location.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        self.entries
            .iter()
            .find(|entry| {
                entry.phrases.iter().any(|p| lowered.contains(p.as_str()))
                    || entry.tokens.iter().any(|t| words.contains(&t.as_str()))
            })
            .map(|entry| entry.jurisdiction)
            .unwrap_or(Jurisdiction::Unrecognized)
    }
}
