//! Corporate Context
//!
//! Secondary seed data derived from an organization name: abbreviations, a
//! coarse industry tag and an estimated founding year. Industry detection and
//! the founding year are heuristics; the only guarantee is determinism for a
//! given name and seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use crate::variation::VariationGenerator;

/// Founding years of a handful of well-known organizations.
const KNOWN_FOUNDING_YEARS: &[(&str, i32)] = &[
    ("microsoft", 1975),
    ("apple", 1976),
    ("google", 1998),
    ("facebook", 2004),
    ("amazon", 1994),
    ("tesla", 2003),
];

/// Names up to this many characters are assumed to be older.
const SHORT_NAME_LEN: usize = 6;

/// Industry classification, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Industry {
    Technology,
    Finance,
    Healthcare,
    Education,
    Government,
    General,
}

impl Industry {
    /// Classify a lowercase name by keyword. The first matching industry in
    /// priority order wins.
    pub fn detect(name: &str) -> Self {
        let name = name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));
        let has_word = |word: &str| name.split(|c: char| !c.is_alphanumeric()).any(|w| w == word);

        if has(&["tech", "soft"]) || has_word("it") {
            Industry::Technology
        } else if has(&["bank", "finance", "credit"]) {
            Industry::Finance
        } else if has(&["health", "med", "hospital"]) {
            Industry::Healthcare
        } else if has(&["edu", "school", "university"]) {
            Industry::Education
        } else if has(&["gov", "government"]) {
            Industry::Government
        } else {
            Industry::General
        }
    }

    /// Words commonly glued to organization names in this industry.
    pub fn suffix_words(self) -> &'static [&'static str] {
        match self {
            Industry::Technology => &["dev", "admin", "user", "test", "demo", "api", "app"],
            Industry::Finance => &["bank", "fin", "money", "cash", "account", "client"],
            Industry::Healthcare => &["health", "med", "patient", "doctor", "nurse", "care"],
            Industry::Education => &["edu", "school", "student", "campus"],
            Industry::Government => &["gov", "admin", "public", "portal"],
            Industry::General => &["admin", "user", "test", "demo", "guest", "root"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Industry::Technology => "technology",
            Industry::Finance => "finance",
            Industry::Healthcare => "healthcare",
            Industry::Education => "education",
            Industry::Government => "government",
            Industry::General => "general",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived context for one identity. Built once per run, read-only after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorporateContext {
    /// Lowercased, trimmed identity
    pub name: String,
    /// Initials and short prefixes, first occurrence order, no repeats
    pub abbreviations: Vec<String>,
    pub industry: Industry,
    pub estimated_founded_year: i32,
}

impl CorporateContext {
    /// Derive the context of `identity`. `seed` drives the founding-year
    /// estimate for names not in the known table.
    pub fn build(identity: &str, seed: u64) -> Self {
        let name = identity.trim().to_lowercase();

        let mut abbreviations = Vec::new();
        for abbr in VariationGenerator::abbreviations(&name) {
            if !abbreviations.contains(&abbr) {
                abbreviations.push(abbr);
            }
        }

        let industry = Industry::detect(&name);
        let estimated_founded_year = estimate_founded_year(&name, seed);

        tracing::debug!(
            name = %name,
            industry = %industry,
            founded = estimated_founded_year,
            abbreviations = abbreviations.len(),
            "Corporate context built"
        );

        Self {
            name,
            abbreviations,
            industry,
            estimated_founded_year,
        }
    }
}

/// Known founding year, or a seeded guess: 1980-1999 for short names,
/// 2000-2024 otherwise.
pub fn estimate_founded_year(name: &str, seed: u64) -> i32 {
    if let Some((_, year)) = KNOWN_FOUNDING_YEARS.iter().find(|(known, _)| *known == name) {
        return *year;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    if name.chars().count() <= SHORT_NAME_LEN {
        1980 + rng.gen_range(0..20)
    } else {
        2000 + rng.gen_range(0..25)
    }
}
