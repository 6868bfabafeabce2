//! Variation Generator
//!
//! Turns one seed (organization name or common word) into case forms,
//! separator-joined forms, abbreviations and number/year/symbol decorated
//! forms. Output may contain repeats; deduplication happens in the pipeline.

use crate::context::CorporateContext;

// =============================================================================
// FIXED VOCABULARIES
// =============================================================================

/// Separators used to rejoin multi-word seeds.
pub const SEPARATORS: &[&str] = &["", "_", "-", ".", "@"];

/// Joiners placed between an initial and the next one.
const INITIAL_JOINERS: &[&str] = &["", ".", "_", "-"];

/// Numbers appended to identity forms.
const IDENTITY_NUMBERS: &[&str] = &["123", "456", "789", "000", "111", "222", "333"];

/// Numbers appended to word forms.
const WORD_NUMBERS: &[&str] = &[
    "123", "456", "789", "000", "111", "222", "333", "01", "02", "03", "04", "05", "06", "07",
    "08", "09", "10", "11", "12", "13", "14", "15", "16", "17", "18", "19", "20",
];

/// Single-character symbol suffixes.
const SYMBOL_SUFFIXES: &[&str] = &["!", "@", "#", "$", "%", "^", "&", "*"];

/// Symbol prefixes.
const SYMBOL_PREFIXES: &[&str] = &["!", "@", "#"];

/// Separators for identity x word combinations.
const COMBINATION_SEPARATORS: &[&str] = &["", "_", "-", ".", "@", "#", "$", "%", "&", "*"];

/// Joiners between an identity form and an industry word.
const INDUSTRY_JOINERS: &[&str] = &["", "_", "@", "."];

/// Highest sequential number appended by [`VariationGenerator::number_forms`].
const MAX_SEQUENCE: u32 = 20;

// =============================================================================
// CASE HELPERS
// =============================================================================

/// Uppercase the first letter of every word. A letter starts a word when the
/// previous character is whitespace or ASCII punctuation other than `_`, so
/// `"m@raul"` becomes `"M@Raul"` and `"ferreira_costa"` stays one word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev = ' ';
    for c in s.chars() {
        if starts_word(prev) {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev = c;
    }
    out
}

fn starts_word(prev: char) -> bool {
    if prev.is_ascii() {
        !(prev.is_ascii_alphanumeric() || prev == '_')
    } else {
        prev.is_whitespace()
    }
}

/// First `n` characters of `s`, or `None` when `s` is shorter.
fn prefix(s: &str, n: usize) -> Option<String> {
    if s.chars().count() >= n {
        Some(s.chars().take(n).collect())
    } else {
        None
    }
}

/// Keep the first occurrence of each string.
fn dedup_ordered(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Produces variations of a seed for a fixed year range.
#[derive(Debug, Clone, Default)]
pub struct VariationGenerator {
    years: Vec<i32>,
    locale_suffixes: Vec<String>,
}

impl VariationGenerator {
    pub fn new(years: Vec<i32>) -> Self {
        Self {
            years,
            locale_suffixes: Vec::new(),
        }
    }

    /// Extra suffixes (typically from the locale) appended to identity forms.
    pub fn with_locale_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.locale_suffixes = suffixes;
        self
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Original, title-case and all-caps forms.
    pub fn case_forms(seed: &str) -> Vec<String> {
        if seed.is_empty() {
            return Vec::new();
        }
        vec![seed.to_string(), title_case(seed), seed.to_uppercase()]
    }

    /// Rejoined forms of a multi-word seed in every case, plus the initials.
    /// Single-word seeds yield nothing.
    pub fn separator_forms(seed: &str) -> Vec<String> {
        let words: Vec<&str> = seed.split_whitespace().collect();
        if words.len() < 2 {
            return Vec::new();
        }

        let mut forms = Vec::new();
        for cased in [seed.to_lowercase(), title_case(seed), seed.to_uppercase()] {
            let parts: Vec<&str> = cased.split_whitespace().collect();
            for &sep in SEPARATORS {
                forms.push(parts.join(sep));
            }
        }

        // First word capitalized, rest glued in lowercase
        let rest: String = words[1..].iter().map(|w| w.to_lowercase()).collect();
        forms.push(format!("{}{}", title_case(&words[0].to_lowercase()), rest));

        let initials: Vec<String> = words
            .iter()
            .filter_map(|w| w.chars().next())
            .map(|c| c.to_uppercase().collect())
            .collect();
        for &joiner in INITIAL_JOINERS {
            forms.push(initials.join(joiner));
        }

        forms
    }

    /// Initials (both cases) for multi-word seeds, and the first three and
    /// four characters in both cases.
    pub fn abbreviations(seed: &str) -> Vec<String> {
        let mut abbrs = Vec::new();

        let words: Vec<&str> = seed.split_whitespace().collect();
        if words.len() > 1 {
            let initials: String = words.iter().filter_map(|w| w.chars().next()).collect();
            abbrs.push(initials.clone());
            abbrs.push(initials.to_uppercase());
        }

        for n in [3, 4] {
            if let Some(p) = prefix(seed, n) {
                abbrs.push(p.clone());
                abbrs.push(p.to_uppercase());
            }
        }

        abbrs
    }

    /// Seed followed by each year (4 and 2 digits) and by 1..=20 in 1, 2 and
    /// 3 digit zero-padded form.
    pub fn number_forms(&self, seed: &str) -> Vec<String> {
        let mut forms = Vec::with_capacity(self.years.len() * 2 + MAX_SEQUENCE as usize * 3);
        for year in &self.years {
            forms.push(format!("{}{}", seed, year));
            forms.push(format!("{}{:02}", seed, year % 100));
        }
        for i in 1..=MAX_SEQUENCE {
            forms.push(format!("{}{}", seed, i));
            forms.push(format!("{}{:02}", seed, i));
            forms.push(format!("{}{:03}", seed, i));
        }
        forms
    }

    /// Every structural variation of an identity: case forms, separator
    /// forms, abbreviations and number forms of the lowercased identity.
    pub fn identity_variations(&self, identity: &str) -> Vec<String> {
        let identity = identity.trim().to_lowercase();
        if identity.is_empty() {
            return Vec::new();
        }

        let mut variations = Self::case_forms(&identity);
        variations.extend(Self::separator_forms(&identity));
        variations.extend(Self::abbreviations(&identity));
        variations.extend(self.number_forms(&identity));
        variations
    }

    /// Full decoration of one word: case forms, years, common numbers on
    /// either side, symbol suffixes, number+symbol endings and symbol
    /// prefixes combined with numbers and years.
    pub fn word_passwords(&self, word: &str) -> Vec<String> {
        let word = word.trim();
        if word.is_empty() {
            return Vec::new();
        }

        let variations = dedup_ordered(vec![
            word.to_string(),
            word.to_lowercase(),
            title_case(word),
            word.to_uppercase(),
        ]);

        let mut out = variations.clone();

        for year in &self.years {
            let short = format!("{:02}", year % 100);
            for v in &variations {
                out.push(format!("{}{}", v, year));
                out.push(format!("{}{}", v, short));
                out.push(format!("{}_{}", v, short));
                out.push(format!("{}@{}", v, short));
            }
        }

        for v in &variations {
            for num in WORD_NUMBERS {
                out.push(format!("{}{}", v, num));
                out.push(format!("{}{}", num, v));
                out.push(format!("{}_{}", v, num));
                out.push(format!("{}@{}", v, num));
            }
        }

        for v in &variations {
            for sym in SYMBOL_SUFFIXES {
                out.push(format!("{}{}", v, sym));
            }
        }

        for v in &variations {
            for num in WORD_NUMBERS {
                for sym in SYMBOL_SUFFIXES {
                    out.push(format!("{}{}{}", v, num, sym));
                    out.push(format!("{}_{}{}", v, num, sym));
                    out.push(format!("{}@{}{}", v, num, sym));
                }
            }
        }

        for pre in SYMBOL_PREFIXES {
            for v in &variations {
                out.push(format!("{}{}", pre, v));
            }
            for v in &variations {
                for num in WORD_NUMBERS {
                    out.push(format!("{}{}{}", pre, v, num));
                    out.push(format!("{}{}_{}", pre, v, num));
                    out.push(format!("{}{}@{}", pre, v, num));
                }
            }
            for v in &variations {
                for year in &self.years {
                    out.push(format!("{}{}{}", pre, v, year));
                    out.push(format!("{}{}{:02}", pre, v, year % 100));
                }
            }
        }

        out
    }

    /// [`word_passwords`](Self::word_passwords) over a list, in order.
    pub fn words_passwords<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        words
            .iter()
            .flat_map(|w| self.word_passwords(w.as_ref()))
            .collect()
    }

    /// Identity-derived candidates: every identity variation and context
    /// abbreviation decorated with years, common numbers and locale suffixes,
    /// plus industry-biased and founding-year forms.
    pub fn identity_passwords(&self, identity: &str, context: &CorporateContext) -> Vec<String> {
        let company = identity.trim().to_lowercase();
        if company.is_empty() {
            return Vec::new();
        }
        let title = title_case(&company);

        let mut bases = Self::case_forms(&company);
        bases.extend(self.identity_variations(&company));
        bases.extend(context.abbreviations.iter().cloned());

        let mut out = Vec::new();
        for base in &bases {
            for year in &self.years {
                let short = format!("{:02}", year % 100);
                out.push(format!("{}{}", base, year));
                out.push(format!("{}{}", base, short));
                out.push(format!("{}_{}", base, short));
                out.push(format!("{}@{}", base, short));
            }
        }
        for base in &bases {
            for num in IDENTITY_NUMBERS {
                out.push(format!("{}{}", base, num));
                out.push(format!("{}{}", num, base));
                out.push(format!("{}_{}", base, num));
                out.push(format!("{}@{}", base, num));
            }
        }
        for base in &bases {
            for suffix in &self.locale_suffixes {
                out.push(format!("{}{}", base, suffix));
            }
        }

        let mut anchors = vec![company.clone(), title.clone()];
        anchors.extend(context.abbreviations.iter().cloned());
        for anchor in &anchors {
            for word in context.industry.suffix_words() {
                for joiner in INDUSTRY_JOINERS {
                    out.push(format!("{}{}{}", anchor, joiner, word));
                    out.push(format!("{}{}{}", word, joiner, anchor));
                }
            }
        }

        out.push(format!("{}{}", company, context.estimated_founded_year));
        out.push(format!("{}{}", title, context.estimated_founded_year));

        out
    }

    /// Identity joined with each word by every combination separator in both
    /// orders, and with each year between them.
    pub fn identity_word_combinations<S: AsRef<str>>(
        &self,
        identity: &str,
        words: &[S],
    ) -> Vec<String> {
        let company = identity.trim().to_lowercase();
        if company.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            for sep in COMBINATION_SEPARATORS {
                out.push(format!("{}{}{}", company, sep, word));
                out.push(format!("{}{}{}", word, sep, company));
            }
            for year in &self.years {
                out.push(format!("{}{}{}", company, year, word));
                out.push(format!("{}{}{}", word, year, company));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CorporateContext;

    fn generator() -> VariationGenerator {
        VariationGenerator::new(vec![2024, 2025])
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ferreira costa"), "Ferreira Costa");
        assert_eq!(title_case("m@raul"), "M@Raul");
        assert_eq!(title_case("ferreira_costa"), "Ferreira_costa");
        assert_eq!(title_case("2024abc"), "2024abc");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_case_forms() {
        assert_eq!(
            VariationGenerator::case_forms("acme"),
            vec!["acme", "Acme", "ACME"]
        );
        assert!(VariationGenerator::case_forms("").is_empty());
    }

    #[test]
    fn test_separator_forms_multi_word() {
        let forms = VariationGenerator::separator_forms("ferreira costa");
        for expected in [
            "ferreiracosta",
            "ferreira_costa",
            "ferreira-costa",
            "ferreira.costa",
            "ferreira@costa",
            "FerreiraCosta",
            "Ferreira_Costa",
            "FERREIRA_COSTA",
            "FERREIRA@COSTA",
            "FC",
            "F.C",
            "F_C",
            "F-C",
        ] {
            assert!(forms.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_separator_forms_single_word() {
        assert!(VariationGenerator::separator_forms("acme").is_empty());
    }

    #[test]
    fn test_abbreviations() {
        let abbrs = VariationGenerator::abbreviations("ferreira costa");
        assert_eq!(abbrs, vec!["fc", "FC", "fer", "FER", "ferr", "FERR"]);

        let abbrs = VariationGenerator::abbreviations("ab");
        assert!(abbrs.is_empty());
    }

    #[test]
    fn test_number_forms() {
        let forms = generator().number_forms("test");
        assert!(forms.contains(&"test2024".to_string()));
        assert!(forms.contains(&"test25".to_string()));
        assert!(forms.contains(&"test7".to_string()));
        assert!(forms.contains(&"test07".to_string()));
        assert!(forms.contains(&"test007".to_string()));
        assert!(forms.contains(&"test20".to_string()));
        assert_eq!(forms.len(), 2 * 2 + 20 * 3);
    }

    #[test]
    fn test_identity_variations_empty_seed() {
        assert!(generator().identity_variations("   ").is_empty());
    }

    #[test]
    fn test_identity_variations_lowercases() {
        let vars = generator().identity_variations("Ferreira Costa");
        assert!(vars.contains(&"ferreira costa".to_string()));
        assert!(vars.contains(&"FerreiraCosta".to_string()));
        assert!(vars.contains(&"FC".to_string()));
    }

    #[test]
    fn test_word_passwords() {
        let out = generator().word_passwords("test");
        for expected in [
            "test",
            "Test",
            "TEST",
            "test2024",
            "test25",
            "test_24",
            "Test@25",
            "test123",
            "123test",
            "test_01",
            "test!",
            "Test10*",
            "test_20#",
            "!test",
            "#Test123",
            "@test_05",
            "!test2025",
            "#TEST24",
        ] {
            assert!(out.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_word_passwords_keeps_original_case_form() {
        // leet forms carry symbols; the original spelling must survive
        let out = generator().word_passwords("m@raul");
        assert!(out.contains(&"m@raul".to_string()));
        assert!(out.contains(&"M@Raul".to_string()));
        assert!(out.contains(&"m@raul17*".to_string()));
    }

    #[test]
    fn test_word_passwords_empty() {
        assert!(generator().word_passwords("  ").is_empty());
    }

    #[test]
    fn test_identity_passwords() {
        let context = CorporateContext::build("Acme Bank", 7);
        let out = generator().identity_passwords("Acme Bank", &context);
        assert!(out.contains(&"acmebank2024".to_string()));
        assert!(out.contains(&"AcmeBank@24".to_string()));
        assert!(out.contains(&"123acmebank".to_string()));
        // finance industry bias
        assert!(out.contains(&"acme bank_money".to_string()));
        assert!(out.contains(&"AB@cash".to_string()));
        assert!(out.contains(&format!("acme bank{}", context.estimated_founded_year)));
    }

    #[test]
    fn test_identity_passwords_with_locale_suffixes() {
        let context = CorporateContext::build("acme", 1);
        let out = generator()
            .with_locale_suffixes(vec!["!@#".to_string()])
            .identity_passwords("acme", &context);
        assert!(out.contains(&"Acme!@#".to_string()));
    }

    #[test]
    fn test_identity_word_combinations() {
        let out = generator().identity_word_combinations("Acme", &["Admin", " "]);
        assert!(out.contains(&"acme_admin".to_string()));
        assert!(out.contains(&"admin*acme".to_string()));
        assert!(out.contains(&"acme2024admin".to_string()));
        assert!(out.contains(&"admin2025acme".to_string()));
        assert_eq!(out.len(), 10 * 2 + 2 * 2);
    }
}
