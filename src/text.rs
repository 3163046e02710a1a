//! Typemachine-effect en taalkeuze voor het tekstpaneel.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::report::Report;

/// Maximaal aantal tekens dat per stap zichtbaar wordt.
pub const MAX_CHARS_PER_STEP: usize = 10;
/// Maximale wachttijd voor een stap, in milliseconden.
pub const MAX_STEP_DELAY_MS: u32 = 100;

/// Eén stap van de onthulling: na `delay_ms` zijn de eerste `end` tekens zichtbaar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevealStep {
    pub end: usize,
    pub delay_ms: u32,
}

/// Iterator die een tekst in willekeurige brokken onthult.
///
/// `end` telt tekens, geen bytes; gebruik [`prefix`] om het zichtbare deel
/// te bepalen.
pub struct Typewriter<R> {
    rng: R,
    total: usize,
    revealed: usize,
    finished: bool,
}

impl Typewriter<StdRng> {
    #[must_use]
    pub fn seeded(text: &str, seed: u64) -> Self {
        Self::with_rng(text, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Typewriter<R> {
    pub fn with_rng(text: &str, rng: R) -> Self {
        Self {
            rng,
            total: text.chars().count(),
            revealed: 0,
            finished: false,
        }
    }
}

impl<R: Rng> Iterator for Typewriter<R> {
    type Item = RevealStep;

    fn next(&mut self) -> Option<RevealStep> {
        if self.finished {
            return None;
        }
        let delay_ms = self.rng.random_range(0..=MAX_STEP_DELAY_MS);
        let advance = self.rng.random_range(0..=MAX_CHARS_PER_STEP);
        self.revealed = (self.revealed + advance).min(self.total);
        self.finished = self.revealed == self.total;
        Some(RevealStep {
            end: self.revealed,
            delay_ms,
        })
    }
}

/// Volledig onthullingsplan voor `text`.
#[must_use]
pub fn reveal_plan(text: &str, seed: u64) -> Vec<RevealStep> {
    Typewriter::seeded(text, seed).collect()
}

/// De eerste `end` tekens van `text`.
#[must_use]
pub fn prefix(text: &str, end: usize) -> &str {
    match text.char_indices().nth(end) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Hoe een gekozen tekst getoond moet worden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "text", rename_all = "snake_case")]
pub enum TextReveal {
    Instant(String),
    Animated(String),
}

impl TextReveal {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Instant(text) | Self::Animated(text) => text,
        }
    }
}

/// Onthoudt welke talen al eens getoond zijn.
#[derive(Debug, Clone)]
pub struct LanguagePanel {
    seen: HashSet<String>,
}

impl LanguagePanel {
    /// Nieuw paneel waarin `default_language` al als getoond geldt.
    #[must_use]
    pub fn new(default_language: &str) -> Self {
        Self {
            seen: HashSet::from([default_language.to_owned()]),
        }
    }

    /// Kiest een taal; de eerste keer wordt de tekst geanimeerd.
    pub fn select(&mut self, report: &Report, language: &str) -> Option<TextReveal> {
        let text = report.simplified_text(language)?.to_owned();
        if self.seen.insert(language.to_owned()) {
            Some(TextReveal::Animated(text))
        } else {
            Some(TextReveal::Instant(text))
        }
    }

    #[must_use]
    pub fn has_seen(&self, language: &str) -> bool {
        self.seen.contains(language)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::report::{DEFAULT_VOLUME_SHAPE, ReportMetadata};

    fn report() -> Report {
        Report {
            id: 3,
            media_id: "m".to_owned(),
            volume_shape: DEFAULT_VOLUME_SHAPE,
            segments_of_interest: Vec::new(),
            meshes: Vec::new(),
            simplified_reports: BTreeMap::from([
                ("English".to_owned(), "All clear.".to_owned()),
                ("Hindi".to_owned(), "सब ठीक है।".to_owned()),
            ]),
            metadata: ReportMetadata::default(),
        }
    }

    #[test]
    fn reveal_is_monotonic_and_ends_on_full_text() {
        let text = "The liver shows a small hypodense lesion in segment VII.";
        for seed in 0..20 {
            let plan = reveal_plan(text, seed);
            assert!(!plan.is_empty());
            assert!(plan.windows(2).all(|pair| pair[0].end <= pair[1].end));
            assert!(
                plan.windows(2)
                    .all(|pair| pair[1].end - pair[0].end <= MAX_CHARS_PER_STEP)
            );
            assert!(plan.iter().all(|step| step.delay_ms <= MAX_STEP_DELAY_MS));
            assert_eq!(plan.last().map(|step| step.end), Some(text.chars().count()));
        }
    }

    #[test]
    fn same_seed_gives_same_plan() {
        assert_eq!(reveal_plan("abcdefghijkl", 9), reveal_plan("abcdefghijkl", 9));
    }

    #[test]
    fn empty_text_finishes_in_one_step() {
        let plan = reveal_plan("", 1);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].end, 0);
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        let text = "सब ठीक";
        assert_eq!(prefix(text, 2), "सब");
        assert_eq!(prefix(text, 0), "");
        assert_eq!(prefix(text, 99), text);
    }

    #[test]
    fn panel_animates_only_first_selection() {
        let report = report();
        let mut panel = LanguagePanel::new("English");

        assert_eq!(
            panel.select(&report, "English"),
            Some(TextReveal::Instant("All clear.".to_owned()))
        );
        assert!(matches!(
            panel.select(&report, "Hindi"),
            Some(TextReveal::Animated(_))
        ));
        assert!(matches!(
            panel.select(&report, "Hindi"),
            Some(TextReveal::Instant(_))
        ));
        assert!(panel.select(&report, "French").is_none());
        assert!(!panel.has_seen("French"));
    }
}
