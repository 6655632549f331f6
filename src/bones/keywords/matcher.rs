//! Variant matching for a keyword directive
//!
//! The matcher keeps the list of variants that are still possible and a cursor into their
//! elements. Each character narrows the list:
//!
//!     1. candidates whose next element is that literal (or a space, for a blank) advance
//!     2. a blank right after a space element is absorbed
//!     3. a candidate with no elements left completes; so does any candidate at `{` or end
//!        of line when the tail is optional, or a variant that completed before a blank
//!     4. candidates expecting an optional space skip it and the character is retried
//!     5. candidates expecting a slot ask the grammar to capture it
//!     6. anything else rejects the character
//!
//! Once a variant diverges from the others it cannot be recovered: there is no backtracking.

use super::pattern::{Element, Slot};
use super::KeywordDef;
use log::trace;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStep {
    /// The character matched; consume it
    Advance,
    /// An extra blank; consume it
    Absorb,
    /// Dispatch the same character again
    Retry,
    /// Capture a slot value starting at the character, then dispatch what follows
    Capture(Slot),
    /// The variant at this index matched; the character is not part of it
    Complete(usize),
    /// No variant accepts the character
    Reject,
}

fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: Arc<KeywordDef>,
    candidates: Vec<usize>,
    cursor: usize,
    /// A variant that was complete when the last blank was matched
    fallback: Option<usize>,
}

impl KeywordMatcher {
    pub fn new(keyword: Arc<KeywordDef>) -> Self {
        let candidates = (0..keyword.variants().len()).collect();
        Self {
            keyword,
            candidates,
            cursor: 0,
            fallback: None,
        }
    }

    pub fn keyword(&self) -> &KeywordDef {
        &self.keyword
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    fn element(&self, variant: usize, index: usize) -> Option<&Element> {
        self.keyword.variants()[variant].elements.get(index)
    }

    fn narrow(&self, keep: impl Fn(Option<&Element>) -> bool) -> Vec<usize> {
        self.candidates
            .iter()
            .copied()
            .filter(|variant| keep(self.element(*variant, self.cursor)))
            .collect()
    }

    fn completed(&self) -> Option<usize> {
        self.candidates
            .iter()
            .copied()
            .find(|variant| self.element(*variant, self.cursor).is_none())
    }

    pub fn step(&mut self, ch: char) -> MatchStep {
        let matching = self.narrow(|element| match element {
            Some(Element::Literal(literal)) => *literal == ch,
            Some(Element::Space) => is_blank(ch),
            _ => false,
        });
        if !matching.is_empty() {
            self.fallback = if is_blank(ch) {
                self.completed().or(self.fallback)
            } else {
                None
            };
            trace!("{}: {:?} keeps variants {:?}", self.keyword.name(), ch, matching);
            self.candidates = matching;
            self.cursor += 1;
            return MatchStep::Advance;
        }

        if is_blank(ch)
            && self.cursor > 0
            && self
                .candidates
                .iter()
                .any(|variant| matches!(self.element(*variant, self.cursor - 1), Some(Element::Space)))
        {
            return MatchStep::Absorb;
        }

        if let Some(variant) = self.completed() {
            return MatchStep::Complete(variant);
        }
        if self.keyword.is_tail_optional() && (ch == '{' || ch == '\n') {
            return MatchStep::Complete(self.candidates[0]);
        }
        if let Some(variant) = self.fallback.take() {
            return MatchStep::Complete(variant);
        }

        let spaced = self.narrow(|element| matches!(element, Some(Element::Space)));
        if !spaced.is_empty() {
            self.candidates = spaced;
            self.cursor += 1;
            return MatchStep::Retry;
        }

        let first_slot = self.candidates.iter().find_map(|variant| match self.element(*variant, self.cursor) {
            Some(Element::Slot(slot)) => Some(slot.clone()),
            _ => None,
        });
        if let Some(slot) = first_slot {
            self.candidates = self.narrow(|element| matches!(element, Some(Element::Slot(other)) if *other == slot));
            self.cursor += 1;
            return MatchStep::Capture(slot);
        }

        trace!("{}: {:?} rejected", self.keyword.name(), ch);
        MatchStep::Reject
    }

    /// Characters that end an expression slot just captured: the next literal of every
    /// remaining candidate, and the end of the line for a candidate with no literal left
    ///
    /// A slot followed by a literal runs across lines up to that literal.
    pub fn terminators(&self) -> Vec<char> {
        let mut stops = Vec::new();
        for variant in &self.candidates {
            let next = self.keyword.variants()[*variant].elements[self.cursor..]
                .iter()
                .find(|element| !element.is_space());
            let stop = match next {
                Some(Element::Literal(ch)) => *ch,
                _ => '\n',
            };
            if !stops.contains(&stop) {
                stops.push(stop);
            }
        }
        if stops.is_empty() {
            stops.push('\n');
        }
        stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::keywords::pattern::SlotKind;
    use crate::bones::keywords::KeywordRegistry;

    fn matcher(name: &str) -> KeywordMatcher {
        let registry = KeywordRegistry::standard();
        KeywordMatcher::new(registry.get(name).unwrap().clone())
    }

    /// Feeds `input`, answering slot captures by skipping to the next terminator
    fn run(matcher: &mut KeywordMatcher, input: &str) -> (MatchStep, Vec<String>) {
        let chars: Vec<char> = input.chars().collect();
        let mut captured = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            match matcher.step(chars[i]) {
                MatchStep::Advance | MatchStep::Absorb => i += 1,
                MatchStep::Retry => {}
                MatchStep::Capture(slot) => {
                    let stops: Vec<char> = match slot.kind {
                        SlotKind::Identifier => vec![' ', ',', ']', ')'],
                        SlotKind::Expression => matcher.terminators(),
                    };
                    let start = i;
                    while !stops.contains(&chars[i]) {
                        i += 1;
                    }
                    captured.push(chars[start..i].iter().collect());
                }
                other => return (other, captured),
            }
        }
        (MatchStep::Reject, captured)
    }

    #[test]
    fn test_if_captures_the_test() {
        let mut m = matcher("if");
        let (step, captured) = run(&mut m, " (a > b)\n");
        assert_eq!(step, MatchStep::Complete(0));
        assert_eq!(captured, vec!["a > b"]);
    }

    #[test]
    fn test_missing_space_is_optional() {
        let mut m = matcher("if");
        let (step, _) = run(&mut m, "(x)\n");
        assert_eq!(step, MatchStep::Complete(0));
    }

    #[test]
    fn test_for_picks_the_bracket_variant() {
        let mut m = matcher("for");
        let (step, captured) = run(&mut m, " ([k, v] in items) {");
        assert_eq!(step, MatchStep::Complete(1));
        assert_eq!(captured, vec!["k", "v", "items"]);
    }

    #[test]
    fn test_else_falls_back_after_a_blank() {
        let mut m = matcher("else");
        assert_eq!(run(&mut m, " {").0, MatchStep::Complete(0));

        let mut m = matcher("else");
        let (step, captured) = run(&mut m, "  if (y)\n");
        assert_eq!(step, MatchStep::Complete(1));
        assert_eq!(captured, vec!["y"]);
    }

    #[test]
    fn test_expression_stops_only_at_what_follows_it() {
        let mut m = matcher("if");
        assert_eq!(m.step(' '), MatchStep::Advance);
        assert_eq!(m.step('('), MatchStep::Advance);
        assert!(matches!(m.step('a'), MatchStep::Capture(_)));
        assert_eq!(m.terminators(), vec![')']);
    }

    #[test]
    fn test_trailing_expression_stops_at_the_line_end() {
        let def = KeywordDef::new("include").variant("include @path:expr").unwrap();
        let mut m = KeywordMatcher::new(Arc::new(def));
        assert_eq!(m.step(' '), MatchStep::Advance);
        assert!(matches!(m.step('a'), MatchStep::Capture(_)));
        assert_eq!(m.terminators(), vec!['\n']);
    }

    #[test]
    fn test_divergence_is_rejected() {
        let mut m = matcher("for");
        let (step, _) = run(&mut m, " (x on y)\n");
        assert_eq!(step, MatchStep::Reject);
    }
}
