//! Named character classes
//!
//! A class is declared as a list of members, each either a single character (`"-"`) or an
//! inclusive range (`"a-z"`). Grammars refer to classes by name in their tables; the names
//! are resolved to [`ClassId`]s once, when the grammar is built.

use super::table::GrammarError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

#[derive(Debug, Clone)]
struct CharClass {
    name: String,
    singles: Vec<char>,
    ranges: Vec<(char, char)>,
}

impl CharClass {
    fn contains(&self, ch: char) -> bool {
        self.singles.contains(&ch) || self.ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&ch))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CharClasses {
    classes: Vec<CharClass>,
}

impl CharClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or redeclares) a class
    pub fn define(&mut self, name: &str, members: &[&str]) -> Result<ClassId, GrammarError> {
        let mut class = CharClass {
            name: name.to_string(),
            singles: Vec::new(),
            ranges: Vec::new(),
        };
        for member in members {
            let chars: Vec<char> = member.chars().collect();
            match chars.as_slice() {
                [single] => class.singles.push(*single),
                [lo, '-', hi] if lo <= hi => class.ranges.push((*lo, *hi)),
                _ => {
                    return Err(GrammarError::InvalidClassMember {
                        class: name.to_string(),
                        member: member.to_string(),
                    })
                }
            }
        }

        if let Some(existing) = self.id(name) {
            self.classes[existing.0] = class;
            return Ok(existing);
        }
        self.classes.push(class);
        Ok(ClassId(self.classes.len() - 1))
    }

    pub fn id(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .position(|class| class.name == name)
            .map(ClassId)
    }

    pub fn contains(&self, id: ClassId, ch: char) -> bool {
        self.classes[id.0].contains(ch)
    }

    pub fn name(&self, id: ClassId) -> &str {
        &self.classes[id.0].name
    }

    /// Every class `ch` belongs to, in declaration order
    pub fn classify(&self, ch: char) -> Vec<&str> {
        self.classes
            .iter()
            .filter(|class| class.contains(ch))
            .map(|class| class.name.as_str())
            .collect()
    }
}
