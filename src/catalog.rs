/*******************************************************************************
*   (c) 2020 ZondaX GmbH
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
//! ATR catalog: known card descriptions keyed by ATR hex prefix
//!
//! The catalog source is a line-oriented text file in the smartcard_list
//! style. Lines starting with `#` are comments. A line whose first token is
//! `3B` or `3F` opens a new entry: leading two-hex-digit tokens form the ATR
//! prefix, the first non-hex token starts the description. Any other
//! non-blank line continues the description of the entry being built.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use log::debug;

/// One catalog entry: a space-joined uppercase hex prefix and its description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtrCatalogEntry {
    /// ATR prefix, e.g. `"3B 8F 80 01"`
    pub prefix: String,
    /// Free-text card description
    pub description: String,
}

/// How an ATR is matched against the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Stop at the first entry that matches, in catalog order.
    ///
    /// This is the historical behavior and the default.
    FirstMatch,
    /// Pick the matching entry with the longest prefix, earliest entry on ties
    LongestPrefix,
}

/// An ordered, immutable-once-loaded collection of ATR prefixes
#[derive(Debug, Clone, Default)]
pub struct AtrCatalog {
    entries: Vec<AtrCatalogEntry>,
}

/// Parser position while walking the catalog source
enum ParserState {
    /// No entry opened yet
    NoEntry,
    /// Accumulating prefix/description lines for one entry
    Building {
        /// Space-joined uppercase prefix so far
        prefix: String,
        /// Description text so far
        description: String,
    },
}

impl ParserState {
    fn flush(&mut self, entries: &mut Vec<AtrCatalogEntry>) {
        if let ParserState::Building {
            prefix,
            description,
        } = std::mem::replace(self, ParserState::NoEntry)
        {
            entries.push(AtrCatalogEntry {
                prefix,
                description: description.trim().to_string(),
            });
        }
    }
}

impl AtrCatalog {
    /// An empty catalog (every lookup misses)
    pub fn new() -> Self {
        AtrCatalog::default()
    }

    /// Parse catalog text
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        let mut state = ParserState::NoEntry;

        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();

            if parts[0] == "3B" || parts[0] == "3F" {
                state.flush(&mut entries);

                let mut prefix = String::new();
                let mut description = String::new();
                for (i, token) in parts.iter().enumerate() {
                    if is_hex_pair(token) {
                        if !prefix.is_empty() {
                            prefix.push(' ');
                        }
                        prefix.push_str(&token.to_ascii_uppercase());
                    } else {
                        description = parts[i..].join(" ");
                        break;
                    }
                }
                state = ParserState::Building {
                    prefix,
                    description,
                };
            } else if let ParserState::Building { description, .. } = &mut state {
                if !description.is_empty() {
                    description.push(' ');
                }
                description.push_str(&parts.join(" "));
            }
        }
        state.flush(&mut entries);

        debug!("loaded {} ATR prefixes", entries.len());
        AtrCatalog { entries }
    }

    /// Read and parse catalog text from a reader
    pub fn from_reader(mut reader: impl BufRead) -> io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(&text))
    }

    /// Read and parse a catalog file, e.g. `atr.txt`
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in source order
    pub fn iter(&self) -> impl Iterator<Item = &AtrCatalogEntry> {
        self.entries.iter()
    }

    /// First entry matching the rendered ATR, in catalog order.
    ///
    /// `atr_hex` is the space-separated uppercase rendering of the ATR (see
    /// [`crate::atr::to_hex_string`]). An entry matches when the ATR starts
    /// with its prefix, or — for short or partial ATR captures — when the
    /// prefix starts with the ATR.
    pub fn lookup(&self, atr_hex: &str) -> Option<&AtrCatalogEntry> {
        self.lookup_with(atr_hex, MatchStrategy::FirstMatch)
    }

    /// Match the rendered ATR using an explicit strategy
    pub fn lookup_with(
        &self,
        atr_hex: &str,
        strategy: MatchStrategy,
    ) -> Option<&AtrCatalogEntry> {
        match strategy {
            MatchStrategy::FirstMatch => self
                .entries
                .iter()
                .find(|entry| prefix_matches(&entry.prefix, atr_hex)),
            MatchStrategy::LongestPrefix => {
                let mut best: Option<&AtrCatalogEntry> = None;
                for entry in &self.entries {
                    if !prefix_matches(&entry.prefix, atr_hex) {
                        continue;
                    }
                    match best {
                        Some(b) if entry.prefix.len() <= b.prefix.len() => {}
                        _ => best = Some(entry),
                    }
                }
                best
            }
        }
    }
}

/// Two-way prefix match between a catalog key and a rendered ATR
fn prefix_matches(prefix: &str, atr_hex: &str) -> bool {
    atr_hex.starts_with(prefix) || prefix.starts_with(atr_hex)
}

fn is_hex_pair(token: &str) -> bool {
    token.len() == 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# smartcard list excerpt
3B 8F 80 01 80 4F 0C A0 00 00 03 06 Generic contactless reader
3B 88 80 01 00 00 00 00 33 81 81 00 3A
\tSome national eID
second description line
3F 67 25 00 21 20 00 0F 68 90 00 Old T=0 test card
";

    #[test]
    fn parses_entries_in_order() {
        let catalog = AtrCatalog::parse(SAMPLE);
        assert_eq!(catalog.len(), 3);

        let entries: Vec<_> = catalog.iter().collect();
        assert_eq!(entries[0].prefix, "3B 8F 80 01 80 4F 0C A0 00 00 03 06");
        assert_eq!(entries[0].description, "Generic contactless reader");
        assert_eq!(entries[2].prefix, "3F 67 25 00 21 20 00 0F 68 90 00");
    }

    #[test]
    fn continuation_lines_append_to_description() {
        let catalog = AtrCatalog::parse(SAMPLE);
        let entry = catalog.iter().nth(1).unwrap();
        assert_eq!(entry.prefix, "3B 88 80 01 00 00 00 00 33 81 81 00 3A");
        assert_eq!(
            entry.description,
            "Some national eID second description line"
        );
    }

    #[test]
    fn comments_and_blanks_are_ignored() {
        let catalog = AtrCatalog::parse("# only a comment\n\n   \n");
        assert!(catalog.is_empty());
    }

    #[test]
    fn last_entry_is_flushed_at_eof() {
        let catalog = AtrCatalog::parse("3B 00 Tiny card");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.iter().next().unwrap().description, "Tiny card");
    }

    #[test]
    fn lowercase_hex_is_normalized() {
        let catalog = AtrCatalog::parse("3B 8f aa Card");
        assert_eq!(catalog.iter().next().unwrap().prefix, "3B 8F AA");
    }

    #[test]
    fn dangling_description_without_entry_is_dropped() {
        let catalog = AtrCatalog::parse("stray text before any entry\n3B 00 Card");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.iter().next().unwrap().description, "Card");
    }

    #[test]
    fn first_match_wins_regardless_of_specificity() {
        let catalog = AtrCatalog::parse("3B 8F Generic\n3B 8F 80 01 Specific");
        let hit = catalog.lookup("3B 8F 80 01 55").unwrap();
        assert_eq!(hit.description, "Generic");
    }

    #[test]
    fn longest_prefix_strategy() {
        let catalog = AtrCatalog::parse("3B 8F Generic\n3B 8F 80 01 Specific");
        let hit = catalog
            .lookup_with("3B 8F 80 01 55", MatchStrategy::LongestPrefix)
            .unwrap();
        assert_eq!(hit.description, "Specific");
    }

    #[test]
    fn short_capture_matches_longer_key() {
        // Partial ATR: the catalog key starts with the rendered ATR
        let catalog = AtrCatalog::parse("3B 8F 80 01 80 4F Long key card");
        let hit = catalog.lookup("3B 8F 80").unwrap();
        assert_eq!(hit.description, "Long key card");
    }

    #[test]
    fn miss_returns_none() {
        let catalog = AtrCatalog::parse("3B 8F 80 01 Card");
        assert!(catalog.lookup("3F 00").is_none());
    }
}
