//! Indentation-based section extraction.
//!
//! Device configurations nest blocks by indentation:
//!
//! ```text
//! interface GigabitEthernet0/1
//!  description uplink
//!  ip address 10.0.0.1 255.255.255.0
//! interface GigabitEthernet0/2
//!  shutdown
//! ```
//!
//! [`find_sections`] returns one [`Section`] per line matching a header
//! pattern, holding the deeper-indented lines that follow it.

use regex::Regex;
use serde::Serialize;

use crate::error::{CliError, Result};

/// A block of output introduced by a matching header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// The header line.
    pub header: String,
    /// Capture groups of the header match; index 0 is the whole match.
    pub captures: Vec<Option<String>>,
    /// Body lines, verbatim, header excluded.
    pub lines: Vec<String>,
    /// Body lines joined with `\n`.
    pub config: String,
}

impl Section {
    /// The text matched by the header pattern.
    #[must_use]
    pub fn matched(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// A capture group of the header match.
    #[must_use]
    pub fn get(&self, group: usize) -> Option<&str> {
        self.captures.get(group).and_then(Option::as_deref)
    }
}

struct Open {
    section: usize,
    indent: usize,
}

/// Extract sections whose header line matches `pattern`.
///
/// Lines are split on runs of CR/LF. A header opens a section at its
/// indentation; following lines indented deeper belong to it. The first
/// line at the same or a shallower indentation closes it and may open the
/// next one. Whitespace-only lines also close the current section. Nested
/// headers are not reported separately: they are body lines of the
/// enclosing section.
#[must_use]
pub fn find_sections(text: &str, pattern: &Regex) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut open: Option<Open> = None;

    for line in split_lines(text) {
        let column = line.chars().position(|c| !c.is_whitespace());

        if let (Some(current), Some(column)) = (&open, column) {
            if column > current.indent {
                sections[current.section].lines.push(line.to_string());
                continue;
            }
        }
        open = None;

        if let Some(caps) = pattern.captures(line) {
            sections.push(Section {
                header: line.to_string(),
                captures: caps
                    .iter()
                    .map(|m| m.map(|m| m.as_str().to_string()))
                    .collect(),
                lines: Vec::new(),
                config: String::new(),
            });
            // A header on a blank line owns nothing.
            open = column.map(|indent| Open {
                section: sections.len() - 1,
                indent,
            });
        }
    }

    for section in &mut sections {
        section.config = section.lines.join("\n");
    }
    sections
}

/// Like [`find_sections`], compiling `pattern` first.
///
/// An invalid pattern is an input error.
pub fn find_sections_str(text: &str, pattern: &str) -> Result<Vec<Section>> {
    let regex = Regex::new(pattern).map_err(|e| {
        CliError::invalid_input(format!("invalid regex parameter in find_sections: {e}"))
    })?;
    Ok(find_sections(text, &regex))
}

/// Split on runs of CR/LF, keeping a leading and a trailing empty piece.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let pieces: Vec<&str> = text.split(['\r', '\n']).collect();
    let last = pieces.len() - 1;
    pieces
        .into_iter()
        .enumerate()
        .filter(move |(i, piece)| !piece.is_empty() || *i == 0 || *i == last)
        .map(|(_, piece)| piece)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING: &str = "\
hostname core-1
interface GigabitEthernet0/1
 description uplink
 ip address 10.0.0.1 255.255.255.0
interface GigabitEthernet0/2
 shutdown
!
end";

    fn re(s: &str) -> Regex {
        Regex::new(s).unwrap()
    }

    #[test]
    fn two_top_level_sections() {
        let sections = find_sections(RUNNING, &re(r"^interface (\S+)"));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].get(1), Some("GigabitEthernet0/1"));
        assert_eq!(
            sections[0].config,
            " description uplink\n ip address 10.0.0.1 255.255.255.0"
        );
        assert_eq!(sections[1].get(1), Some("GigabitEthernet0/2"));
        assert_eq!(sections[1].lines, vec![" shutdown"]);
    }

    #[test]
    fn nested_headers_fold_into_parent() {
        let text = "router bgp 65000\n address-family ipv4\n  neighbor 1.1.1.1 activate\n exit\n";
        let sections = find_sections(text, &re(r"^\s*(router|address-family)"));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].lines.len(), 3);
    }

    #[test]
    fn nested_header_found_when_parent_does_not_match() {
        let text = "router bgp 65000\n address-family ipv4\n  neighbor 1.1.1.1 activate\n address-family ipv6\n";
        let sections = find_sections(text, &re(r"^\s*address-family (\S+)"));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].get(1), Some("ipv4"));
        assert_eq!(sections[0].config, "  neighbor 1.1.1.1 activate");
        assert!(sections[1].lines.is_empty());
    }

    #[test]
    fn whitespace_line_closes_section() {
        let text = "vlan 10\n name users\n   \n name orphan\n";
        let sections = find_sections(text, &re(r"^vlan"));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].lines, vec![" name users"]);
    }

    #[test]
    fn crlf_runs_are_one_break() {
        let text = "vlan 10\r\n name users\r\n\r\nvlan 20\r\n name servers";
        let sections = find_sections(text, &re(r"^vlan (\d+)"));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].config, " name servers");
    }

    #[test]
    fn tabs_count_as_indentation() {
        let text = "system {\n\thost-name fw1;\n}";
        let sections = find_sections(text, &re(r"^system"));
        assert_eq!(sections[0].lines, vec!["\thost-name fw1;"]);
    }

    #[test]
    fn no_match_no_sections() {
        assert!(find_sections(RUNNING, &re(r"^line vty")).is_empty());
        assert!(find_sections("", &re(r"x")).is_empty());
    }

    #[test]
    fn str_variant_rejects_bad_pattern() {
        let err = find_sections_str(RUNNING, "interface (").unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));
        assert_eq!(find_sections_str(RUNNING, "^hostname").unwrap().len(), 1);
    }

    #[test]
    fn matched_text() {
        let sections = find_sections(RUNNING, &re(r"Gigabit\S+"));
        assert_eq!(sections[0].matched(), "GigabitEthernet0/1");
        assert_eq!(sections[0].header, "interface GigabitEthernet0/1");
    }
}
