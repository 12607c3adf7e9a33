//! Integration tests for output cleanup and section extraction.

use proptest::prelude::*;
use regex::Regex;
use rust_climode::normalize::{
    collapse_first_overwrite, erase_first_backspace, normalize_output, strip_ansi,
};
use rust_climode::{find_sections, remove_echo};

#[test]
fn stray_character_is_erased() {
    assert_eq!(normalize_output("abc\x08def"), "abdef");
}

#[test]
fn pager_prompt_wiped_with_backspaces() {
    let raw = "line one\r\n --More-- \x08\x08\x08\x08\x08\x08\x08\x08\x08\x08line two\r\n";
    assert_eq!(normalize_output(raw), "line one\r\nline two\r\n");
}

#[test]
fn progress_line_keeps_final_state() {
    let raw = "Copying 10%\rCopying 55%\rCopying 100%\r\n[OK]\r\n";
    assert_eq!(normalize_output(raw), "Copying 100%\r\n[OK]\r\n");
}

#[test]
fn crlf_output_is_untouched() {
    let raw = "Building configuration...\r\n\r\nCurrent configuration : 1520 bytes\r\n";
    assert_eq!(normalize_output(raw), raw);
}

#[test]
fn steps_are_exposed_individually() {
    assert_eq!(erase_first_backspace("ab\x08c"), "ac");
    assert_eq!(collapse_first_overwrite("old\rnew"), "new");
    assert_eq!(strip_ansi("\x1b[1;32mup\x1b[0m"), "up");
}

#[test]
fn backspace_and_carriage_return_interleave() {
    assert_eq!(normalize_output("a\x08\r\x08"), "\x08");
    assert_eq!(normalize_output("a\r\n\x08\x08"), "\x08");
}

#[test]
fn echo_removed_only_at_start() {
    assert_eq!(remove_echo("show ip\r\n10.0.0.1\r\n", "show ip\r"), "10.0.0.1\r\n");
    assert_eq!(remove_echo("10.0.0.1 show ip\r\n", "show ip"), "10.0.0.1 show ip\r\n");
}

#[test]
fn two_sections_in_source_order() {
    let config = "\
router ospf 1
 network 10.0.0.0 0.255.255.255 area 0
 passive-interface default
router bgp 65000
 neighbor 10.0.0.2 remote-as 65001
";
    let header = Regex::new(r"^router (\w+)").unwrap();

    let sections = find_sections(config, &header);

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].get(1), Some("ospf"));
    assert_eq!(
        sections[0].config,
        " network 10.0.0.0 0.255.255.255 area 0\n passive-interface default"
    );
    assert_eq!(sections[1].get(1), Some("bgp"));
    assert_eq!(sections[1].config, " neighbor 10.0.0.2 remote-as 65001");
}

#[test]
fn nested_headers_stay_in_parent() {
    let config = "\
policy-map QOS
 class VOICE
  priority percent 20
 class class-default
  fair-queue
";
    let header = Regex::new(r"class").unwrap();

    let sections = find_sections(config, &header);

    // policy-map does not match; each class line opens its own section
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].lines, vec!["  priority percent 20"]);
    assert_eq!(sections[1].lines, vec!["  fair-queue"]);
}

#[test]
fn section_serializes_to_json() {
    let header = Regex::new(r"^vlan (\d+)").unwrap();
    let sections = find_sections("vlan 10\n name users\n", &header);

    let json = serde_json::to_value(&sections[0]).unwrap();

    assert_eq!(json["header"], "vlan 10");
    assert_eq!(json["captures"][1], "10");
    assert_eq!(json["config"], " name users");
}

fn terminal_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-z0-9 #>-]{0,8}",
            1 => Just("\x08".to_string()),
            1 => Just("\r".to_string()),
            1 => Just("\r\n".to_string()),
            1 => Just("\n".to_string()),
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

/// Output made only of the characters the cleanup reacts to.
fn control_text() -> impl Strategy<Value = String> {
    "[ab\r\n\x08]{0,16}"
}

/// The cleanup loop written as two first-match regex rewrites per round.
fn regex_cleanup(raw: &str) -> String {
    let erase = Regex::new(r"[^\x08]\x08").unwrap();
    let collapse =
        Regex::new(r"[^\r\n\x{2028}\x{2029}]*\r([^\r\n\x{2028}\x{2029}]+)").unwrap();
    let mut current = raw.to_string();
    loop {
        let erased = erase.replace(&current, "");
        let next = collapse.replace(&erased, "$1").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

fn body_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9 ]{0,12}", 0..6)
        .prop_map(|lines| lines.into_iter().map(|l| format!(" {l}")).collect())
}

proptest! {
    #[test]
    fn normalizer_reaches_fixed_point(raw in terminal_text()) {
        let once = normalize_output(&raw);
        prop_assert_eq!(normalize_output(&once), once);
    }

    #[test]
    fn normalizer_never_grows_text(raw in terminal_text()) {
        prop_assert!(normalize_output(&raw).len() <= raw.len());
    }

    #[test]
    fn normalizer_matches_regex_rewrites(raw in control_text()) {
        prop_assert_eq!(normalize_output(&raw), regex_cleanup(&raw));
    }

    #[test]
    fn normalizer_matches_regex_rewrites_on_terminal_text(raw in terminal_text()) {
        prop_assert_eq!(normalize_output(&raw), regex_cleanup(&raw));
    }

    #[test]
    fn sections_own_only_their_body(first in body_lines(), second in body_lines()) {
        let mut text = String::from("block one\n");
        for line in &first {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str("block two\n");
        for line in &second {
            text.push_str(line);
            text.push('\n');
        }
        let header = Regex::new(r"^block (\w+)").unwrap();

        let sections = find_sections(&text, &header);

        prop_assert_eq!(sections.len(), 2);
        prop_assert_eq!(sections[0].get(1), Some("one"));
        prop_assert_eq!(&sections[0].lines, &first);
        prop_assert_eq!(&sections[1].lines, &second);
        prop_assert_eq!(sections[1].config.clone(), second.join("\n"));
    }
}
