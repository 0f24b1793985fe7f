//! Reply composition from a quip line and an optional backend record.

use crate::service::backend::{FieldKind, Record};

/// Lines render as block-quote continuations in Slack.
const LINE_SEPARATOR: &str = "\n> ";

/// Compose the final reply text.
///
/// The quip-wrapped link is always the first line. Record fields follow in
/// schema order as `*Label* value` lines, except: the subject renders bare
/// (or as `No subject`), the parent renders as a link when one could be
/// derived, and the key field is skipped since it is already the link label.
pub fn compose(quip_line: String, record: Option<&Record>) -> String {
    let mut lines = vec![quip_line];

    if let Some(record) = record {
        for field in record.fields() {
            match field.kind {
                FieldKind::Key => {}
                FieldKind::Subject => {
                    lines.push(if field.value.is_empty() {
                        "No subject".to_string()
                    } else {
                        field.value.clone()
                    });
                }
                FieldKind::Parent if !field.value.is_empty() => {
                    let rendered = match &field.link {
                        Some(link) => format!("<{}|{}>", link, field.value),
                        None => field.value.clone(),
                    };
                    lines.push(format!("*{}* {}", field.label, rendered));
                }
                FieldKind::Plain if !field.value.is_empty() => {
                    lines.push(format!("*{}* {}", field.label, field.value));
                }
                FieldKind::Parent | FieldKind::Plain => {}
            }
        }
    }

    lines.join(LINE_SEPARATOR)
}

/// Escape the HTML entities Slack treats specially.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_and_subject_only_yield_two_lines() {
        let mut record = Record::new();
        record.push(FieldKind::Subject, "Subject", "disk full".to_string());
        record.push(FieldKind::Key, "Number", "INC0010023".to_string());

        let text = compose("<url|INC0010023>".to_string(), Some(&record));

        assert_eq!(text, "<url|INC0010023>\n> disk full");
    }

    #[test]
    fn empty_subject_renders_as_no_subject() {
        let mut record = Record::new();
        record.push(FieldKind::Subject, "Subject", String::new());

        assert_eq!(compose("link".to_string(), Some(&record)), "link\n> No subject");
    }

    #[test]
    fn empty_plain_fields_are_dropped() {
        let mut record = Record::new();
        record.push(FieldKind::Plain, "State", "Open".to_string());
        record.push(FieldKind::Plain, "Assigned To", String::new());

        assert_eq!(compose("link".to_string(), Some(&record)), "link\n> *State* Open");
    }

    #[test]
    fn parent_renders_as_a_link_when_one_is_derived() {
        let mut record = Record::new();
        record.push_linked(
            FieldKind::Parent,
            "Parent",
            "REQ0000001".to_string(),
            Some("https://example.com/req".to_string()),
        );

        assert_eq!(
            compose("link".to_string(), Some(&record)),
            "link\n> *Parent* <https://example.com/req|REQ0000001>"
        );
    }

    #[test]
    fn parent_without_a_link_renders_plain() {
        let mut record = Record::new();
        record.push(FieldKind::Parent, "Parent", "something else".to_string());

        assert_eq!(compose("link".to_string(), Some(&record)), "link\n> *Parent* something else");
    }

    #[test]
    fn no_record_is_just_the_quip_line() {
        assert_eq!(compose("Click me! <url|KB123>".to_string(), None), "Click me! <url|KB123>");
    }

    #[test]
    fn escape_html_covers_slack_entities() {
        assert_eq!(escape_html("a <b> & c"), "a &lt;b&gt; &amp; c");
        assert_eq!(escape_html("plain"), "plain");
    }
}
