//! Pulls named `<div class="…">` sections out of a full page document.
//!
//! This is a narrow tag scanner, not an HTML parser: it understands tags,
//! quoted attribute values, comments and raw-text elements, which is all the
//! site's content pages contain.

use std::collections::BTreeMap;

pub const SECTION_NAMES: [&str; 5] = ["about", "projects", "photography", "links", "contact"];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag<'a> {
    start: usize,
    end: usize,
    name: String,
    closing: bool,
    attributes: &'a str,
}

/// Every known section present in `document`, keyed by section name.
pub fn extract_sections(document: &str) -> BTreeMap<String, String> {
    SECTION_NAMES
        .iter()
        .filter_map(|name| extract_section(document, name).map(|html| (name.to_string(), html)))
        .collect()
}

/// Outer markup of the first `div` whose class list contains `name`.
pub fn extract_section(document: &str, name: &str) -> Option<String> {
    let mut cursor = 0;
    while let Some(tag) = next_tag(document, cursor) {
        cursor = tag.end;
        if tag.closing || tag.name != "div" {
            continue;
        }
        let matches = class_attribute(tag.attributes)
            .map(|classes| classes.split_ascii_whitespace().any(|class| class == name))
            .unwrap_or(false);
        if matches {
            let end = matching_close(document, tag.end).unwrap_or(document.len());
            return Some(document[tag.start..end].to_string());
        }
    }
    None
}

/// End offset of the `</div>` balancing a `div` opened just before `from`.
fn matching_close(document: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut cursor = from;
    while let Some(tag) = next_tag(document, cursor) {
        cursor = tag.end;
        if tag.name != "div" {
            continue;
        }
        if tag.closing {
            depth -= 1;
            if depth == 0 {
                return Some(tag.end);
            }
        } else {
            depth += 1;
        }
    }
    None
}

fn next_tag(document: &str, from: usize) -> Option<Tag<'_>> {
    let bytes = document.as_bytes();
    let mut position = from;

    while position < bytes.len() {
        let offset = document[position..].find('<')?;
        let start = position + offset;
        let rest = &document[start..];

        if rest.starts_with("<!--") {
            position = match rest.find("-->") {
                Some(close) => start + close + 3,
                None => return None,
            };
            continue;
        }

        let mut index = start + 1;
        let closing = bytes.get(index) == Some(&b'/');
        if closing {
            index += 1;
        }
        let name_start = index;
        // Tag names start with a letter; `<3` or `<2019` is plain text.
        if bytes.get(index).is_some_and(u8::is_ascii_alphabetic) {
            while index < bytes.len()
                && (bytes[index].is_ascii_alphanumeric() || bytes[index] == b'-')
            {
                index += 1;
            }
        }
        if index == name_start {
            // A stray `<`, `<!doctype …>` or `<?…>`; skip the bracket.
            if !closing && matches!(bytes.get(index), Some(b'!') | Some(b'?')) {
                position = document[index..]
                    .find('>')
                    .map(|close| index + close + 1)?;
            } else {
                position = start + 1;
            }
            continue;
        }
        let name = document[name_start..index].to_ascii_lowercase();
        let attributes_start = index;
        let end = tag_end(bytes, index)?;
        let attributes = document[attributes_start..end - 1].trim_end_matches('/');

        if !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let close_marker = format!("</{name}");
            let lower_tail = document[end..].to_ascii_lowercase();
            let skip_to = lower_tail
                .find(&close_marker)
                .map(|close| end + close)
                .unwrap_or(document.len());
            return Some(Tag {
                start,
                end: skip_to,
                name,
                closing,
                attributes,
            });
        }

        return Some(Tag {
            start,
            end,
            name,
            closing,
            attributes,
        });
    }
    None
}

/// Offset just past the `>` closing a tag, honouring quoted attribute values.
fn tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, byte) in bytes[from..].iter().enumerate() {
        match (quote, *byte) {
            (Some(open), current) if current == open => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(*byte),
            (None, b'>') => return Some(from + offset + 1),
            (None, _) => {}
        }
    }
    None
}

fn class_attribute(attributes: &str) -> Option<&str> {
    let bytes = attributes.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        while index < bytes.len() && (bytes[index].is_ascii_whitespace() || bytes[index] == b'/') {
            index += 1;
        }
        let name_start = index;
        while index < bytes.len()
            && !bytes[index].is_ascii_whitespace()
            && bytes[index] != b'='
            && bytes[index] != b'/'
        {
            index += 1;
        }
        let name = &attributes[name_start..index];
        while index < bytes.len() && bytes[index].is_ascii_whitespace() {
            index += 1;
        }

        let mut value = "";
        if bytes.get(index) == Some(&b'=') {
            index += 1;
            while index < bytes.len() && bytes[index].is_ascii_whitespace() {
                index += 1;
            }
            match bytes.get(index) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = index + 1;
                    let value_end = attributes[value_start..]
                        .find(quote as char)
                        .map(|close| value_start + close)
                        .unwrap_or(attributes.len());
                    value = &attributes[value_start..value_end];
                    index = (value_end + 1).min(attributes.len());
                }
                _ => {
                    let value_start = index;
                    while index < bytes.len() && !bytes[index].is_ascii_whitespace() {
                        index += 1;
                    }
                    value = &attributes[value_start..index];
                }
            }
        }

        if name.eq_ignore_ascii_case("class") {
            return Some(value);
        }
        if name.is_empty() && index == name_start {
            index += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <style>.about > div { color: red; }</style>
  <script>const html = "<div class='about'>fake</div>";</script>
</head>
<body>
  <!-- <div class="about">commented out</div> -->
  <div id="terminal-header">banner</div>
  <div class="about">
    <p class="line">Hello</p>
    <div class="inner"><span>nested</span></div>
    <p class="line">World</p>
  </div>
  <div class="links wide"><a href="/x">x</a></div>
</body>
</html>"#;

    #[test]
    fn extracts_outer_markup_of_simple_section() {
        let html = extract_section(r#"<body><div class="about">X</div></body>"#, "about");
        assert_eq!(html.as_deref(), Some(r#"<div class="about">X</div>"#));
    }

    #[test]
    fn balances_nested_divs() {
        let html = extract_section(PAGE, "about").expect("about section");
        assert!(html.starts_with(r#"<div class="about">"#), "{html}");
        assert!(html.ends_with("World</p>\n  </div>"), "{html}");
        assert!(html.contains("nested"));
        assert!(!html.contains("links"), "section overran its end: {html}");
    }

    #[test]
    fn skips_comments_and_raw_text() {
        let html = extract_section(PAGE, "about").expect("about section");
        assert!(!html.contains("fake"));
        assert!(!html.contains("commented out"));
    }

    #[test]
    fn matches_one_class_among_many() {
        let html = extract_section(PAGE, "wide").expect("multi-class div");
        assert!(html.contains(r#"href="/x""#));
        let links = extract_section(PAGE, "links").expect("links section");
        assert_eq!(html, links);
    }

    #[test]
    fn class_match_is_exact_token() {
        assert_eq!(
            extract_section(r#"<div class="about-me">X</div>"#, "about"),
            None
        );
    }

    #[test]
    fn accepts_single_and_unquoted_class_values() {
        assert!(extract_section("<div class='contact'>mail</div>", "contact").is_some());
        assert!(extract_section("<DIV CLASS=contact>mail</DIV>", "contact").is_some());
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let doc = r#"<div data-x="a>b" class="projects">P</div>"#;
        assert_eq!(extract_section(doc, "projects").as_deref(), Some(doc));
    }

    #[test]
    fn unterminated_section_runs_to_document_end() {
        let doc = r#"<div class="about"><p>open"#;
        assert_eq!(extract_section(doc, "about").as_deref(), Some(doc));
    }

    #[test]
    fn absent_sections_are_left_out() {
        let sections = extract_sections(PAGE);
        let names: Vec<&str> = sections.keys().map(String::as_str).collect();
        assert_eq!(names, ["about", "links"]);
    }

    #[test]
    fn less_than_before_a_digit_is_text() {
        let doc = r#"<div class="about">I <3 photos, don't you?</div><div class="links">L</div>"#;
        assert_eq!(
            extract_section(doc, "about").as_deref(),
            Some(r#"<div class="about">I <3 photos, don't you?</div>"#)
        );
        assert_eq!(
            extract_section(doc, "links").as_deref(),
            Some(r#"<div class="links">L</div>"#)
        );
    }

    #[test]
    fn stray_brackets_do_not_start_tags() {
        let doc = "<div class='contact'>since </2019 and a < b</div><div class='projects'>P</div>";
        assert_eq!(
            extract_section(doc, "contact").as_deref(),
            Some("<div class='contact'>since </2019 and a < b</div>")
        );
        let sections = extract_sections(doc);
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn first_matching_div_wins() {
        let doc = r#"<div class="about">one</div><div class="about">two</div>"#;
        assert_eq!(
            extract_section(doc, "about").as_deref(),
            Some(r#"<div class="about">one</div>"#)
        );
    }
}
