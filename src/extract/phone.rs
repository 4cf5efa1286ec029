use super::{ExtractError, FieldExtractor};
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::sync::LazyLock;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?[0-9]{1,4}[\s.-]?)?(\(?[0-9]{2,5}\)?[\s.-]?)?([0-9]{3,5}[\s.-]?[0-9]{3,5}|[0-9]{7,12})")
        .expect("Failed to compile phone regex")
});

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("Failed to parse body selector"));

/// Elements whose text never renders
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Shortest digit count accepted as a phone number
const MIN_PHONE_DIGITS: usize = 8;

/// Phone candidates from the visible body text
#[derive(Debug, Clone, Default)]
pub struct RegexPhoneExtractor;

impl RegexPhoneExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Candidates from already-extracted text
    pub fn find_in_text(text: &str) -> Vec<String> {
        PHONE_RE
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|candidate| count_digits(candidate) >= MIN_PHONE_DIGITS)
            .collect()
    }
}

impl FieldExtractor for RegexPhoneExtractor {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn extract(&self, html: &str) -> Result<Vec<String>, ExtractError> {
        Ok(Self::find_in_text(&visible_text(html)))
    }
}

pub fn count_digits(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

/// Concatenated text nodes of the body, skipping script-like elements
///
/// Text nodes are joined without separators, the way a DOM `textContent`
/// read of the body would.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    for node in root.descendants() {
        if let Node::Text(chunk) = node.value() {
            let hidden = node
                .ancestors()
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| HIDDEN_TAGS.contains(&element.name()));
            if !hidden {
                text.push_str(chunk);
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phones(html: &str) -> Vec<String> {
        RegexPhoneExtractor::new().extract(html).unwrap()
    }

    #[test]
    fn test_us_number_with_parentheses() {
        let found = phones("<html><body><p>Call us at (415) 626-4474 today</p></body></html>");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("626-4474"));
        assert!(found[0].contains("415"));
    }

    #[test]
    fn test_international_number() {
        let found = phones("<body><footer>Tel: +44 20 7946 0958</footer></body>");
        assert_eq!(found.len(), 1);
        assert_eq!(count_digits(&found[0]), 12);
    }

    #[test]
    fn test_short_numbers_are_dropped() {
        assert!(phones("<body><p>Call 555-1234 or visit suite 42</p></body>").is_empty());
        assert!(phones("<body><p>Established 1998</p></body>").is_empty());
    }

    #[test]
    fn test_script_text_is_ignored() {
        let html = r#"<html><body>
            <script>var tracking = "4156264474";</script>
            <style>.x { width: 12345678px }</style>
            <p>No phone here</p>
        </body></html>"#;
        assert!(phones(html).is_empty());
    }

    #[test]
    fn test_visible_text_joins_nodes() {
        let text = visible_text("<body><span>Ab</span><b>cd</b><script>x</script></body>");
        assert_eq!(text, "Abcd");
    }

    #[test]
    fn test_multiple_numbers_in_document_order() {
        let html = "<body><p>Sales: 0800 123 4567</p><p>Support: (415) 626-4474</p></body>";
        let found = phones(html);
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("0800"));
    }
}
