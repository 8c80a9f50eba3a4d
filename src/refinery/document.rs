// * Parsed document handle and read-only tree queries.
// * Every lookup returns Option so "structure absent" is a checked outcome.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static SELECTOR_ANY_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid table selector"));

const NBSP: char = '\u{a0}';

/// Read-only parsed document shared by every extractor.
///
/// Some sites ship their stat tables inside HTML comments so that only a
/// script can render them. `from_comments` and `parse_with_comments` hand the
/// extractors a tree that contains those hidden tables.
#[derive(Debug, Clone)]
pub struct StatDocument {
    html: Html,
}

impl StatDocument {
    /// Parses markup as-is (HTML or XML fragments)
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Parses only the contents of the comment nodes found in `markup`
    pub fn from_comments(markup: &str) -> Self {
        Self::parse(&collect_comments(markup))
    }

    /// Parses the visible markup followed by everything hidden in comments
    pub fn parse_with_comments(markup: &str) -> Self {
        let mut combined = String::with_capacity(markup.len() * 2);
        combined.push_str(markup);
        combined.push_str(&collect_comments(markup));
        Self::parse(&combined)
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Finds the first `tag` element whose `id` attribute equals `id`
    pub fn find_by_id(&self, tag: &str, id: &str) -> Option<ElementRef<'_>> {
        if tag == "table" {
            return self
                .html
                .select(&SELECTOR_ANY_TABLE)
                .find(|el| el.value().attr("id") == Some(id));
        }

        let selector = Selector::parse(tag).ok()?;
        self.html
            .select(&selector)
            .find(|el| el.value().attr("id") == Some(id))
    }

    /// Finds the table with the given id
    pub fn find_table(&self, table_id: &str) -> Option<ElementRef<'_>> {
        self.find_by_id("table", table_id)
    }

    /// First element matching a CSS selector
    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(css).ok()?;
        self.html.select(&selector).next()
    }

    /// Every element matching a CSS selector, in document order
    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }
}

// * Concatenates the text of every comment node in document order
fn collect_comments(markup: &str) -> String {
    let raw = Html::parse_document(markup);
    raw.tree
        .nodes()
        .filter_map(|node| node.value().as_comment().map(|c| String::from(&**c)))
        .collect::<Vec<_>>()
        .join("")
}

/// Rendered text of an element: NBSP normalised to a space, then trimmed
pub fn cell_text(element: &ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.replace(NBSP, " ").trim().to_string()
}

/// Attribute value of an element
pub fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// True when the element carries `class` in its class list
pub fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// First descendant matching a CSS selector
pub fn find_child<'a>(element: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

/// Nearest ancestor that is an element
pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Direct element children, in document order
pub fn child_elements<'a>(element: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_table_by_id() {
        let doc = StatDocument::parse(
            r#"<table id="a"><tr><td>1</td></tr></table><table id="b"><tr><td>2</td></tr></table>"#,
        );
        let table = doc.find_table("b").unwrap();
        assert_eq!(cell_text(&table), "2");
        assert!(doc.find_table("missing").is_none());
    }

    #[test]
    fn test_comment_hidden_table() {
        let markup = r#"
            <div id="all_total"><!--
                <table id="total"><thead><tr><th>Split</th></tr></thead></table>
            --></div>
        "#;

        // * The visible tree has no table, the comment tree does
        assert!(StatDocument::parse(markup).find_table("total").is_none());
        assert!(StatDocument::from_comments(markup).find_table("total").is_some());
        assert!(StatDocument::parse_with_comments(markup).find_table("total").is_some());
    }

    #[test]
    fn test_cell_text_normalises_nbsp() {
        let doc = StatDocument::parse("<table><tr><td>David\u{a0}Ortiz </td></tr></table>");
        let td = doc.select_first("td").unwrap();
        assert_eq!(cell_text(&td), "David Ortiz");
    }

    #[test]
    fn test_parent_and_children() {
        let doc = StatDocument::parse(r#"<table><tr id="r"><td>a</td><th>b</th></tr></table>"#);
        let td = doc.select_first("td").unwrap();
        let row = parent_element(&td).unwrap();
        assert_eq!(attr(&row, "id"), Some("r"));
        assert_eq!(child_elements(&row).len(), 2);
    }

    #[test]
    fn test_invalid_selector_is_none() {
        let doc = StatDocument::parse("<p>x</p>");
        assert!(doc.select_first("[[").is_none());
        assert!(doc.select_all("[[").is_empty());
    }
}
