// src/fetch/html.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("valid selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

/// Bracketed footnote markers, e.g. `[4]` or `[note 1]`.
static FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("valid footnote regex"));

/// One `<td>` worth of content, captured in the two forms the pipelines
/// read.
#[derive(Debug, Clone)]
pub struct Cell {
    /// All text content, whitespace-collapsed and trimmed.
    pub text: String,
    /// Text of the last anchor in the cell, if any. Name columns on the
    /// scraped pages nest the useful link after icon markup.
    pub link_text: Option<String>,
}

impl Cell {
    fn from_element(el: ElementRef) -> Self {
        let text = collapse_ws(&el.text().collect::<String>());
        let link_text = el
            .select(&ANCHOR)
            .last()
            .map(|a| collapse_ws(&a.text().collect::<String>()))
            .filter(|s| !s.is_empty());
        Cell { text, link_text }
    }
}

/// The `td` cells of every row under the first `tbody` of the document.
/// Header rows, which carry no `td` children, come back empty. A page
/// without a table body yields no rows at all.
pub fn first_table_body(page: &str) -> Vec<Vec<Cell>> {
    let doc = Html::parse_document(page);
    let Some(body) = doc.select(&TBODY).next() else {
        return Vec::new();
    };
    body.select(&TR)
        .map(|row| row.select(&TD).map(Cell::from_element).collect())
        .collect()
}

/// Strip footnote brackets and digit-group commas from a scraped numeric
/// cell. What remains is handed to the numeric parser as-is.
pub fn clean_numeric(s: &str) -> String {
    FOOTNOTE.replace_all(s, "").replace(',', "").trim().to_string()
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cells_of_first_table_body() {
        let page = r#"<html><body>
            <table><tbody>
                <tr><th>Header</th></tr>
                <tr><td>1</td><td><span class="flagicon">us</span> <a href="#">Big Bank</a></td><td>432.92</td></tr>
            </tbody></table>
            <table><tbody><tr><td>second table</td></tr></tbody></table>
        </body></html>"#;

        let rows = first_table_body(page);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());

        let cells = &rows[1];
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].text, "1");
        assert_eq!(cells[1].text, "us Big Bank");
        assert_eq!(cells[1].link_text.as_deref(), Some("Big Bank"));
        assert_eq!(cells[2].text, "432.92");
        assert_eq!(cells[2].link_text, None);
    }

    #[test]
    fn missing_table_body_yields_no_rows() {
        assert!(first_table_body("<html><body><p>no table</p></body></html>").is_empty());
    }

    #[test]
    fn numeric_cleanup_strips_footnotes_and_commas() {
        assert_eq!(clean_numeric(" 4,997.79 [note 2] "), "4997.79");
        assert_eq!(clean_numeric("2005[4]"), "2005");
        assert_eq!(clean_numeric("TBA"), "TBA");
    }
}
