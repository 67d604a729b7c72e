use crate::parsers::{ExtractOptions, PageContent, collapse_whitespace, find_price};
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static LIST_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul li, ol li").expect("valid selector"));

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Page chrome dropped when `strip_layout` is set
const LAYOUT_ELEMENTS: [&str; 3] = ["nav", "header", "footer"];

/// Feature bullets shorter or longer than this are ignored
const FEATURE_MIN_CHARS: usize = 10;
const FEATURE_MAX_CHARS: usize = 200;

/// Extracts visible text, title, price and feature bullets from an HTML document
pub fn extract(html: &str, options: &ExtractOptions) -> PageContent {
    let doc = Html::parse_document(html);

    let text = doc
        .select(&BODY)
        .next()
        .map(|body| visible_text(body, options))
        .unwrap_or_default();

    let title = doc
        .select(&TITLE)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let features = extract_features(&doc, options);
    let price = find_price(&text);

    ::log::debug!(
        "HTML extractor kept {} chars, {} features, price {:?}",
        text.len(),
        features.len(),
        price
    );

    PageContent {
        title,
        text,
        price,
        features,
    }
}

/// Extracts only the visible text of an HTML document
pub fn extract_text(html: &str, options: &ExtractOptions) -> String {
    let doc = Html::parse_document(html);
    doc.select(&BODY)
        .next()
        .map(|body| visible_text(body, options))
        .unwrap_or_default()
}

/// Joins the text nodes under `root` that are not inside a skipped element
fn visible_text(root: ElementRef<'_>, options: &ExtractOptions) -> String {
    let pieces = root
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| is_skipped(el.name(), options))
                });
                let text: &str = text;
                (!hidden).then_some(text)
            }
            _ => None,
        })
        .collect::<Vec<_>>();

    collapse_whitespace(&pieces.join(" "))
}

fn is_skipped(name: &str, options: &ExtractOptions) -> bool {
    SKIPPED_ELEMENTS.contains(&name) || (options.strip_layout && LAYOUT_ELEMENTS.contains(&name))
}

/// List items of a sensible length, in document order
fn extract_features(doc: &Html, options: &ExtractOptions) -> Vec<String> {
    doc.select(&LIST_ITEMS)
        .map(|li| visible_text(li, options))
        .filter(|text| {
            let len = text.chars().count();
            len > FEATURE_MIN_CHARS && len < FEATURE_MAX_CHARS
        })
        .take(options.max_features)
        .collect()
}
