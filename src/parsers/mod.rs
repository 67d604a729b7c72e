pub mod html;


use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// First dollar amount on a page, e.g. `$1,299.00`
static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+(\.\d{2})?").expect("valid price pattern"));

/// Enum to represent the kinds of content a tracked page can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML document
    Html,
    /// Plain text (robots.txt, changelogs, YAML feeds...)
    Text,
}

impl ParserType {
    /// Determines the parser type based on the URL
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".txt")
            || path.ends_with(".md")
            || path.ends_with(".yaml")
            || path.ends_with(".yml")
        {
            ::log::debug!("Classifying as Text: {}", url);
            ParserType::Text
        } else {
            ParserType::Html
        }
    }

    /// Determines the parser type from a Content-Type header, falling back to the URL
    pub fn from_content_type(content_type: Option<&str>, url: &str) -> Self {
        match content_type {
            Some(ct) if ct.starts_with("text/plain") || ct.starts_with("text/markdown") => {
                ParserType::Text
            }
            Some(ct) if ct.contains("html") => ParserType::Html,
            _ => Self::from_url(url),
        }
    }
}

/// Options controlling what the extractor keeps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Also drop `nav`, `header` and `footer` blocks
    #[serde(default)]
    pub strip_layout: bool,

    /// Maximum number of list items kept as features
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Pages with less extracted text than this are treated as unreachable
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
}

fn default_max_features() -> usize {
    20
}

fn default_min_content_length() -> usize {
    50
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strip_layout: false,
            max_features: default_max_features(),
            min_content_length: default_min_content_length(),
        }
    }
}

/// Text and signals extracted from a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page title (if available)
    pub title: Option<String>,
    /// Visible text, whitespace collapsed
    pub text: String,
    /// First price-like token
    pub price: Option<String>,
    /// List items that look like feature bullets
    pub features: Vec<String>,
}

/// Main parser that delegates to the format specific extractor
pub struct Parser;

impl Parser {
    /// Extract content based on the parser type
    pub fn extract(content: &str, parser_type: ParserType, options: &ExtractOptions) -> PageContent {
        match parser_type {
            ParserType::Html => html::extract(content, options),
            ParserType::Text => {
                let text = collapse_whitespace(content);
                PageContent {
                    title: None,
                    price: find_price(&text),
                    text,
                    features: Vec::new(),
                }
            }
        }
    }

    /// Determine parser type from URL and then extract content
    pub fn extract_from_url(content: &str, url: &str, options: &ExtractOptions) -> PageContent {
        Self::extract(content, ParserType::from_url(url), options)
    }
}

/// Collapses whitespace runs into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the first dollar amount in the text
pub fn find_price(text: &str) -> Option<String> {
    PRICE_PATTERN.find(text).map(|m| m.as_str().to_string())
}
