use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use url::Url;

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, Result};
use crate::models::{
    ContentBlock, ContentDocument, ListItem, ListItemType, Metadata, SourceType,
};

const DEFAULT_SECTION: &str = "Body";
const CAUTIONS: &str = "Web pages may include ads or other unrelated content";

/// Paragraph text at or below this length is discarded as noise.
const MIN_PARAGRAPH_CHARS: usize = 10;
/// Containers with less readable text than this are not scored.
const MIN_CANDIDATE_CHARS: usize = 100;

fn positive_hint() -> &'static Regex {
    static HINT: OnceLock<Regex> = OnceLock::new();
    HINT.get_or_init(|| {
        Regex::new(r"article|body|content|entry|main|post|story|text").expect("invalid regex")
    })
}

fn negative_hint() -> &'static Regex {
    static HINT: OnceLock<Regex> = OnceLock::new();
    HINT.get_or_init(|| {
        Regex::new(r"comment|sidebar|footer|header|nav|menu|banner|promo|advert|share|social")
            .expect("invalid regex")
    })
}

fn content_class_hint() -> &'static Regex {
    static HINT: OnceLock<Regex> = OnceLock::new();
    HINT.get_or_init(|| Regex::new(r"(?i)content|main|article").expect("invalid regex"))
}

pub struct WebExtractor {
    client: reqwest::Client,
}

impl WebExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,zh-CN;q=0.8"),
        );

        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.http_timeout_secs))
                .user_agent(config.user_agent.clone())
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetches a page and extracts its main content as structured blocks.
    /// One fetch per call, no retry; a timeout or connection failure
    /// propagates immediately.
    pub async fn extract(&self, url: &str) -> Result<ContentDocument> {
        let parsed = Url::parse(url)
            .map_err(|e| ExtractError::NoValidContent(format!("invalid URL '{url}': {e}")))?;
        if parsed.host_str().is_none() {
            return Err(ExtractError::NoValidContent(format!(
                "invalid URL '{url}': missing host"
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ExtractError::NoValidContent(format!("failed to fetch page: {e}")))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(ExtractError::AccessDenied(format!(
                "access to {url} was refused (HTTP 403)"
            )));
        }
        if !status.is_success() {
            return Err(ExtractError::NoValidContent(format!(
                "fetch of {url} failed with HTTP {status}"
            )));
        }

        let final_url = response.url().clone();
        let content_type = header_value(response.headers(), "content-type");
        let last_modified = header_value(response.headers(), "last-modified");

        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::NoValidContent(format!("failed to read page body: {e}")))?;

        Self::build_document(&body, &final_url, content_type, last_modified)
    }

    /// Synchronous HTML half of the extraction; kept free of awaits so the
    /// parsed DOM never lives across a suspension point.
    fn build_document(
        body: &str,
        final_url: &Url,
        content_type: Option<String>,
        last_modified: Option<String>,
    ) -> Result<ContentDocument> {
        let document = Html::parse_document(body);

        let root = main_content_root(&document);

        let mut blocks = Vec::new();
        let mut section = DEFAULT_SECTION.to_string();
        if let Some(root) = root {
            walk_content(root, &mut blocks, &mut section);
        }

        if blocks.is_empty() {
            tracing::debug!(url = %final_url, "readability pass found nothing, trying container fallback");
            if let Some(fallback) = fallback_root(&document) {
                let mut section = DEFAULT_SECTION.to_string();
                walk_content(fallback, &mut blocks, &mut section);
            }
        }

        if blocks.is_empty() {
            return Err(ExtractError::NoValidContent(format!(
                "no extractable content found at {final_url}"
            )));
        }

        let metadata = Self::extract_metadata(&document, root, final_url, content_type, last_modified);
        let title = page_title(&document, root, final_url);

        Ok(ContentDocument {
            source_type: SourceType::Web,
            title,
            metadata,
            content: blocks,
            key_points: Vec::new(),
            cautions: CAUTIONS.to_string(),
        })
    }

    fn extract_metadata(
        document: &Html,
        root: Option<ElementRef>,
        final_url: &Url,
        content_type: Option<String>,
        last_modified: Option<String>,
    ) -> Metadata {
        let mut metadata = Metadata::new();

        metadata.insert("url".to_string(), json!(final_url.as_str()));
        metadata.insert(
            "domain".to_string(),
            json!(final_url.host_str().unwrap_or_default()),
        );
        let encoding = content_type
            .as_deref()
            .and_then(parse_charset)
            .unwrap_or_else(|| "utf-8".to_string());
        if let Some(content_type) = content_type {
            metadata.insert("content_type".to_string(), json!(content_type));
        }
        if let Some(last_modified) = last_modified {
            metadata.insert("last_modified".to_string(), json!(last_modified));
        }
        metadata.insert("encoding".to_string(), json!(encoding));

        let meta_selector = Selector::parse("meta").unwrap();
        for tag in document.select(&meta_selector) {
            let key = tag
                .value()
                .attr("name")
                .or_else(|| tag.value().attr("property"));
            let content = tag.value().attr("content");
            if let (Some(key), Some(content)) = (key, content) {
                if !key.is_empty() {
                    metadata.insert(key.to_string(), json!(content));
                }
            }
        }

        // Flag an <article> element inside the chosen main-content subtree.
        if let Some(root) = root {
            let article_selector = Selector::parse("article").unwrap();
            let article = if root.value().name() == "article" {
                Some(root)
            } else {
                root.select(&article_selector).next()
            };
            if let Some(article) = article {
                metadata.insert("has_article".to_string(), json!(true));
                let classes: Vec<&str> = article.value().classes().collect();
                metadata.insert("article_class".to_string(), json!(classes));
            }
        }

        metadata
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn parse_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("charset="))
        .map(|charset| charset.trim_matches('"').to_lowercase())
}

/// Visible text of an element, whitespace-collapsed.
fn element_text(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn readable_len(el: ElementRef) -> usize {
    el.text().map(|t| t.trim().chars().count()).sum()
}

/// Readability-style main-content pass: score candidate containers by
/// link-discounted text mass with class/id hints, then prefer the deepest
/// candidate near the best score, since wrappers enclosing the article tie
/// with it on raw text.
fn main_content_root(document: &Html) -> Option<ElementRef> {
    let candidate_selector = Selector::parse("article, main, section, div").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();
    let body_selector = Selector::parse("body").unwrap();

    let mut best_score = 0.0_f64;
    let mut candidates: Vec<(f64, usize, ElementRef)> = Vec::new();

    for el in document.select(&candidate_selector) {
        let text_len = readable_len(el);
        if text_len < MIN_CANDIDATE_CHARS {
            continue;
        }
        let link_len: usize = el.select(&anchor_selector).map(readable_len).sum();
        let score = text_len.saturating_sub(link_len.min(text_len)) as f64 * hint_weight(el);
        if score <= 0.0 {
            continue;
        }
        best_score = best_score.max(score);
        candidates.push((score, el.ancestors().count(), el));
    }

    candidates
        .into_iter()
        .filter(|(score, _, _)| *score >= best_score * 0.8)
        .max_by(|(score_a, depth_a, _), (score_b, depth_b, _)| {
            depth_a
                .cmp(depth_b)
                .then(score_a.partial_cmp(score_b).unwrap_or(std::cmp::Ordering::Equal))
        })
        .map(|(_, _, el)| el)
        .or_else(|| document.select(&body_selector).next())
}

fn hint_weight(el: ElementRef) -> f64 {
    let mut ident = String::new();
    if let Some(class) = el.value().attr("class") {
        ident.push_str(class);
    }
    if let Some(id) = el.value().attr("id") {
        ident.push(' ');
        ident.push_str(id);
    }
    let ident = ident.to_lowercase();

    let mut weight = match el.value().name() {
        "article" | "main" => 1.5,
        _ => 1.0,
    };
    if positive_hint().is_match(&ident) {
        weight *= 1.25;
    }
    if negative_hint().is_match(&ident) {
        weight *= 0.25;
    }
    weight
}

/// Container heuristic used when the readability pass yields no blocks:
/// `main`, then `article`, then a `div` with a content-ish class name.
fn fallback_root(document: &Html) -> Option<ElementRef> {
    let main_selector = Selector::parse("main").unwrap();
    let article_selector = Selector::parse("article").unwrap();
    let div_selector = Selector::parse("div").unwrap();

    document
        .select(&main_selector)
        .next()
        .or_else(|| document.select(&article_selector).next())
        .or_else(|| {
            document.select(&div_selector).find(|div| {
                div.value()
                    .attr("class")
                    .is_some_and(|class| content_class_hint().is_match(class))
            })
        })
}

/// Walks a subtree in document order, emitting heading, paragraph, and list
/// blocks. Each heading updates the current section; matched subtrees are
/// not re-descended.
fn walk_content(root: ElementRef, blocks: &mut Vec<ContentBlock>, section: &mut String) {
    let li_selector = Selector::parse("li").unwrap();

    for child in root.children() {
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };
        let tag = el.value().name();
        match tag {
            "script" | "style" | "noscript" => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let text = element_text(el);
                if !text.is_empty() {
                    let level: u8 = tag[1..].parse().unwrap_or(1);
                    *section = text.clone();
                    blocks.push(ContentBlock::heading(text, level));
                }
            }
            "p" => {
                let text = element_text(el);
                if text.chars().count() > MIN_PARAGRAPH_CHARS {
                    blocks.push(ContentBlock::paragraph(section.clone(), text));
                }
            }
            "ul" | "ol" => {
                let item_type = if tag == "ul" {
                    ListItemType::Bullet
                } else {
                    ListItemType::Number
                };
                let items: Vec<ListItem> = el
                    .select(&li_selector)
                    .filter_map(|li| {
                        let text = element_text(li);
                        (!text.is_empty()).then_some(ListItem { text, item_type })
                    })
                    .collect();
                if !items.is_empty() {
                    blocks.push(ContentBlock::list(section.clone(), items));
                }
            }
            _ => walk_content(el, blocks, section),
        }
    }
}

fn page_title(document: &Html, root: Option<ElementRef>, final_url: &Url) -> String {
    let title_selector = Selector::parse("title").unwrap();
    if let Some(el) = document.select(&title_selector).next() {
        let text = element_text(el);
        if !text.is_empty() {
            return clean_title(&text);
        }
    }

    let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    if let Some(root) = root {
        if let Some(heading) = root.select(&heading_selector).next() {
            let text = element_text(heading);
            if !text.is_empty() {
                return text;
            }
        }
    }

    final_url.host_str().unwrap_or_default().to_string()
}

/// Page titles routinely carry a trailing site name; keep the longest
/// separator-delimited segment.
fn clean_title(title: &str) -> String {
    for separator in [" | ", " - ", " – ", " — ", " :: "] {
        if title.contains(separator) {
            return title
                .split(separator)
                .map(str::trim)
                .max_by_key(|segment| segment.chars().count())
                .unwrap_or(title)
                .to_string();
        }
    }
    title.trim().to_string()
}
