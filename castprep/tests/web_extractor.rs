use castprep::{ContentExtractor, ContentType, ExtractError, ListItemType, SourceType};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_html(html: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    server
}

const ARTICLE_PAGE: &str = r#"<html>
<head>
  <title>Rust Patterns in Practice - Example Blog</title>
  <meta name="description" content="A tour of extraction patterns">
  <meta property="og:site_name" content="Example Blog">
</head>
<body>
  <nav><a href="/">home</a><a href="/about">about</a></nav>
  <article class="post-body">
    <h1>Rust Patterns in Practice</h1>
    <p>the opening paragraph walks through why structured extraction beats raw text scraping for downstream consumers of every kind.</p>
    <h2>Ownership</h2>
    <p>the second paragraph covers ownership, borrowing, and how the block model keeps section attribution stable across formats.</p>
    <ul><li>borrow checker</li><li>lifetimes</li></ul>
  </article>
</body>
</html>"#;

#[tokio::test]
async fn test_article_blocks_in_document_order() {
    let server = serve_html(ARTICLE_PAGE).await;
    let url = format!("{}/page", server.uri());

    let extractor = ContentExtractor::new();
    let doc = extractor.process_url(&url).await.expect("extraction failed");

    assert_eq!(doc.source_type, SourceType::Web);
    assert_eq!(doc.title, "Rust Patterns in Practice");
    assert_eq!(doc.content.len(), 5);

    assert_eq!(doc.content[0].content_type, ContentType::Heading);
    assert_eq!(doc.content[0].section_title, "Rust Patterns in Practice");
    assert_eq!(doc.content[0].level, Some(1));

    assert_eq!(doc.content[1].content_type, ContentType::Paragraph);
    assert_eq!(doc.content[1].section_title, "Rust Patterns in Practice");

    assert_eq!(doc.content[2].level, Some(2));
    assert_eq!(doc.content[3].section_title, "Ownership");

    let list = &doc.content[4];
    assert_eq!(list.content_type, ContentType::List);
    assert_eq!(list.section_title, "Ownership");
    assert_eq!(list.list_type, Some(ListItemType::Bullet));
    assert_eq!(list.as_items().unwrap().len(), 2);
}

#[tokio::test]
async fn test_article_metadata() {
    let server = serve_html(ARTICLE_PAGE).await;
    let url = format!("{}/page", server.uri());

    let extractor = ContentExtractor::new();
    let doc = extractor.process_url(&url).await.expect("extraction failed");

    assert_eq!(doc.metadata["url"], url);
    assert_eq!(doc.metadata["domain"], "127.0.0.1");
    assert_eq!(doc.metadata["encoding"], "utf-8");
    assert_eq!(doc.metadata["description"], "A tour of extraction patterns");
    assert_eq!(doc.metadata["og:site_name"], "Example Blog");
    assert_eq!(doc.metadata["has_article"], true);
    assert_eq!(doc.metadata["article_class"][0], "post-body");
}

#[tokio::test]
async fn test_http_403_is_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let extractor = ContentExtractor::new();
    let err = extractor
        .process_url(&format!("{}/page", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::AccessDenied(_)));
}

#[tokio::test]
async fn test_http_404_is_no_valid_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let extractor = ContentExtractor::new();
    let err = extractor
        .process_url(&format!("{}/page", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::NoValidContent(_)));
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let server = serve_html("").await;
    let url = format!("{}/page", server.uri());

    let extractor = ContentExtractor::new();
    let err = extractor.process_url(&url).await.unwrap_err();
    assert!(matches!(err, ExtractError::NoValidContent(_)));
}

#[tokio::test]
async fn test_fallback_to_main_container() {
    // The highest-scoring container holds only raw text nodes; extraction
    // must fall back to <main> and pull its paragraph.
    let chatter = "unstructured filler text without any paragraph markup at all ".repeat(30);
    let html = format!(
        "<html><body>\
         <div id=\"chatter\">{chatter}</div>\
         <main><p>the actual readable paragraph lives here inside a main element.</p></main>\
         </body></html>"
    );
    let server = serve_html(&html).await;
    let url = format!("{}/page", server.uri());

    let extractor = ContentExtractor::new();
    let doc = extractor.process_url(&url).await.expect("extraction failed");

    assert_eq!(doc.content.len(), 1);
    assert_eq!(doc.content[0].content_type, ContentType::Paragraph);
    assert_eq!(doc.content[0].section_title, "Body");
    assert!(doc.content[0]
        .as_plain()
        .unwrap()
        .contains("actual readable paragraph"));
}

#[tokio::test]
async fn test_invalid_url_rejected() {
    let extractor = ContentExtractor::new();
    let err = extractor.process_url("not a url").await.unwrap_err();
    assert!(matches!(err, ExtractError::NoValidContent(_)));
}
