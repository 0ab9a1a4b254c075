//! End-to-end pipeline tests against a scripted origin.
//!
//! Each test serves a page from wiremock and runs the full
//! normalize → fetch → extract pass over it.

use metalens::error::MetalensError;
use metalens::extract::{
    Backend, ExtractorConfig, MetaTagKind, OpenGraphKind, TwitterKind, UnknownKeys,
};
use metalens::pipeline::Pipeline;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html><head>
<meta charset="utf-8">
<meta property="og:title" content="First title">
<meta property="og:title" content="Second title">
<meta name="description" content="Desc &amp; more">
<meta name="description" content="Final desc">
<meta property="og:image" content="https://cdn.example.com/a.png">
<meta property="article:author" content="Ann">
<meta name="twitter:card" content="summary">
<link rel="canonical" href="https://example.com/a">
<link rel="canonical" href="https://example.com/b">
</head><body></body></html>"#;

async fn mount_html(origin: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(origin)
        .await;
}

#[tokio::test]
async fn pipeline_distills_a_full_page() {
    let origin = MockServer::start().await;
    mount_html(&origin, "/article", ARTICLE).await;

    let m = Pipeline::new()
        .run(&format!("{}/article", origin.uri()))
        .await
        .unwrap();

    // No <title> element, so the first og:title occurrence names the page,
    // while the map itself keeps the last one.
    assert_eq!(m.title, "First title");
    assert_eq!(m.og(OpenGraphKind::Title), Some("Second title"));
    assert_eq!(m.meta_tag(MetaTagKind::Description), Some("Final desc"));
    assert_eq!(
        m.meta_tag(MetaTagKind::Canonical),
        Some("https://example.com/a")
    );
    assert_eq!(m.og(OpenGraphKind::ArticleAuthor), Some("Ann"));
    assert_eq!(m.twitter(TwitterKind::Card), Some("summary"));
    // A canonical link is present, so og:url is not backfilled.
    assert_eq!(m.og(OpenGraphKind::Url), None);
}

#[tokio::test]
async fn entities_decode_exactly_once() {
    let origin = MockServer::start().await;
    mount_html(
        &origin,
        "/entities",
        "<html><head><title>Tom &amp; Jerry</title>\
         <meta name=\"description\" content=\"A &lt;b&gt; B &amp;amp; C\">\
         </head></html>",
    )
    .await;

    let m = Pipeline::new()
        .run(&format!("{}/entities", origin.uri()))
        .await
        .unwrap();

    assert_eq!(m.title, "Tom & Jerry");
    // The double-encoded ampersand survives one level of decoding.
    assert_eq!(m.meta_tag(MetaTagKind::Description), Some("A <b> B &amp; C"));
}

#[tokio::test]
async fn bare_page_gets_fallbacks() {
    let origin = MockServer::start().await;
    mount_html(&origin, "/bare", "<html><head></head><body></body></html>").await;
    let target = format!("{}/bare", origin.uri());

    let m = Pipeline::new().run(&target).await.unwrap();

    assert_eq!(m.title, "No title found");
    assert!(m.meta.is_empty());
    assert!(m.twitter.is_empty());
    // Neither og:url nor a canonical link, so the fetched URL fills in.
    assert_eq!(m.og(OpenGraphKind::Url), Some(target.as_str()));
}

#[tokio::test]
async fn mangled_scheme_is_repaired_before_fetching() {
    let origin = MockServer::start().await;
    mount_html(&origin, "/article", ARTICLE).await;

    let mangled = format!("{}/article", origin.uri().replace("http://", "htp://"));
    let m = Pipeline::new().run(&mangled).await.unwrap();

    assert_eq!(m.title, "First title");
}

#[tokio::test]
async fn redirects_are_followed() {
    let origin = MockServer::start().await;
    let landing = format!("{}/new", origin.uri());
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", landing.as_str()))
        .mount(&origin)
        .await;
    mount_html(
        &origin,
        "/new",
        "<html><head><title>Landed</title></head></html>",
    )
    .await;

    let m = Pipeline::new()
        .run(&format!("{}/old", origin.uri()))
        .await
        .unwrap();

    assert_eq!(m.title, "Landed");
}

#[tokio::test]
async fn scan_backend_agrees_with_dom_end_to_end() {
    let origin = MockServer::start().await;
    mount_html(&origin, "/article", ARTICLE).await;
    let target = format!("{}/article", origin.uri());

    let dom = Pipeline::new().run(&target).await.unwrap();
    let scan = Pipeline::with_extractor(ExtractorConfig {
        backend: Backend::Scan,
        ..Default::default()
    })
    .run(&target)
    .await
    .unwrap();

    assert_eq!(dom, scan);
    assert_eq!(scan.title, "First title");
}

#[tokio::test]
async fn unknown_keys_are_kept_only_when_asked() {
    let origin = MockServer::start().await;
    mount_html(
        &origin,
        "/custom",
        "<html><head><title>C</title>\
         <meta property=\"og:custom\" content=\"x\">\
         <meta name=\"twitter:label1\" content=\"Reading time\">\
         <meta property=\"fb:app_id\" content=\"123\">\
         <meta name=\"parsely-type\" content=\"post\">\
         </head></html>",
    )
    .await;
    let target = format!("{}/custom", origin.uri());

    let dropped = Pipeline::new().run(&target).await.unwrap();
    assert!(dropped.unrecognized.is_empty());

    let kept = Pipeline::with_extractor(ExtractorConfig {
        unknown_keys: UnknownKeys::Retain,
        ..Default::default()
    })
    .run(&target)
    .await
    .unwrap();

    // Only the Open Graph and Twitter namespaces are retained; other
    // vendors' keys stay out either way.
    assert_eq!(kept.unrecognized.len(), 2);
    assert_eq!(kept.unrecognized.get("og:custom").map(String::as_str), Some("x"));
    assert_eq!(
        kept.unrecognized.get("twitter:label1").map(String::as_str),
        Some("Reading time")
    );
}

#[tokio::test]
async fn dead_origin_is_a_network_error() {
    // An exclusive (non-pooled) server actually stops listening on drop;
    // pooled servers from `MockServer::start` keep the port open.
    let origin = MockServer::builder().start().await;
    let target = format!("{}/gone", origin.uri());
    drop(origin);

    let err = Pipeline::new().run(&target).await.unwrap_err();
    assert!(matches!(err, MetalensError::Network { .. }), "{err:?}");
    assert_eq!(err.kind_name(), "NetworkError");
}
