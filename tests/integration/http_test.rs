//! HTTP client integration tests
//!
//! Runs the reqwest backends against a wiremock server and checks routes,
//! query strings and the mapping of failures onto `BackendError`.

use crate::assert_ok;
use crate::common::{comment, item_ids, MockServices, WAIT};
use assert_matches::assert_matches;
use favfeed::client::api::{
    CanonicalFeedBackend, HttpCanonicalFeedBackend, HttpMembershipBackend, HttpTagServiceBackend,
    ItemsParams, MembershipBackend, TagServiceFeedBackend,
};
use favfeed::client::{FavoritesService, FeedService, Identity, IdentitySignal};
use favfeed::shared::{BackendError, ContentType, FeedFilter, FeedQuery, FeedType};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tokio::time::timeout;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

fn page_body(ids: &[u64]) -> serde_json::Value {
    json!({
        "items": ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
        "atEnd": false,
        "atStart": true,
    })
}

#[tokio::test]
async fn test_fetch_all_sends_identity_and_flags() {
    let mock = MockServices::start().await;
    Mock::given(method("GET"))
        .and(path("/comments/v1/alice"))
        .and(query_param("flags", "15"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(vec![comment(1), comment(2)]),
        )
        .expect(1)
        .mount(&mock.server)
        .await;

    let backend = assert_ok!(HttpMembershipBackend::new(mock.config.clone()));
    let comments = backend
        .fetch_all(&Identity::new("alice"), ContentType::all_flags())
        .await
        .unwrap();

    assert_eq!(comments, vec![comment(1), comment(2)]);
}

#[tokio::test]
async fn test_confirm_add_puts_comment() {
    let mock = MockServices::start().await;
    Mock::given(method("PUT"))
        .and(path("/comments/v1/alice/3"))
        .and(body_json(serde_json::to_value(comment(3)).unwrap()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock.server)
        .await;

    let backend = assert_ok!(HttpMembershipBackend::new(mock.config.clone()));
    backend
        .confirm_add(&Identity::new("alice"), &comment(3))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_confirm_remove_deletes_comment() {
    let mock = MockServices::start().await;
    Mock::given(method("DELETE"))
        .and(path("/comments/v1/alice/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock.server)
        .await;

    let backend = assert_ok!(HttpMembershipBackend::new(mock.config.clone()));
    backend
        .confirm_remove(&Identity::new("alice"), 3)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mock = MockServices::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock.server)
        .await;

    let backend = assert_ok!(HttpMembershipBackend::new(mock.config.clone()));
    let error = backend
        .fetch_all(&Identity::new("alice"), 1)
        .await
        .unwrap_err();

    assert!(error.is_transient());
}

#[tokio::test]
async fn test_client_error_is_rejected() {
    let mock = MockServices::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&mock.server)
        .await;

    let backend = assert_ok!(HttpMembershipBackend::new(mock.config.clone()));
    let error = backend
        .confirm_remove(&Identity::new("alice"), 1)
        .await
        .unwrap_err();

    assert_eq!(error, BackendError::rejected(403, "forbidden"));
}

#[tokio::test]
async fn test_malformed_body_is_partial_data() {
    let mock = MockServices::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"items\": ["))
        .mount(&mock.server)
        .await;

    let backend = HttpCanonicalFeedBackend::new(mock.config.clone()).unwrap();
    let error = backend.items(&ItemsParams::default()).await.unwrap_err();

    assert_matches!(error, BackendError::PartialData { .. });
}

#[tokio::test]
async fn test_items_query_string() {
    let mock = MockServices::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/get"))
        .and(query_param("promoted", "1"))
        .and(query_param("flags", "9"))
        .and(query_param("tags", "cats"))
        .and(query_param("older", "500"))
        .and(query_param_is_missing("following"))
        .and(query_param_is_missing("likes"))
        .and(query_param_is_missing("self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[499, 498])))
        .expect(1)
        .mount(&mock.server)
        .await;

    let backend = HttpCanonicalFeedBackend::new(mock.config.clone()).unwrap();
    let params = ItemsParams {
        promoted: Some(true),
        flags: 9,
        tags: Some("cats".to_string()),
        older: Some(500),
        ..ItemsParams::default()
    };
    let page = backend.items(&params).await.unwrap();

    assert_eq!(item_ids(&page), vec![499, 498]);
    assert!(page.at_start);
}

#[tokio::test]
async fn test_item_info_route() {
    let mock = MockServices::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/info"))
        .and(query_param("itemId", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tags": [{ "id": 1, "confidence": 0.5, "tag": "cats" }],
            "comments": [],
        })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let backend = HttpCanonicalFeedBackend::new(mock.config.clone()).unwrap();
    let post = backend.item_info(42).await.unwrap();

    assert_eq!(post.tags.len(), 1);
    assert_eq!(post.tags[0].tag, "cats");
}

#[tokio::test]
async fn test_best_of_route() {
    let mock = MockServices::start().await;
    Mock::given(method("GET"))
        .and(path("/categories/v1/bestof"))
        .and(query_param("score", "2000"))
        .and(query_param("user", "alice"))
        .and(query_param("flags", "1"))
        .and(query_param_is_missing("tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[3])))
        .expect(1)
        .mount(&mock.server)
        .await;

    let backend = HttpTagServiceBackend::new(mock.config.clone()).unwrap();
    let page = backend
        .best_of(None, Some("alice"), 1, None, 2000)
        .await
        .unwrap();

    assert_eq!(item_ids(&page), vec![3]);
}

#[tokio::test]
async fn test_feed_falls_back_when_tag_service_unavailable() {
    let mock = MockServices::start_with(|builder| builder.tag_service_search(true)).await;
    Mock::given(method("GET"))
        .and(path("/categories/v1/general"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/items/get"))
        .and(query_param("following", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[10, 9])))
        .expect(1)
        .mount(&mock.server)
        .await;

    let feed = FeedService::from_config(mock.config.clone()).unwrap();
    let query = FeedQuery::new(FeedFilter::new(FeedType::Premium), [ContentType::Sfw]);
    let page = feed.resolve_feed(&query).await.unwrap();

    assert_eq!(item_ids(&page), vec![10, 9]);
    assert_eq!(feed.metrics().fallbacks, 1);
}

#[tokio::test]
async fn test_favorites_service_over_http() {
    let mock = MockServices::start().await;
    Mock::given(method("GET"))
        .and(path("/comments/v1/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![comment(4)]))
        .mount(&mock.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/comments/v1/alice/8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock.server)
        .await;

    let identity = Arc::new(IdentitySignal::new(Some("alice".into())));
    let service = FavoritesService::from_config(mock.config.clone(), identity).unwrap();

    let mut snapshots = service.favorites_snapshots();
    timeout(WAIT, async {
        while let Some(snapshot) = snapshots.next().await {
            if snapshot.contains(4) {
                return;
            }
        }
    })
    .await
    .expect("initial sync never arrived");

    let outcome = service.request_add(comment(8)).await.unwrap();
    assert_eq!(outcome, favfeed::client::Confirmation::Confirmed);
    assert!(service.is_favorited(4));
    assert!(service.is_favorited(8));
}
