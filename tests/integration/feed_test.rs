//! Feed routing integration tests
//!
//! Drives `FeedService` against recording backends and checks which backend
//! saw which call, including the tag-service to canonical fallback.

use crate::common::{item_ids, page, MockCanonicalBackend, MockTagService, TagServiceBehavior};
use assert_matches::assert_matches;
use favfeed::client::FeedService;
use favfeed::shared::{BackendError, ContentType, FeedFilter, FeedQuery, FeedType};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const THRESHOLD: u32 = 2000;

fn service(
    canonical: Arc<MockCanonicalBackend>,
    tag_service: Arc<MockTagService>,
    tag_service_search: bool,
) -> FeedService {
    FeedService::new(
        canonical,
        tag_service,
        Arc::new(move || tag_service_search),
        THRESHOLD,
        true,
    )
}

fn promoted() -> FeedQuery {
    FeedQuery::new(FeedFilter::new(FeedType::Promoted), [ContentType::Sfw])
}

#[tokio::test]
async fn test_tag_service_success_skips_canonical() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[1])));
    let tag_service = MockTagService::returning(Ok(page(&[2, 3])));
    let feed = service(canonical.clone(), tag_service.clone(), true);

    let result = feed.resolve_feed(&promoted()).await.unwrap();

    assert_eq!(item_ids(&result), vec![2, 3]);
    assert_eq!(canonical.call_count(), 0);
    assert_eq!(tag_service.calls(), vec!["general".to_string()]);

    let general = tag_service.general_calls.lock().unwrap()[0].clone();
    assert_eq!(general.promoted, Some(true));
    assert_eq!(general.flags, 1);
}

#[tokio::test]
async fn test_tag_service_failure_falls_back_once() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[7, 8])));
    let tag_service = MockTagService::returning(Err(BackendError::transient("timeout")));
    let feed = service(canonical.clone(), tag_service.clone(), true);

    let result = feed.resolve_feed(&promoted()).await.unwrap();

    assert_eq!(item_ids(&result), vec![7, 8]);
    assert_eq!(canonical.call_count(), 1);
    let params = canonical.last_call().unwrap();
    assert_eq!(params.promoted, Some(true));
    assert_eq!(params.following, None);

    let metrics = feed.metrics();
    assert_eq!(metrics.tag_service_attempts, 1);
    assert_eq!(metrics.fallbacks, 1);
    assert_eq!(metrics.successful, 1);
}

#[tokio::test]
async fn test_fallback_error_is_surfaced() {
    let canonical = MockCanonicalBackend::returning(Err(BackendError::rejected(404, "gone")));
    let tag_service = MockTagService::returning(Err(BackendError::transient("down")));
    let feed = service(canonical.clone(), tag_service, true);

    let error = feed.resolve_feed(&promoted()).await.unwrap_err();

    assert_eq!(error, BackendError::rejected(404, "gone"));
    assert_eq!(feed.metrics().failed, 1);
}

#[tokio::test]
async fn test_rejected_propagates_when_fallback_disabled() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[1])));
    let tag_service = MockTagService::returning(Err(BackendError::rejected(400, "bad query")));
    let feed = FeedService::new(
        canonical.clone(),
        tag_service,
        Arc::new(|| true),
        THRESHOLD,
        false,
    );

    let error = feed.resolve_feed(&promoted()).await.unwrap_err();

    assert_matches!(error, BackendError::Rejected { status: 400, .. });
    assert_eq!(canonical.call_count(), 0);
}

#[tokio::test]
async fn test_transient_still_falls_back_when_rejected_fallback_disabled() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[4])));
    let tag_service = MockTagService::returning(Err(BackendError::transient("reset")));
    let feed = FeedService::new(
        canonical.clone(),
        tag_service,
        Arc::new(|| true),
        THRESHOLD,
        false,
    );

    let result = feed.resolve_feed(&promoted()).await.unwrap();
    assert_eq!(item_ids(&result), vec![4]);
    assert_eq!(canonical.call_count(), 1);
}

#[tokio::test]
async fn test_specialised_feed_errors_do_not_fall_back() {
    for feed_type in [
        FeedType::Random,
        FeedType::BestOf,
        FeedType::Controversial,
        FeedType::Text,
    ] {
        let canonical = MockCanonicalBackend::returning(Ok(page(&[1])));
        let tag_service = MockTagService::returning(Err(BackendError::transient("down")));
        let feed = service(canonical.clone(), tag_service, true);

        let query = FeedQuery::new(FeedFilter::new(feed_type), [ContentType::Sfw]);
        let error = feed.resolve_feed(&query).await.unwrap_err();

        assert!(error.is_transient(), "{} feed", feed_type);
        assert_eq!(canonical.call_count(), 0, "{} feed", feed_type);
    }
}

#[tokio::test]
async fn test_best_of_passes_threshold_and_user() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[])));
    let tag_service = MockTagService::returning(Ok(page(&[5])));
    let feed = service(canonical, tag_service.clone(), false);

    let query = FeedQuery::new(
        FeedFilter::new(FeedType::BestOf)
            .with_tags("cats")
            .with_username("alice"),
        [ContentType::Sfw, ContentType::Nsfw],
    )
    .older(100);
    feed.resolve_feed(&query).await.unwrap();

    assert_eq!(
        tag_service.calls(),
        vec![
            "bestof tags=Some(\"cats\") user=Some(\"alice\") flags=3 older=Some(100) score=2000"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_random_and_text_pass_tags_and_flags() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[])));
    let tag_service = MockTagService::returning(Ok(page(&[])));
    let feed = service(canonical, tag_service.clone(), false);

    let random = FeedQuery::new(FeedFilter::new(FeedType::Random).with_tags("?a & b"), [ContentType::Nsfp]);
    feed.resolve_feed(&random).await.unwrap();
    let text = FeedQuery::new(FeedFilter::new(FeedType::Text), [ContentType::Sfw]).older(9);
    feed.resolve_feed(&text).await.unwrap();

    assert_eq!(
        tag_service.calls(),
        vec![
            "random tags=Some(\"a & b\") flags=8".to_string(),
            "text tags=None flags=1 older=Some(9)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_likes_query_goes_straight_to_canonical() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[6])));
    let tag_service = MockTagService::returning(Ok(page(&[99])));
    let feed = service(canonical.clone(), tag_service.clone(), true);

    let query = FeedQuery::new(FeedFilter::default().with_likes("alice"), [ContentType::Sfw]);
    let result = feed.resolve_feed(&query).await.unwrap();

    assert_eq!(item_ids(&result), vec![6]);
    assert_eq!(tag_service.started(), 0);
    let params = canonical.last_call().unwrap();
    assert_eq!(params.likes.as_deref(), Some("alice"));
    assert_eq!(params.self_only, Some(true));
}

#[tokio::test]
async fn test_likes_with_advanced_tags_stays_canonical() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[6])));
    let tag_service = MockTagService::returning(Ok(page(&[99])));
    let feed = service(canonical.clone(), tag_service.clone(), false);

    let filter = FeedFilter::default().with_likes("alice").with_tags("?foo");
    let result = feed
        .resolve_feed(&FeedQuery::new(filter, [ContentType::Sfw]))
        .await
        .unwrap();

    assert_eq!(item_ids(&result), vec![6]);
    assert_eq!(tag_service.started(), 0);
    let params = canonical.last_call().unwrap();
    assert_eq!(params.likes.as_deref(), Some("alice"));
    assert_eq!(params.tags.as_deref(), Some("foo"));
    assert_eq!(feed.metrics().advanced_searches, 0);
}

#[tokio::test]
async fn test_advanced_query_counts_advanced_search() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[])));
    let tag_service = MockTagService::returning(Ok(page(&[1])));
    let feed = service(canonical.clone(), tag_service.clone(), false);

    let query = FeedQuery::new(FeedFilter::default().with_tags("? a & b"), [ContentType::Sfw]);
    feed.resolve_feed(&query).await.unwrap();

    let general = tag_service.general_calls.lock().unwrap()[0].clone();
    assert_eq!(general.tags.as_deref(), Some("a & b"));
    assert_eq!(canonical.call_count(), 0);

    let metrics = feed.metrics();
    assert_eq!(metrics.advanced_searches, 1);
    assert_eq!(metrics.loaded(FeedType::New), 1);
}

#[tokio::test]
async fn test_cancellation_never_starts_fallback() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[1])));
    let tag_service = MockTagService::with(TagServiceBehavior::Hang);
    let feed = service(canonical.clone(), tag_service.clone(), true);

    let outcome = timeout(Duration::from_millis(50), feed.resolve_feed(&promoted())).await;
    assert!(outcome.is_err());
    assert_eq!(tag_service.started(), 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(canonical.call_count(), 0);
}

#[tokio::test]
async fn test_flag_source_read_once_per_query() {
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);
    let canonical = MockCanonicalBackend::returning(Ok(page(&[1])));
    let tag_service = MockTagService::returning(Err(BackendError::transient("down")));
    let feed = FeedService::new(
        canonical,
        tag_service,
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }),
        THRESHOLD,
        true,
    );

    feed.resolve_feed(&promoted()).await.unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    feed.resolve_feed(&promoted()).await.unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_metrics_count_loads_per_feed_type() {
    let canonical = MockCanonicalBackend::returning(Ok(page(&[1])));
    let tag_service = MockTagService::returning(Ok(page(&[2])));
    let feed = service(canonical, tag_service, false);

    feed.resolve_feed(&promoted()).await.unwrap();
    feed.resolve_feed(&promoted()).await.unwrap();
    feed.resolve_feed(&FeedQuery::new(FeedFilter::new(FeedType::Random), []))
        .await
        .unwrap();

    let metrics = feed.metrics();
    assert_eq!(metrics.loaded(FeedType::Promoted), 2);
    assert_eq!(metrics.loaded(FeedType::Random), 1);
    assert_eq!(metrics.loaded(FeedType::Text), 0);
    assert_eq!(metrics.successful, 3);
    assert_eq!(metrics.success_rate(), 1.0);
}
