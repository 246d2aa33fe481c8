//! Story browser over the mock story API: top-id list, then pages of stories.

use std::sync::Arc;
use std::time::Duration;

use lantern_core::{ItemId, StoryApi};
use lantern_query::{PageConfig, PageFetch, PagePolicy, PagedSequence, TopStories};
use lantern_test_utils::{assertions, fixtures, MockStoryApi};

fn browser(api: Arc<MockStoryApi>, config: PageConfig) -> PagedSequence<TopStories> {
    let api: Arc<dyn StoryApi> = api;
    PagedSequence::new(Arc::new(TopStories::new(api)), config)
}

#[tokio::test]
async fn story_browser_loads_first_page_in_list_order() {
    let api = Arc::new(fixtures::front_page(25));
    let stories = browser(Arc::clone(&api), PageConfig::default());

    let PageFetch::Loaded(page) = stories.fetch_next_page().await.unwrap() else {
        panic!("expected first page");
    };

    let ids: Vec<u64> = page.items.iter().map(|story| story.id.as_u64()).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    assert_eq!(api.list_calls(), 1);
    assert_eq!(api.total_item_calls(), 10);
    assert!(stories.has_next_page().unwrap());
}

#[tokio::test]
async fn story_browser_pages_through_capped_list() {
    let api = Arc::new(fixtures::front_page(600));
    let stories = browser(Arc::clone(&api), PageConfig::default());

    let mut pages = 0;
    while stories.has_next_page().unwrap() {
        assert!(matches!(
            stories.fetch_next_page().await.unwrap(),
            PageFetch::Loaded(_)
        ));
        pages += 1;
    }

    assert_eq!(pages, 50);
    assert_eq!(stories.items().unwrap().len(), 500);
    assert_eq!(api.item_calls(ItemId::new(501)), 0);
    assert_eq!(api.list_calls(), 1);
}

#[tokio::test]
async fn story_browser_missing_story_fails_page() {
    let api = Arc::new(
        fixtures::front_page(10).with_top_ids((1..=11).map(ItemId::new).collect()),
    );
    let config = PageConfig::new().with_page_size(11);
    let stories = browser(api, config);

    let result = stories.fetch_next_page().await;
    assertions::assert_not_found(&result);
    assert!(stories.items().unwrap().is_empty());
}

#[tokio::test]
async fn story_browser_skip_policy_keeps_other_stories() {
    let api = Arc::new(fixtures::front_page(10).failing_on(ItemId::new(4)));
    let config = PageConfig::new().with_policy(PagePolicy::SkipFailed);
    let stories = browser(api, config);

    let PageFetch::Loaded(page) = stories.fetch_next_page().await.unwrap() else {
        panic!("expected a page");
    };
    assert_eq!(page.items.len(), 9);
    assert_eq!(page.skipped, 1);
}

#[tokio::test]
async fn story_browser_list_failure_surfaces_and_retries() {
    let api = Arc::new(fixtures::front_page(5).failing_list());
    let stories = browser(Arc::clone(&api), PageConfig::default());

    assertions::assert_transport_error(&stories.fetch_next_page().await);
    assertions::assert_transport_error(&stories.fetch_next_page().await);
    assert_eq!(api.list_calls(), 2);
    assert!(!stories.is_fetching_next_page());
}

#[tokio::test(start_paused = true)]
async fn story_browser_second_request_while_loading_is_rejected() {
    let api = Arc::new(fixtures::front_page(30).with_latency(Duration::from_millis(200)));
    let stories = browser(Arc::clone(&api), PageConfig::default());

    let (first, second) = tokio::join!(stories.fetch_next_page(), async {
        tokio::task::yield_now().await;
        stories.fetch_next_page().await
    });

    assert!(matches!(first.unwrap(), PageFetch::Loaded(_)));
    assert!(matches!(second.unwrap(), PageFetch::AlreadyFetching));
    assert_eq!(api.total_item_calls(), 10);
}
