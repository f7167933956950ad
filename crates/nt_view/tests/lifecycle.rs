use std::sync::Arc;

use nt_core::{FilterCriteria, Sentiment, SentimentLabel, SortOrder};
use nt_view::test_utils::{sample_article, ScriptedSource};
use nt_view::{ArticleListView, FetchState, FilterFormController, FilterState, ListRender};

fn query(q: &str) -> FilterCriteria {
    FilterCriteria {
        query: q.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_slow_earlier_response_never_wins() {
    let source = Arc::new(ScriptedSource::new());
    let x = query("x");
    let y = query("y");
    source.set_list(&x, Ok(vec![sample_article(1, "from X")]));
    source.set_list(&y, Ok(vec![sample_article(2, "from Y")]));
    source.hold(&ScriptedSource::list_label(&x));
    source.hold(&ScriptedSource::list_label(&y));

    let mut view = ArticleListView::new(source.clone());
    let a = tokio::spawn(view.observe(&x).unwrap().resolve());
    let b = tokio::spawn(view.observe(&y).unwrap().resolve());

    // B arrives first
    source.release(&ScriptedSource::list_label(&y));
    let b = b.await.unwrap();
    assert!(view.complete(b));

    // A arrives late and is ignored
    source.release(&ScriptedSource::list_label(&x));
    let a = a.await.unwrap();
    assert!(!view.complete(a));

    assert_eq!(view.articles()[0].title, "from Y");
}

#[tokio::test]
async fn test_stale_response_arriving_first_is_ignored_too() {
    let source = Arc::new(ScriptedSource::new());
    let x = query("x");
    let y = query("y");
    source.set_list(&x, Ok(vec![sample_article(1, "from X")]));
    source.hold(&ScriptedSource::list_label(&y));

    let mut view = ArticleListView::new(source.clone());
    let a = view.observe(&x).unwrap();
    let b = tokio::spawn(view.observe(&y).unwrap().resolve());

    assert!(!view.complete(a.resolve().await));
    assert!(view.state().is_loading());

    source.release(&ScriptedSource::list_label(&y));
    assert!(view.complete(b.await.unwrap()));
    assert!(matches!(view.render(), ListRender::NoResults));
}

#[tokio::test]
async fn test_repeated_criteria_share_one_request() {
    let source = Arc::new(ScriptedSource::new());
    let x = query("x");
    let y = query("y");
    source.set_list(&x, Ok(vec![sample_article(1, "X")]));
    source.hold(&ScriptedSource::list_label(&x));
    source.hold(&ScriptedSource::list_label(&y));

    let mut view = ArticleListView::new(source.clone());
    let first = tokio::spawn(view.observe(&x).unwrap().resolve());
    tokio::task::yield_now().await;
    let _second = view.observe(&y).unwrap();
    // back to X while the first X request is still pending
    let third = tokio::spawn(view.observe(&x).unwrap().resolve());
    assert!(view.is_pending(&x.key()));

    source.release(&ScriptedSource::list_label(&x));
    let first = first.await.unwrap();
    let third = third.await.unwrap();

    assert_eq!(source.list_calls(&x), 1);
    assert!(!view.complete(first));
    assert!(view.complete(third));
    assert_eq!(view.articles()[0].title, "X");
}

#[tokio::test]
async fn test_reversed_dates_from_form_make_no_request() {
    let source = Arc::new(ScriptedSource::new());
    let mut state = FilterState::default();
    let mut form = FilterFormController::new(&state);
    let mut view = ArticleListView::new(source.clone());
    view.load(state.criteria()).await;
    let calls_before = source.calls().len();

    form.set_date_from("2024-06-01");
    form.set_date_to("2024-01-01");
    assert!(form.submit_to(&mut state).is_err());
    assert!(form.field_error().is_some());

    assert!(view.observe(state.criteria()).is_none());
    assert_eq!(source.calls().len(), calls_before);
    assert_eq!(state.history_len(), 0);
}

#[tokio::test]
async fn test_submit_commit_fetch_flow() {
    let source = Arc::new(ScriptedSource::new());
    let mut state = FilterState::default();
    let mut form = FilterFormController::new(&state);
    let mut view = ArticleListView::new(source.clone());
    view.load(state.criteria()).await;

    form.set_sentiment(Sentiment::Positive);
    form.set_sort(SortOrder::ScoreDesc);
    assert_eq!(form.submit_to(&mut state), Ok(true));
    assert_eq!(state.address(), "sentiment=positive&sort=score_desc");

    assert!(view.load(state.criteria()).await);
    assert_eq!(
        source.calls(),
        vec![
            "list:sort=published_desc".to_string(),
            "list:sentiment=positive&sort=score_desc".to_string()
        ]
    );

    // back navigation refetches the previous filter and resyncs the form
    assert!(state.back());
    assert!(form.sync_from(&state));
    assert_eq!(form.draft().sentiment, Sentiment::Any);
    assert!(view.load(state.criteria()).await);
    assert_eq!(source.list_calls(&FilterCriteria::default()), 2);
}

#[tokio::test]
async fn test_badge_follows_label() {
    let source = Arc::new(ScriptedSource::new());
    let mut article = sample_article(1, "A");
    article.sentiment_label = Some(SentimentLabel::Positive);
    source.set_list(&FilterCriteria::default(), Ok(vec![article]));

    let mut view = ArticleListView::new(source);
    view.load(&FilterCriteria::default()).await;

    match view.render() {
        ListRender::Cards(cards) => assert_eq!(cards[0].badge.as_ref().unwrap().label, SentimentLabel::Positive),
        other => panic!("expected cards, got {:?}", other),
    }
    assert!(matches!(view.state(), FetchState::Success(_)));
}
