use super::*;
use crate::{
    support::{credits, movie_details, ApiCall, FakeMovieApi},
    types::Director,
};

fn new_loader(api: &Arc<FakeMovieApi>) -> Arc<DetailLoader> {
    let (events, _) = broadcast::channel(16);
    Arc::new(DetailLoader::new(api.clone(), events))
}

fn matrix_api() -> FakeMovieApi {
    FakeMovieApi::new()
        .with_details(movie_details(603, "The Matrix"))
        .with_credits(
            MovieId(603),
            credits(
                8,
                &[
                    ("Joel Silver", "Producer"),
                    ("Lana Wachowski", "Director"),
                    ("Lilly Wachowski", "Director"),
                ],
            ),
        )
}

#[tokio::test]
async fn loads_record_with_director_and_top_cast() {
    let api = Arc::new(matrix_api());
    let loader = new_loader(&api);

    let snapshot = loader.load_detail(MovieId(603)).await;

    let record = snapshot.record().expect("loaded");
    assert_eq!(snapshot.requested, Some(MovieId(603)));
    assert_eq!(record.title, "The Matrix");
    assert_eq!(record.director, Director::Named("Lana Wachowski".to_string()));
    assert_eq!(record.top_cast.len(), 5);
    assert_eq!(record.top_cast[0].name, "Actor 1");
    assert_eq!(record.top_cast[4].name, "Actor 5");
    assert_eq!(record.cast.len(), 8);

    let calls = api.calls();
    assert!(calls.contains(&ApiCall::Detail(MovieId(603))));
    assert!(calls.contains(&ApiCall::Credits(MovieId(603))));
}

#[tokio::test]
async fn missing_director_credit_reads_unknown() {
    let api = Arc::new(
        FakeMovieApi::new()
            .with_details(movie_details(7, "Crewless"))
            .with_credits(MovieId(7), credits(2, &[("Someone", "Editor")])),
    );
    let loader = new_loader(&api);

    let snapshot = loader.load_detail(MovieId(7)).await;

    let record = snapshot.record().expect("loaded");
    assert_eq!(record.director, Director::Unknown);
    assert_eq!(record.top_cast.len(), 2);
}

#[tokio::test]
async fn credits_failure_fails_the_whole_view() {
    let api = Arc::new(
        FakeMovieApi::new()
            .with_details(movie_details(603, "The Matrix"))
            .with_credits_failure(MovieId(603), FetchError::transport("connection refused")),
    );
    let loader = new_loader(&api);

    let snapshot = loader.load_detail(MovieId(603)).await;

    assert_eq!(snapshot.view, DetailView::NotFound);
    assert!(snapshot.record().is_none());
}

#[tokio::test]
async fn detail_failure_fails_the_whole_view() {
    let api = Arc::new(
        FakeMovieApi::new()
            .with_details_failure(MovieId(603), FetchError::upstream(404, "not found"))
            .with_credits(MovieId(603), credits(3, &[])),
    );
    let loader = new_loader(&api);

    let snapshot = loader.load_detail(MovieId(603)).await;

    assert_eq!(snapshot.view, DetailView::NotFound);
}

#[tokio::test]
async fn mismatched_payload_id_is_rejected() {
    let api = Arc::new(
        FakeMovieApi::new()
            .with_details_for(MovieId(5), movie_details(999, "Somebody Else"))
            .with_credits(MovieId(5), credits(1, &[])),
    );
    let loader = new_loader(&api);

    let snapshot = loader.load_detail(MovieId(5)).await;

    assert_eq!(snapshot.view, DetailView::NotFound);
}

#[tokio::test]
async fn fetches_run_concurrently_and_reveal_nothing_until_both_finish() {
    let api = Arc::new(matrix_api());
    let loader = new_loader(&api);
    let held_detail = api.hold(ApiCall::Detail(MovieId(603)));
    let held_credits = api.hold(ApiCall::Credits(MovieId(603)));

    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_detail(MovieId(603)).await }
    });
    held_detail.entered.await.expect("detail requested");
    held_credits.entered.await.expect("credits requested");

    held_detail.release.send(()).expect("release detail");
    let pending = loader.snapshot().await;
    assert!(pending.is_loading());
    assert!(pending.record().is_none());

    held_credits.release.send(()).expect("release credits");
    let settled = task.await.expect("join");
    assert!(settled.record().is_some());
}

#[tokio::test]
async fn switching_ids_never_shows_the_previous_record() {
    let api = Arc::new(
        matrix_api()
            .with_details(movie_details(11, "Star Wars"))
            .with_credits(MovieId(11), credits(3, &[("George Lucas", "Director")])),
    );
    let loader = new_loader(&api);
    loader.load_detail(MovieId(603)).await;

    let held = api.hold(ApiCall::Detail(MovieId(11)));
    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_detail(MovieId(11)).await }
    });
    held.entered.await.expect("detail requested");

    let pending = loader.snapshot().await;
    assert_eq!(pending.requested, Some(MovieId(11)));
    assert_eq!(pending.view, DetailView::Loading);

    held.release.send(()).expect("release");
    let settled = task.await.expect("join");
    assert_eq!(settled.record().map(|r| r.id), Some(MovieId(11)));
}

#[tokio::test]
async fn slow_response_for_previous_id_is_discarded() {
    let api = Arc::new(
        matrix_api()
            .with_details(movie_details(11, "Star Wars"))
            .with_credits(MovieId(11), credits(3, &[("George Lucas", "Director")])),
    );
    let loader = new_loader(&api);

    let held = api.hold(ApiCall::Credits(MovieId(603)));
    let slow = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_detail(MovieId(603)).await }
    });
    held.entered.await.expect("credits requested");

    let fresh = loader.load_detail(MovieId(11)).await;
    assert_eq!(fresh.record().map(|r| r.title.as_str()), Some("Star Wars"));

    held.release.send(()).expect("release");
    slow.await.expect("join");

    let snapshot = loader.snapshot().await;
    assert_eq!(snapshot.requested, Some(MovieId(11)));
    assert_eq!(snapshot.record().map(|r| r.id), Some(MovieId(11)));
}

#[tokio::test]
async fn same_id_is_not_refetched_but_failures_can_retry() {
    let api = Arc::new(matrix_api());
    let loader = new_loader(&api);

    loader.load_detail(MovieId(603)).await;
    loader.load_detail(MovieId(603)).await;
    assert_eq!(api.calls().len(), 2);

    let failing = Arc::new(FakeMovieApi::new());
    let retrying = new_loader(&failing);
    retrying.load_detail(MovieId(1)).await;
    let again = retrying.load_detail(MovieId(1)).await;
    assert_eq!(again.view, DetailView::NotFound);
    let detail_requests = failing
        .calls()
        .into_iter()
        .filter(|call| *call == ApiCall::Detail(MovieId(1)))
        .count();
    assert_eq!(detail_requests, 2);
}

#[tokio::test]
async fn close_returns_to_idle() {
    let api = Arc::new(matrix_api());
    let loader = new_loader(&api);
    loader.load_detail(MovieId(603)).await;

    let closed = loader.close().await;

    assert_eq!(closed.view, DetailView::Idle);
    assert_eq!(closed.requested, None);
}
