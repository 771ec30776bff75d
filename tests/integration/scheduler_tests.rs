//! Pagination engine tests against a scripted page source

use crate::support::{surfaces, NoSleep, PageScript, ScriptedFetcher};
use kanji_vocab::crawler::{merge, PaginationScheduler, RetryPolicy, Strategy};
use kanji_vocab::state::{PageOutcome, PageStatus, SchedulerPhase, ScrapeSession};
use kanji_vocab::VocabError;
use std::sync::Arc;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;

fn scheduler(fetcher: &Arc<ScriptedFetcher>) -> PaginationScheduler {
    PaginationScheduler::new(Arc::clone(fetcher) as Arc<dyn kanji_vocab::PageFetcher>)
        .with_sleeper(Arc::new(NoSleep))
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
}

async fn run(
    fetcher: &Arc<ScriptedFetcher>,
    budget: u32,
    strategy: Strategy,
    concurrency: usize,
) -> ScrapeSession {
    scheduler(fetcher)
        .run('人', budget, strategy, concurrency)
        .await
        .expect("scrape should succeed")
}

fn page_indices(session: &ScrapeSession) -> Vec<u32> {
    session.pages.keys().copied().collect()
}

#[tokio::test]
async fn test_scenario_a_sequential_halts_at_last_page() {
    let fetcher = Arc::new(ScriptedFetcher::linear(3));
    let session = run(&fetcher, 10, Strategy::Sequential, 1).await;

    assert_eq!(fetcher.requested_pages(), vec![1, 2, 3]);
    assert_eq!(session.last_valid_page, Some(3));
    assert_eq!(session.phase, SchedulerPhase::Complete);
    assert_eq!(
        surfaces(&session.merged_entries),
        vec!["人1a", "人1b", "人2a", "人2b", "人3a", "人3b"]
    );
}

#[tokio::test]
async fn test_scenario_a_concurrent_keeps_pages_up_to_last() {
    let fetcher = Arc::new(ScriptedFetcher::linear(3));
    let session = run(&fetcher, 10, Strategy::Concurrent, 10).await;

    assert_eq!(page_indices(&session), vec![1, 2, 3]);
    assert_eq!(session.last_valid_page, Some(3));
    assert_eq!(session.phase, SchedulerPhase::Complete);
    assert_eq!(
        surfaces(&session.merged_entries),
        vec!["人1a", "人1b", "人2a", "人2b", "人3a", "人3b"]
    );
}

#[tokio::test]
async fn test_scenario_a_concurrent_within_budget_fetches_nothing_else() {
    let fetcher = Arc::new(ScriptedFetcher::linear(3));
    run(&fetcher, 3, Strategy::Concurrent, 10).await;

    assert_eq!(fetcher.requested_pages(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_scenario_b_retry_recovers_page() {
    let fetcher = Arc::new(
        ScriptedFetcher::linear(4).page(2, PageScript::new(&["人2a", "人2b"], true).failing(2)),
    );
    let session = run(&fetcher, 10, Strategy::Concurrent, 10).await;

    assert_eq!(fetcher.attempts(2), 3);
    assert!(!session.is_partial());
    assert_eq!(
        surfaces(&session.merged_entries),
        vec!["人1a", "人1b", "人2a", "人2b", "人3a", "人3b", "人4a", "人4b"]
    );
}

#[tokio::test]
async fn test_scenario_c_exhausted_page_is_flagged() {
    let fetcher = Arc::new(
        ScriptedFetcher::linear(10).page(5, PageScript::new(&["人5a"], true).failing(u32::MAX)),
    );
    let session = run(&fetcher, 15, Strategy::Concurrent, 10).await;

    assert_eq!(fetcher.attempts(5), 3);
    assert_eq!(session.last_valid_page, Some(10));
    assert_eq!(session.failed_pages(), vec![5]);
    assert!(session.is_partial());
    assert_eq!(page_indices(&session), (1..=10).collect::<Vec<_>>());

    let merged = surfaces(&session.merged_entries);
    assert_eq!(merged.len(), 18);
    assert!(!merged.iter().any(|s| s.starts_with("人5")));

    let report = session
        .page_reports()
        .into_iter()
        .find(|r| r.page_index == 5)
        .unwrap();
    assert_eq!(report.status, PageStatus::Failed);
    assert!(report.failure.unwrap().contains("exhausted retries"));
}

#[tokio::test]
async fn test_scenario_d_first_occurrence_wins() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, PageScript::new(&["人", "人間"], true))
            .page(2, PageScript::new(&["人口"], true))
            .page(3, PageScript::new(&["人生"], true))
            .page(4, PageScript::new(&["人間", "大人"], false)),
    );

    for strategy in [Strategy::Sequential, Strategy::Concurrent] {
        let session = run(&fetcher, 10, strategy, 4).await;

        assert_eq!(
            surfaces(&session.merged_entries),
            vec!["人", "人間", "人口", "人生", "大人"]
        );
        let person = &session.merged_entries[1];
        assert_eq!(person.glosses, vec!["page 1"]);
        assert_eq!(session.duplicates_dropped(), 1);
    }
}

#[tokio::test]
async fn test_budget_is_never_exceeded() {
    for strategy in [Strategy::Sequential, Strategy::Concurrent] {
        let fetcher = Arc::new(ScriptedFetcher::linear(50));
        let session = run(&fetcher, 7, strategy, 3).await;

        assert_eq!(fetcher.requested_pages(), (1..=7).collect::<Vec<_>>());
        assert_eq!(session.last_valid_page, None);
        assert_eq!(session.merged_entries.len(), 14);
    }
}

#[tokio::test]
async fn test_strategies_agree_and_leave_no_gaps() {
    for total in 1..=6 {
        for budget in 1..=8 {
            for concurrency in [1, 3, 10] {
                let sequential_fetcher = Arc::new(ScriptedFetcher::linear(total));
                let concurrent_fetcher = Arc::new(ScriptedFetcher::linear(total));

                let sequential = run(&sequential_fetcher, budget, Strategy::Sequential, 1).await;
                let concurrent =
                    run(&concurrent_fetcher, budget, Strategy::Concurrent, concurrency).await;

                let expected: Vec<u32> = (1..=total.min(budget)).collect();
                assert_eq!(page_indices(&concurrent), expected, "total {total} budget {budget}");
                assert_eq!(sequential.merged_entries, concurrent.merged_entries);
                assert!(concurrent_fetcher
                    .requested_pages()
                    .iter()
                    .all(|&p| p <= budget));
            }
        }
    }
}

#[tokio::test]
async fn test_out_of_order_completion_keeps_page_order() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, PageScript::new(&["人1"], true).delayed(40))
            .page(2, PageScript::new(&["人2"], true).delayed(20))
            .page(3, PageScript::new(&["人3"], true))
            .page(4, PageScript::new(&["人4"], false).delayed(10)),
    );
    let session = run(&fetcher, 6, Strategy::Concurrent, 6).await;

    assert_eq!(surfaces(&session.merged_entries), vec!["人1", "人2", "人3", "人4"]);
    assert_eq!(merge(&session.pages), session.merged_entries);
}

#[tokio::test]
async fn test_panicked_worker_page_is_backfilled() {
    let fetcher = Arc::new(
        ScriptedFetcher::linear(4).page(3, PageScript::new(&["人3a", "人3b"], true).panicking(1)),
    );
    let session = run(&fetcher, 4, Strategy::Concurrent, 2).await;

    assert_eq!(fetcher.attempts(3), 2);
    assert_eq!(page_indices(&session), vec![1, 2, 3, 4]);
    assert!(session.pages[&3].is_success());
    assert!(surfaces(&session.merged_entries).contains(&"人3a"));
}

#[tokio::test]
async fn test_first_page_failure_is_fatal() {
    for strategy in [Strategy::Sequential, Strategy::Concurrent] {
        let fetcher = Arc::new(
            ScriptedFetcher::linear(3).page(1, PageScript::new(&["人"], true).unparseable()),
        );
        let result = scheduler(&fetcher).run('人', 5, strategy, 2).await;

        match result {
            Err(VocabError::FatalScrape { target, reason }) => {
                assert_eq!(target, '人');
                assert!(reason.contains("page 1"));
            }
            other => panic!("expected fatal scrape, got {:?}", other.map(|s| s.pages.len())),
        }
    }
}

#[tokio::test]
async fn test_permanent_parse_error_is_not_retried() {
    let fetcher = Arc::new(
        ScriptedFetcher::linear(4).page(2, PageScript::new(&["人2"], true).unparseable()),
    );
    let session = run(&fetcher, 4, Strategy::Concurrent, 4).await;

    assert_eq!(fetcher.attempts(2), 1);
    assert_eq!(session.failed_pages(), vec![2]);
}

#[tokio::test]
async fn test_sequential_abort_keeps_earlier_pages() {
    let fetcher = Arc::new(
        ScriptedFetcher::linear(5).page(3, PageScript::new(&["人3"], true).failing(1)),
    );
    let session = run(&fetcher, 10, Strategy::Sequential, 1).await;

    assert_eq!(fetcher.requested_pages(), vec![1, 2, 3]);
    assert_eq!(fetcher.attempts(3), 1);
    assert_eq!(session.failed_pages(), vec![3]);
    assert_eq!(
        surfaces(&session.merged_entries),
        vec!["人1a", "人1b", "人2a", "人2b"]
    );
}

#[tokio::test]
async fn test_empty_page_is_not_a_failure() {
    let fetcher = Arc::new(
        ScriptedFetcher::linear(4)
            .page(2, PageScript::new(&[], true))
            .page(3, PageScript::new(&["人3"], true).failing(u32::MAX)),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = scheduler(&fetcher)
        .with_progress(tx)
        .run('人', 4, Strategy::Concurrent, 4)
        .await
        .unwrap();

    let mut reports = Vec::new();
    while let Ok(report) = rx.try_recv() {
        reports.push(report);
    }
    reports.sort_by_key(|r| r.page_index);

    let statuses: Vec<PageStatus> = reports.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            PageStatus::Succeeded,
            PageStatus::Empty,
            PageStatus::Failed,
            PageStatus::Succeeded
        ]
    );
    assert!(!reports[1].status.is_warning());
    assert!(reports[2].status.is_warning());
    assert_eq!(session.failed_pages(), vec![3]);
}

#[tokio::test]
async fn test_character_info_comes_from_page_one() {
    let fetcher = Arc::new(ScriptedFetcher::linear(2));
    let session = run(&fetcher, 2, Strategy::Concurrent, 2).await;

    let info = session.character_info.expect("page 1 carries metadata");
    assert_eq!(info.meaning, "person");
    assert!(matches!(session.pages.get(&1), Some(PageOutcome::Success(_))));
}

#[tokio::test]
async fn test_pages_dropped_past_the_end_are_retracted() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, PageScript::new(&["人1"], true))
            .page(2, PageScript::new(&["人2"], true))
            .page(3, PageScript::new(&["人3"], false).delayed(80)),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = scheduler(&fetcher)
        .with_progress(tx)
        .run('人', 8, Strategy::Concurrent, 8)
        .await
        .unwrap();

    let mut reports = Vec::new();
    while let Ok(report) = rx.try_recv() {
        reports.push(report);
    }

    // The latest report per page is what a live view ends up showing
    let mut latest = BTreeMap::new();
    for report in &reports {
        latest.insert(report.page_index, report.status);
    }
    let shown: Vec<u32> = latest
        .iter()
        .filter(|(_, status)| **status != PageStatus::Discarded)
        .map(|(page, _)| *page)
        .collect();

    assert_eq!(shown, page_indices(&session));
    assert_eq!(page_indices(&session), vec![1, 2, 3]);
    assert_eq!(latest.get(&4), Some(&PageStatus::Discarded));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_pages_below_the_end_are_backfilled() {
    for round in 0..40u64 {
        let fetcher = Arc::new((1..=6).fold(ScriptedFetcher::new(), |fetcher, i| {
            let word = format!("人{}", i);
            let delay = (u64::from(i) * 7 + round) % 5;
            fetcher.page(i, PageScript::new(&[&word], i < 6).delayed(delay))
        }));
        let session = run(&fetcher, 12, Strategy::Concurrent, 2).await;

        assert_eq!(page_indices(&session), (1..=6).collect::<Vec<_>>(), "round {round}");
        assert_eq!(session.last_valid_page, Some(6), "round {round}");
        assert_eq!(
            surfaces(&session.merged_entries),
            vec!["人1", "人2", "人3", "人4", "人5", "人6"],
            "round {round}"
        );
        assert!(session.pages.values().all(|outcome| outcome.is_success()));
    }
}
