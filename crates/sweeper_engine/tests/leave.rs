mod support;

use std::time::Duration;

use pretty_assertions::assert_eq;
use sweeper_core::ChannelInfo;
use sweeper_engine::EngineEvent;

use support::{days_ago, init_logging, FakeSlack, Harness};

fn info(id: &str, name: &str) -> ChannelInfo {
    ChannelInfo {
        id: id.to_string(),
        name: name.to_string(),
        last_activity: Some(days_ago(45)),
    }
}

#[tokio::test]
async fn leaves_in_order_and_continues_past_failures() {
    init_logging();
    let harness = Harness::new(FakeSlack::default().with_leave_failure("C2"));
    let channels = vec![info("C1", "old-a"), info("C2", "old-b"), info("C3", "old-c")];

    let report = harness.sweeper.leave(&channels).await;

    assert_eq!(harness.api.leave_calls(), vec!["C1", "C2", "C3"]);
    assert_eq!(report.left, vec![info("C1", "old-a"), info("C3", "old-c")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, info("C2", "old-b"));
    assert_eq!(report.attempted(), 3);

    // Paced between items only.
    assert_eq!(harness.clock.sleeps(), vec![Duration::from_secs(1); 2]);

    let outcomes: Vec<_> = harness
        .events()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::LeaveFinished {
                index,
                total,
                result,
                ..
            } => Some((index, total, result.is_ok())),
            _ => None,
        })
        .collect();
    assert_eq!(outcomes, vec![(0, 3, true), (1, 3, false), (2, 3, true)]);
}

#[tokio::test]
async fn empty_batch_does_nothing() {
    init_logging();
    let harness = Harness::new(FakeSlack::default());

    let report = harness.sweeper.leave(&[]).await;

    assert_eq!(report.attempted(), 0);
    assert!(harness.api.leave_calls().is_empty());
    assert!(harness.clock.sleeps().is_empty());
}
