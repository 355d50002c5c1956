use std::time::Duration;

use farmsim::{config::SimulationConfig, world::PlotId, Action, Session};
use tokio::time;

fn session(seed: u64) -> Session {
    Session::from_config(&SimulationConfig::default().with_seed(seed)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn no_ticks_after_stop() {
    let mut session = session(1);
    session.start();
    time::sleep(Duration::from_millis(4_500)).await;
    assert!(session.stop().await);

    let stopped = session.snapshot();
    assert_eq!(stopped.time_unit, 4);
    assert!(!stopped.active);

    time::sleep(Duration::from_secs(60)).await;
    let later = session.snapshot();
    assert_eq!(later.time_unit, 4);
    assert_eq!(later.credits, stopped.credits);
    assert_eq!(later.plots, stopped.plots);
}

#[tokio::test(start_paused = true)]
async fn restart_resumes_the_same_farm() {
    let mut session = session(2);
    session.start();
    time::sleep(Duration::from_millis(6_500)).await;
    session.stop().await;
    assert_eq!(session.snapshot().credits, 110);

    assert!(session.start());
    assert!(session.is_running());
    time::sleep(Duration::from_millis(3_500)).await;
    session.stop().await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.time_unit, 9);
    assert_eq!(snapshot.credits, 115);
}

#[tokio::test(start_paused = true)]
async fn actions_interleave_with_ticks() {
    let mut session = session(3);
    let mut frames = session.subscribe();
    session.start();
    // Frame published by start itself.
    frames.recv().await.unwrap();

    session
        .dispatch(Action::SelectPlot { plot: PlotId(5) })
        .unwrap();
    let selected = frames.recv().await.unwrap();
    assert_eq!(selected.selection.plot, Some(PlotId(5)));

    session.dispatch(Action::Irrigate).unwrap();
    let irrigated = frames.recv().await.unwrap();
    assert_eq!(irrigated.credits, 90);
    assert_eq!(irrigated.plots[5].water_level(), 80.0);

    let ticked = frames.recv().await.unwrap();
    assert_eq!(ticked.time_unit, 1);
    session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn rejected_actions_publish_nothing() {
    let mut session = session(4);
    let mut frames = session.subscribe();

    let err = session.dispatch(Action::Irrigate).unwrap_err();
    assert!(err.is_validation());
    assert!(frames.try_recv().is_err());

    session.start();
    let started = frames.recv().await.unwrap();
    assert!(started.active);
    session.stop().await;
}
