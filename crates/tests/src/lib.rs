//! # Integration Tests
//!
//! Cross-crate end-to-end scenarios.
//!
//! Covers:
//! - contract smoke tests
//! - channel lifecycle at real time scale
//! - configuration to running channel through the provider registry

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        let blueprint = config_loader::ConfigLoader::factory().unwrap();
        assert_eq!(blueprint.display.layout.total_rows(), 4);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use channel::{Channel, ChannelHealth, ChannelSettings};
    use contracts::{Content, FetchFunction, RenderFunction};
    use dispatcher::{
        ChannelMetrics, Executor, ExecutorConfig, Producer, SubmitOutcome, Task, WorkerState,
    };
    use tokio::time::sleep;

    type Rendered = Arc<Mutex<Vec<Vec<String>>>>;

    fn recording_render() -> (RenderFunction, Rendered) {
        let rendered: Rendered = Arc::new(Mutex::new(Vec::new()));
        let sink = rendered.clone();
        let render: RenderFunction = Arc::new(move |content: &Content| {
            sink.lock().unwrap().push(content.texts());
        });
        (render, rendered)
    }

    fn constant(lines: &'static [&'static str]) -> FetchFunction {
        Arc::new(move || Content::from_plain(lines.iter().copied()))
    }

    fn sleeping(duration: Duration) -> FetchFunction {
        Arc::new(move || {
            std::thread::sleep(duration);
            Content::from_plain(["late"])
        })
    }

    /// Fetch returns ["OK"] every time, period 1s, run for 3.5s
    #[tokio::test]
    async fn test_ok_channel_renders_at_least_twice() {
        let (render, rendered) = recording_render();
        let mut channel =
            Channel::new("ok", constant(&["OK"]), render, Duration::from_secs(1)).unwrap();

        assert!(channel.no_signal());
        channel.turn_on().unwrap();
        sleep(Duration::from_millis(3500)).await;

        assert!(!channel.no_signal());
        assert_eq!(channel.health(), ChannelHealth::Live);
        {
            let rendered = rendered.lock().unwrap();
            assert!(rendered.len() >= 2, "rendered {} times", rendered.len());
            assert!(rendered.iter().all(|lines| lines == &vec!["OK".to_string()]));
        }

        assert_eq!(channel.turn_off().await.unwrap(), WorkerState::Stopped);
    }

    /// Fetch always returns empty content
    #[tokio::test]
    async fn test_empty_channel_never_has_signal() {
        let (render, rendered) = recording_render();
        let mut channel = Channel::new(
            "empty",
            Arc::new(Content::empty),
            render,
            Duration::from_millis(200),
        )
        .unwrap();

        channel.turn_on().unwrap();
        let started = Instant::now();
        while started.elapsed() < Duration::from_millis(1500) {
            assert!(channel.no_signal());
            sleep(Duration::from_millis(50)).await;
        }

        assert!(rendered.lock().unwrap().is_empty());
        let metrics = channel.metrics();
        assert!(metrics.executed >= 3);
        assert_eq!(metrics.empty_results, metrics.executed);
        channel.turn_off().await.unwrap();
    }

    /// Task queue bound 1, producer period 0.1s, worker held back for 5s
    #[tokio::test]
    async fn test_full_task_queue_drops_instead_of_queueing() {
        let metrics = Arc::new(ChannelMetrics::new());
        let mut executor = Executor::new(
            "held",
            ExecutorConfig {
                task_queue_capacity: 1,
                ..ExecutorConfig::default()
            },
            metrics.clone(),
        );
        let queue = executor.take_task_queue().unwrap();
        let mut producer = Producer::new(
            "held",
            Duration::from_millis(100),
            constant(&["OK"]),
            queue,
        );

        producer.start().unwrap();
        sleep(Duration::from_secs(5)).await;
        producer.stop().await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 1);
        assert!(snapshot.dropped >= 40, "dropped {}", snapshot.dropped);
        // at most floor(d / p) + 1 accepted submissions
        assert!(snapshot.submitted + snapshot.dropped <= 51);

        executor.start().unwrap();
        let stopped = tokio::time::timeout(Duration::from_secs(3), executor.stop())
            .await
            .expect("executor stop exceeded its grace period")
            .unwrap();
        assert_eq!(stopped, WorkerState::Stopped);
    }

    #[tokio::test]
    async fn test_turn_on_then_off_immediately() {
        let (render, rendered) = recording_render();
        let mut channel =
            Channel::new("blink", constant(&["OK"]), render, Duration::from_secs(1)).unwrap();

        let started = Instant::now();
        channel.turn_on().unwrap();
        let worker = channel.turn_off().await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(worker, WorkerState::Stopped);
        assert!(rendered.lock().unwrap().is_empty());
        assert_eq!(channel.metrics().submitted, 0);
    }

    #[tokio::test]
    async fn test_executor_stop_returns_within_grace_with_queued_tasks() {
        let grace = Duration::from_millis(500);
        let metrics = Arc::new(ChannelMetrics::new());
        let mut executor = Executor::new(
            "stuck",
            ExecutorConfig {
                task_queue_capacity: 4,
                result_queue_capacity: 4,
                grace_period: grace,
            },
            metrics,
        );
        let queue = executor.take_task_queue().unwrap();
        let fetch = sleeping(Duration::from_secs(3));
        for seq in 0..3 {
            assert_eq!(
                queue.try_submit(Task::new(seq, fetch.clone())),
                SubmitOutcome::Accepted
            );
        }

        executor.start().unwrap();
        sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        let state = executor.stop().await.unwrap();
        assert!(
            started.elapsed() < grace + Duration::from_millis(300),
            "stop took {:?}",
            started.elapsed()
        );
        assert_eq!(state, WorkerState::Abandoned);
    }

    /// A hung fetch on one channel never delays another channel's rendering
    #[tokio::test]
    async fn test_hung_channel_does_not_stall_others() {
        let (live_render, live_rendered) = recording_render();
        let (hung_render, hung_rendered) = recording_render();

        let mut live = Channel::new(
            "live",
            constant(&["fresh"]),
            live_render,
            Duration::from_millis(100),
        )
        .unwrap();
        let mut hung = Channel::with_settings(
            "hung",
            sleeping(Duration::from_secs(5)),
            hung_render,
            ChannelSettings {
                stop_grace: Duration::from_millis(200),
                ..ChannelSettings::with_update_period(Duration::from_millis(100))
            },
        )
        .unwrap();

        live.turn_on().unwrap();
        hung.turn_on().unwrap();
        sleep(Duration::from_millis(800)).await;

        assert!(!live.no_signal());
        assert!(hung.no_signal());
        assert!(live_rendered.lock().unwrap().len() >= 3);
        assert!(hung_rendered.lock().unwrap().is_empty());
        assert!(hung.metrics().dropped >= 1);

        let started = Instant::now();
        assert_eq!(hung.turn_off().await.unwrap(), WorkerState::Abandoned);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(live.turn_off().await.unwrap(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn test_display_static_only_while_no_signal() {
        let (render, _rendered) = recording_render();
        let drawn = Arc::new(Mutex::new(0usize));
        let counter = drawn.clone();

        let mut channel = Channel::new(
            "static",
            constant(&["OK"]),
            render,
            Duration::from_millis(100),
        )
        .unwrap()
        .with_static_hook(Arc::new(move |_: &dyn Fn() -> bool| {
            *counter.lock().unwrap() += 1
        }));

        assert!(channel.display_static());
        channel.turn_on().unwrap();
        sleep(Duration::from_millis(400)).await;
        assert!(!channel.display_static());
        assert_eq!(*drawn.lock().unwrap(), 1);

        channel.turn_off().await.unwrap();
    }
}

#[cfg(all(test, unix))]
mod config_e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use channel::{Channel, ChannelHealth};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Content, RenderFunction};
    use tokio::time::sleep;

    const CONFIG: &str = r#"
[display]
layout = "0+1+1+0"

[[channels]]
name = "echo"
surface = 0
update_period_secs = 0.1
provider = { kind = "command", program = "echo", args = ["OK"] }

[[channels]]
name = "missing"
surface = 1
update_period_secs = 0.1
provider = { kind = "command", program = "radiator-test-no-such-program" }
"#;

    #[tokio::test]
    async fn test_config_to_running_channels() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();

        let mut channels = Vec::new();
        let mut outputs = Vec::new();
        for config in &blueprint.channels {
            let rendered = Arc::new(Mutex::new(Vec::<Vec<String>>::new()));
            let sink = rendered.clone();
            let render: RenderFunction =
                Arc::new(move |content: &Content| sink.lock().unwrap().push(content.texts()));

            let fetch = content_providers::fetch_function_for(config).unwrap();
            let mut channel = Channel::from_config(config, fetch, render).unwrap();
            channel.turn_on().unwrap();
            channels.push(channel);
            outputs.push(rendered);
        }

        sleep(Duration::from_millis(700)).await;

        // spawn failure of a missing program is "no data", never an error
        assert_eq!(channels[0].health(), ChannelHealth::Live);
        assert_eq!(channels[1].health(), ChannelHealth::NoSignal);
        assert!(outputs[0]
            .lock()
            .unwrap()
            .iter()
            .all(|lines| lines == &vec!["OK".to_string()]));
        assert!(outputs[1].lock().unwrap().is_empty());
        assert!(channels[1].metrics().executed >= 1);

        for channel in &mut channels {
            channel.turn_off().await.unwrap();
        }
    }
}
