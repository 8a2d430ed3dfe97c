//! Deployment driver integration tests

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockPlatform;
use tokio_test::assert_ok;
use nimbus::deploy::{DeploymentDriver, DriverOptions, SourcePublisher};
use nimbus::errors::CliError;
use nimbus::models::deployment::{DeployState, PublishReceipt};
use nimbus::utils::BackoffOptions;

fn fast_options() -> DriverOptions {
    DriverOptions {
        poll_interval: Duration::from_millis(1),
        retry_ceiling: 5,
        backoff: BackoffOptions {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 2.0,
        },
    }
}

fn published(platform: Arc<MockPlatform>) -> DeploymentDriver<MockPlatform> {
    let mut driver = DeploymentDriver::new(platform, "app_1", fast_options());
    driver
        .mark_published(PublishReceipt {
            deployment_id: "dep_1".to_string(),
            revision: "r1".to_string(),
        })
        .unwrap();
    driver
}

fn no_sleep(_: Duration) -> std::future::Ready<()> {
    std::future::ready(())
}

#[tokio::test]
async fn test_scenario_full_deploy_reaches_running() {
    let platform = Arc::new(MockPlatform::with_statuses([
        Ok(DeployState::Queued),
        Ok(DeployState::Building),
        Ok(DeployState::Deploying),
        Ok(DeployState::Running),
    ]));
    let driver = published(platform);

    let result = driver.run(no_sleep).await;
    let final_state = tokio_test::assert_ok!(result);
    assert_eq!(final_state, DeployState::Running);
    assert_eq!(driver.state(), DeployState::Running);
}

#[tokio::test]
async fn test_scenario_cancel_during_build() {
    let platform = Arc::new(MockPlatform::with_statuses([Ok(DeployState::Cancelled)]));
    let driver = published(platform.clone());

    driver.observe(DeployState::Queued);
    driver.observe(DeployState::Building);

    driver.request_cancel().await.unwrap();
    assert_eq!(
        platform.cancels.lock().unwrap().as_slice(),
        &[("app_1".to_string(), "dep_1".to_string())]
    );

    // Cancellation is cooperative: polling continues until the
    // platform reports the terminal state.
    let final_state = driver.run(no_sleep).await.unwrap();
    assert_eq!(final_state, DeployState::Cancelled);
    assert_eq!(CliError::DeploymentCancelled.exit_code(), 4);
}

#[tokio::test]
async fn test_scenario_transient_failures_below_ceiling() {
    let platform = Arc::new(MockPlatform::with_statuses([
        Ok(DeployState::Queued),
        Err(()),
        Err(()),
        Err(()),
        Ok(DeployState::Deploying),
        Ok(DeployState::Running),
    ]));
    let driver = published(platform);

    let final_state = driver.run(no_sleep).await.unwrap();
    assert_eq!(final_state, DeployState::Running);
}

#[tokio::test]
async fn test_retry_ceiling_surfaces_unreachable_not_failed() {
    let platform = Arc::new(MockPlatform::with_statuses([
        Ok(DeployState::Queued),
        Err(()),
        Err(()),
        Err(()),
        Err(()),
        Err(()),
    ]));
    let driver = published(platform);

    match driver.run(no_sleep).await {
        Err(CliError::DriverUnreachable { attempts: 5 }) => {}
        other => panic!("expected DriverUnreachable, got {:?}", other),
    }

    // The deployment is not forced into Failed: the last observed
    // state stands and the user can re-attach later.
    assert_eq!(driver.state(), DeployState::Queued);
    assert_eq!(
        CliError::DriverUnreachable { attempts: 5 }.exit_code(),
        3
    );
}

#[tokio::test]
async fn test_err_streak_resets_on_success() {
    // 4 failures, one success, 4 more failures: never reaches the
    // ceiling of 5 consecutive failures.
    let platform = Arc::new(MockPlatform::with_statuses([
        Err(()),
        Err(()),
        Err(()),
        Err(()),
        Ok(DeployState::Building),
        Err(()),
        Err(()),
        Err(()),
        Err(()),
        Ok(DeployState::Running),
    ]));
    let driver = published(platform);

    let final_state = driver.run(no_sleep).await.unwrap();
    assert_eq!(final_state, DeployState::Running);
}

#[test]
fn test_monotonic_exposure_under_disorder() {
    let platform = Arc::new(MockPlatform::new());
    let driver = published(platform);

    let observations = [
        DeployState::Queued,
        DeployState::Building,
        DeployState::Queued,
        DeployState::Building,
        DeployState::Deploying,
        DeployState::Building,
        DeployState::Running,
        DeployState::Queued,
    ];

    let mut exposed = vec![driver.state()];
    for observed in observations {
        driver.observe(observed);
        exposed.push(driver.state());
    }

    for pair in exposed.windows(2) {
        assert!(
            pair[0].rank() <= pair[1].rank(),
            "exposed state regressed: {} -> {}",
            pair[0],
            pair[1]
        );
    }
    assert_eq!(driver.state(), DeployState::Running);
}

#[tokio::test]
async fn test_cancel_gating_in_terminal_states() {
    for terminal in [
        DeployState::Running,
        DeployState::Failed,
        DeployState::Cancelled,
    ] {
        let platform = Arc::new(MockPlatform::new());
        let driver = published(platform);
        driver.observe(DeployState::Queued);
        driver.observe(terminal);

        match driver.request_cancel().await {
            Err(CliError::InvalidCancelState(state)) => assert_eq!(state, terminal),
            other => panic!("expected InvalidCancelState, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_cancel_allowed_in_cancellable_states() {
    for state in [
        DeployState::Queued,
        DeployState::Building,
        DeployState::Deploying,
    ] {
        let platform = Arc::new(MockPlatform::new());
        let driver = published(platform.clone());
        // walk up to the target state
        for step in [
            DeployState::Queued,
            DeployState::Building,
            DeployState::Deploying,
        ] {
            if step.rank() <= state.rank() {
                driver.observe(step);
            }
        }
        assert_eq!(driver.state(), state);
        driver.request_cancel().await.unwrap();
        assert_eq!(platform.cancels.lock().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_publish_conflict_mapping() {
    let platform = MockPlatform::new();
    platform.publishes.lock().unwrap().push_back(Err(CliError::Api {
        status: 409,
        body: "deployment in flight".to_string(),
    }));

    let publisher = SourcePublisher::new(&platform);
    match publisher.publish(&common::app("app_1"), "").await {
        Err(CliError::PublishConflict(_)) => {}
        other => panic!("expected PublishConflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_publish_rejected_mapping() {
    let platform = MockPlatform::new();
    platform.publishes.lock().unwrap().push_back(Err(CliError::Api {
        status: 403,
        body: "bad credentials".to_string(),
    }));

    let publisher = SourcePublisher::new(&platform);
    match publisher.publish(&common::app("app_1"), "main").await {
        Err(CliError::PublishRejected(_)) => {}
        other => panic!("expected PublishRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_publish_success_returns_receipt() {
    let platform = MockPlatform::new();
    platform
        .publishes
        .lock()
        .unwrap()
        .push_back(Ok(PublishReceipt {
            deployment_id: "dep_9".to_string(),
            revision: "r9".to_string(),
        }));

    let publisher = SourcePublisher::new(&platform);
    let receipt = publisher.publish(&common::app("app_1"), "main").await.unwrap();
    assert_eq!(receipt.deployment_id, "dep_9");
    assert_eq!(receipt.revision, "r9");
}
