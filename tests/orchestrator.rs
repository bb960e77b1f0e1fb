//! End-to-end launcher scenarios driven through mockall-generated services
//!
//! Every path of the startup state machine is exercised without spawning a
//! single real process: happy path, readiness timeout, missing artifacts,
//! early server death, crash while running, and clean shutdown.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use dcub_launcher::error::LauncherError;
use dcub_launcher::traits::{
    MockPortScanner, MockProcessManager, MockServerProbe, MockWindowShell, WebServerHandle,
};
use dcub_launcher::{AppOrchestrator, LauncherConfig, LauncherState};

fn test_config() -> LauncherConfig {
    LauncherConfig::new(
        PathBuf::from("/bundle/standalone/server.js"),
        PathBuf::from("/bundle/backend/fastapi_server"),
    )
    .with_ready_timeout(Duration::from_secs(3))
    .with_retry_interval(Duration::from_secs(1))
    .with_reap_grace(Duration::from_secs(1))
}

fn free_port_scanner() -> MockPortScanner {
    let mut scanner = MockPortScanner::new();
    scanner.expect_pids_on_port().returning(|_| Ok(vec![]));
    scanner
}

#[tokio::test]
async fn server_ready_on_first_probe_reaches_running_and_spawns_backend_once() {
    let scanner = free_port_scanner();

    let mut probe = MockServerProbe::new();
    probe.expect_probe().times(1).returning(|_, _| Ok(()));

    let mut manager = MockProcessManager::new();
    manager
        .expect_spawn_web_server()
        .times(1)
        .returning(|_| Ok(WebServerHandle::idle(100)));
    manager
        .expect_spawn_backend()
        .times(1)
        .returning(|_| Ok(200));

    let mut shell = MockWindowShell::new();
    shell
        .expect_show_window()
        .times(1)
        .withf(|url| url.host_str() == Some("127.0.0.1"))
        .returning(|_| Ok(()));

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    orchestrator.start().await.unwrap();

    assert_eq!(orchestrator.state(), LauncherState::Running);
    assert_eq!(orchestrator.backend_pid(), Some(200));
}

#[tokio::test(start_paused = true)]
async fn server_that_never_answers_fails_startup_and_stops_children() {
    let scanner = free_port_scanner();

    let mut probe = MockServerProbe::new();
    probe
        .expect_probe()
        .returning(|_, _| Err(LauncherError::probe("connection refused")));

    let mut manager = MockProcessManager::new();
    manager
        .expect_spawn_web_server()
        .times(1)
        .returning(|_| Ok(WebServerHandle::idle(100)));
    manager.expect_stop_all().times(1).returning(|| Ok(()));
    // No backend launch and no window on the failure path.
    manager.expect_spawn_backend().times(0);
    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(0);

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    let err = orchestrator.start().await.unwrap_err();

    assert!(matches!(err, LauncherError::ReadyTimeout { .. }));
    assert_eq!(orchestrator.state(), LauncherState::Failed);
}

#[tokio::test]
async fn missing_artifacts_abort_before_any_probe() {
    let scanner = free_port_scanner();

    let mut probe = MockServerProbe::new();
    probe.expect_probe().times(0);

    let mut manager = MockProcessManager::new();
    manager.expect_spawn_web_server().times(1).returning(|_| {
        Err(LauncherError::MissingArtifact {
            path: PathBuf::from("/bundle/standalone/server.js"),
        })
    });
    manager.expect_stop_all().times(1).returning(|| Ok(()));

    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(0);

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    let err = orchestrator.start().await.unwrap_err();

    assert!(matches!(err, LauncherError::MissingArtifact { .. }));
    assert_eq!(orchestrator.state(), LauncherState::Failed);
}

#[tokio::test]
async fn backend_spawn_failure_is_not_fatal() {
    let scanner = free_port_scanner();

    let mut probe = MockServerProbe::new();
    probe.expect_probe().times(1).returning(|_, _| Ok(()));

    let mut manager = MockProcessManager::new();
    manager
        .expect_spawn_web_server()
        .times(1)
        .returning(|_| Ok(WebServerHandle::idle(100)));
    manager.expect_spawn_backend().times(1).returning(|_| {
        Err(LauncherError::MissingArtifact {
            path: PathBuf::from("/bundle/backend/fastapi_server"),
        })
    });

    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(1).returning(|_| Ok(()));

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    orchestrator.start().await.unwrap();

    // Degraded mode: UI up, no backend pid tracked.
    assert_eq!(orchestrator.state(), LauncherState::Running);
    assert_eq!(orchestrator.backend_pid(), None);
}

#[tokio::test]
async fn server_dying_before_readiness_is_fatal() {
    let scanner = free_port_scanner();

    let mut probe = MockServerProbe::new();
    probe
        .expect_probe()
        .returning(|_, _| Err(LauncherError::probe("connection refused")));

    let mut manager = MockProcessManager::new();
    manager.expect_spawn_web_server().times(1).returning(|_| {
        let (tx, rx) = mpsc::channel(1);
        tx.try_send(1).unwrap();
        Ok(WebServerHandle::new(100, rx))
    });
    manager.expect_stop_all().times(1).returning(|| Ok(()));

    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(0);

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    let err = orchestrator.start().await.unwrap_err();

    assert!(matches!(err, LauncherError::ServerExited { code: 1 }));
    assert_eq!(orchestrator.state(), LauncherState::Failed);
}

#[tokio::test]
async fn shutdown_request_terminates_both_children() {
    let scanner = free_port_scanner();

    let mut probe = MockServerProbe::new();
    probe.expect_probe().times(1).returning(|_, _| Ok(()));

    let mut manager = MockProcessManager::new();
    manager
        .expect_spawn_web_server()
        .times(1)
        .returning(|_| Ok(WebServerHandle::idle(100)));
    manager
        .expect_spawn_backend()
        .times(1)
        .returning(|_| Ok(200));
    manager.expect_stop_all().times(1).returning(|| Ok(()));

    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(1).returning(|_| Ok(()));

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    orchestrator.start().await.unwrap();

    let shutdown = orchestrator.get_shutdown_sender();
    shutdown.send(()).await.unwrap();

    orchestrator.run().await.unwrap();
    assert_eq!(orchestrator.state(), LauncherState::Terminated);
    assert_eq!(orchestrator.backend_pid(), None);
}

#[tokio::test]
async fn server_crash_while_running_is_fatal() {
    let scanner = free_port_scanner();

    let mut probe = MockServerProbe::new();
    probe.expect_probe().times(1).returning(|_, _| Ok(()));

    let (exit_tx, exit_rx) = mpsc::channel(1);
    let handle = WebServerHandle::new(100, exit_rx);

    let mut manager = MockProcessManager::new();
    manager
        .expect_spawn_web_server()
        .times(1)
        .return_once(move |_| Ok(handle));
    manager
        .expect_spawn_backend()
        .times(1)
        .returning(|_| Ok(200));
    manager.expect_stop_all().times(1).returning(|| Ok(()));

    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(1).returning(|_| Ok(()));

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    orchestrator.start().await.unwrap();

    exit_tx.send(2).await.unwrap();
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, LauncherError::ServerExited { code: 2 }));
    assert_eq!(orchestrator.state(), LauncherState::Failed);
}

#[tokio::test(start_paused = true)]
async fn stale_port_is_reaped_before_the_server_launch() {
    let mut scanner = MockPortScanner::new();
    scanner
        .expect_pids_on_port()
        .times(1)
        .returning(|_| Ok(vec![4242]));
    scanner.expect_kill().times(1).returning(|_| Ok(()));

    let mut probe = MockServerProbe::new();
    probe.expect_probe().times(1).returning(|_, _| Ok(()));

    let mut manager = MockProcessManager::new();
    manager
        .expect_spawn_web_server()
        .times(1)
        .returning(|_| Ok(WebServerHandle::idle(100)));
    manager
        .expect_spawn_backend()
        .times(1)
        .returning(|_| Ok(200));

    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(1).returning(|_| Ok(()));

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    orchestrator.start().await.unwrap();
    assert_eq!(orchestrator.state(), LauncherState::Running);
}

#[tokio::test]
async fn reap_failure_does_not_block_the_launch() {
    let mut scanner = MockPortScanner::new();
    scanner
        .expect_pids_on_port()
        .times(1)
        .returning(|_| Err(LauncherError::port_scan("lsof not available")));

    let mut probe = MockServerProbe::new();
    probe.expect_probe().times(1).returning(|_, _| Ok(()));

    let mut manager = MockProcessManager::new();
    manager
        .expect_spawn_web_server()
        .times(1)
        .returning(|_| Ok(WebServerHandle::idle(100)));
    manager
        .expect_spawn_backend()
        .times(1)
        .returning(|_| Ok(200));

    let mut shell = MockWindowShell::new();
    shell.expect_show_window().times(1).returning(|_| Ok(()));

    let mut orchestrator = AppOrchestrator::new(test_config(), scanner, probe, manager, shell);
    orchestrator.start().await.unwrap();
    assert_eq!(orchestrator.state(), LauncherState::Running);
}
