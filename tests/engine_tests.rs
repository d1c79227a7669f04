use camscout::config::ScanConfig;
use camscout::engine::{ProgressSink, ScanEngine, ScanProgress, SilentProgress};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use test_utils::{create_candidate, spawn_http_server, CannedResponse, TestServer};
use tokio::net::TcpListener;


fn fast_config(workers: usize, adjacent_depth: u16, optimistic: bool) -> ScanConfig {
    ScanConfig {
        workers,
        adjacent_depth,
        optimistic,
        common_ports: false,
        base_timeout_ms: 200,
        max_attempts: 2,
        ..ScanConfig::default()
    }
}

/// Accept and immediately drop every connection: a port that is alive but
/// never looks like a camera
fn spawn_accept_drop(listener: TcpListener) {
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            drop(socket);
        }
    });
}

/// Claim a center port plus `depth` ports on either side, all held by
/// accept-and-drop listeners so nothing else can squat there and answer
/// like a camera. Returns the center port.
async fn dead_band(depth: i32) -> u16 {
    'attempt: for _ in 0..20 {
        let center = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = center.local_addr().unwrap().port();
        if i32::from(port) - depth < 1024 || i32::from(port) + depth > 65535 {
            continue;
        }

        let mut neighbors = Vec::new();
        for i in 1..=depth {
            for p in [i32::from(port) - i, i32::from(port) + i] {
                match TcpListener::bind(("127.0.0.1", p as u16)).await {
                    Ok(listener) => neighbors.push(listener),
                    Err(_) => continue 'attempt,
                }
            }
        }

        spawn_accept_drop(center);
        for listener in neighbors {
            spawn_accept_drop(listener);
        }
        return port;
    }
    panic!("could not claim a free port band");
}

/// Hold the `depth` ports on either side of an already-running server
/// with accept-and-drop listeners. False when any of them is taken.
async fn secure_band_around(port: u16, depth: i32) -> bool {
    for i in 1..=depth {
        for p in [i32::from(port) - i, i32::from(port) + i] {
            if !(1..=65535).contains(&p) {
                return false;
            }
            match TcpListener::bind(("127.0.0.1", p as u16)).await {
                Ok(listener) => spawn_accept_drop(listener),
                Err(_) => return false,
            }
        }
    }
    true
}

/// Spawn a camera-like canned server whose adjacent band is guaranteed
/// dead
async fn camera_server_with_dead_band(depth: i32) -> TestServer {
    for _ in 0..20 {
        let server = spawn_http_server(|path| {
            if path.contains("videostream.cgi") {
                Some(CannedResponse::status(200))
            } else {
                Some(CannedResponse::status(404))
            }
        })
        .await;

        if secure_band_around(server.addr.port(), depth).await {
            return server;
        }
    }
    panic!("could not claim a free port band around a server");
}

struct CountingSink {
    reports: AtomicUsize,
}

impl ProgressSink for CountingSink {
    fn report(&self, _progress: &ScanProgress) {
        self.reports.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn crawl_modes_agree_on_dead_input() {
    let candidates = vec![
        create_candidate("127.0.0.1", dead_band(1).await),
        create_candidate("127.0.0.1", dead_band(1).await),
    ];

    for optimistic in [false, true] {
        let engine = ScanEngine::from_config(&fast_config(3, 1, optimistic)).unwrap();
        let report = engine
            .run(candidates.clone(), Arc::new(SilentProgress))
            .await;

        assert!(
            report.confirmed.is_empty(),
            "optimistic={} confirmed {}",
            optimistic,
            report.confirmed.len()
        );
        assert!(report.processed >= candidates.len());
        assert_eq!(report.processed, report.total);
    }
}

#[tokio::test]
async fn duplicate_seed_candidates_are_processed_once() {
    let port = dead_band(0).await;
    let candidates = vec![
        create_candidate("127.0.0.1", port),
        create_candidate("127.0.0.1", port),
    ];

    let engine = ScanEngine::from_config(&fast_config(2, 0, false)).unwrap();
    let report = engine.run(candidates, Arc::new(SilentProgress)).await;

    assert_eq!(report.processed, 1);
    assert_eq!(report.total, 1);
    assert!(report.confirmed.is_empty());
}

#[tokio::test]
async fn pessimistic_hit_expands_the_adjacent_band() {
    let server = camera_server_with_dead_band(2).await;
    let port = server.addr.port();

    let engine = ScanEngine::from_config(&fast_config(3, 2, false)).unwrap();
    let report = engine
        .run(
            vec![create_candidate("127.0.0.1", port)],
            Arc::new(SilentProgress),
        )
        .await;

    // The hit itself plus the four adjacent siblings it discovered
    assert_eq!(report.total, 5);
    assert_eq!(report.processed, 5);

    let confirmed_ports: HashSet<u16> = report.confirmed.iter().map(|c| c.port).collect();
    assert_eq!(confirmed_ports, HashSet::from([port]));
}

#[tokio::test]
async fn optimistic_mode_expands_before_probing() {
    let server = camera_server_with_dead_band(1).await;
    let port = server.addr.port();

    let engine = ScanEngine::from_config(&fast_config(3, 1, true)).unwrap();
    let report = engine
        .run(
            vec![create_candidate("127.0.0.1", port)],
            Arc::new(SilentProgress),
        )
        .await;

    // Expansion happened up front; confirming the hit added nothing new
    assert_eq!(report.total, 3);
    assert_eq!(report.processed, 3);
    assert_eq!(report.confirmed.len(), 1);
    assert_eq!(report.confirmed[0].port, port);
}

#[tokio::test]
async fn cancelled_run_stops_pulling_work() {
    let candidates = vec![
        create_candidate("127.0.0.1", dead_band(0).await),
        create_candidate("127.0.0.1", dead_band(0).await),
    ];

    let cancel = Arc::new(AtomicBool::new(true));
    let engine = ScanEngine::from_config(&fast_config(2, 0, false)).unwrap();
    let report = engine
        .run_with_cancel(candidates, Arc::new(SilentProgress), cancel)
        .await;

    assert_eq!(report.processed, 0);
    assert!(report.confirmed.is_empty());
}

#[tokio::test]
async fn progress_sink_receives_samples() {
    let sink = Arc::new(CountingSink {
        reports: AtomicUsize::new(0),
    });

    let engine = ScanEngine::from_config(&fast_config(1, 0, false)).unwrap();
    let report = engine
        .run(
            vec![create_candidate("127.0.0.1", dead_band(0).await)],
            sink.clone(),
        )
        .await;

    assert_eq!(report.processed, 1);
    // The final sample after the queue drains always arrives
    assert!(sink.reports.load(Ordering::SeqCst) >= 1);
}
