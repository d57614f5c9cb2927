
use std::cell::Cell;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time;

use crossbeam_channel as chan;

use metier_common::chain::{Catalog, Chain};
use metier_common::engine::{BlockStorage, ChainStatus, Endpoint, SyncEndpoints};
use metier_test::logger;

use crate::bootstrap::{self, Launch, Running};
use crate::error::Error;
use crate::monitor::{Monitor, Scheduler};
use crate::options::Options;
use crate::resolver::{self, Config};

use mock::Call;

fn config(args: &[&str]) -> Config {
    let catalog = Catalog::default();
    let opts = Options::parse(
        &catalog,
        std::iter::once("metier-server").chain(args.iter().copied()),
    )
    .unwrap();

    resolver::resolve(&catalog, opts.pairs)
}

fn launch(cfg: &Config) -> Result<Running<mock::Engine>, bootstrap::Error> {
    match bootstrap::launch(cfg, |settings| Ok(mock::Engine::new(settings)))? {
        Launch::Running(running) => Ok(running),
        Launch::Help => panic!("unexpected help"),
    }
}

#[test]
fn test_sync_server_without_public_addr() {
    logger::init(log::Level::Debug);

    let cfg = config(&["--btc", "--sync_server=9000"]);
    let initialized = Cell::new(false);
    let result = bootstrap::launch(&cfg, |settings| {
        initialized.set(true);
        Ok(mock::Engine::new(settings))
    });

    assert!(matches!(result, Err(bootstrap::Error::MissingPublicAddr)));
    assert!(!initialized.get(), "the engine is never started");
    assert_eq!(
        result.unwrap_err().to_string(),
        "Mandatory argument --public_addr not specified"
    );
}

#[test]
fn test_run_fails_without_public_addr() {
    let cfg = config(&["--sync_server", "9000"]);
    let result = crate::run_with(cfg, &Catalog::default(), |_| -> Result<mock::Engine, _> {
        panic!("the engine is never started")
    });

    assert!(matches!(
        result,
        Err(Error::Bootstrap(bootstrap::Error::MissingPublicAddr))
    ));
}

#[test]
fn test_help_skips_engine() {
    let cfg = config(&["--all", "--help", "--sync_server=9000"]);
    let launch = bootstrap::launch(&cfg, |_| -> Result<mock::Engine, _> {
        panic!("the engine is never started")
    })
    .unwrap();

    assert!(matches!(launch, Launch::Help));
}

#[test]
fn test_launch() {
    let cfg = config(&[
        "--bch",
        "--btc=1.2.3.4",
        "--ltc=off",
        "--sync_server=8814",
        "--public_addr=sync.example.com",
        "--block_storage=0",
    ]);
    let running = launch(&cfg).unwrap();
    let settings = running.engine.settings.clone().unwrap();

    assert_eq!(running.chains, vec![Chain::Bitcoin, Chain::BitcoinCash]);
    assert_eq!(settings.block_storage, BlockStorage::All);
    assert!(settings.sync_server);
    assert!(settings.disabled.contains(&Chain::Litecoin));
    assert_eq!(
        running.engine.calls(),
        vec![
            Call::Enable(Chain::Bitcoin, String::from("1.2.3.4")),
            Call::Enable(Chain::BitcoinCash, String::new()),
            Call::Listen(SyncEndpoints {
                local: Endpoint::new("0.0.0.0", 8814),
                public: Endpoint::new("sync.example.com", 8814),
                local_next: Endpoint::new("0.0.0.0", 8815),
                public_next: Endpoint::new("sync.example.com", 8815),
            }),
        ]
    );
}

#[test]
fn test_launch_without_sync_server() {
    let cfg = config(&["--all", "--tnbtc=off", "--public_addr=1.2.3.4"]);
    let running = launch(&cfg).unwrap();
    let calls = running.engine.calls();

    assert_eq!(calls.len(), Chain::ALL.len() - 1);
    assert!(calls.iter().all(|c| matches!(c, Call::Enable(_, _))));
    assert!(!calls.contains(&Call::Enable(Chain::BitcoinTestnet3, String::new())));
    assert!(!running.engine.settings.unwrap().sync_server);
}

#[test]
fn test_engine_error_is_returned() {
    let cfg = config(&["--btc", "--bch", "--sync_server=8814", "--public_addr=1.2.3.4"]);
    let engine = mock::Engine::failing(Chain::Bitcoin);
    let handle = engine.clone();
    let result = bootstrap::launch(&cfg, move |_| Ok(engine));

    assert!(matches!(
        result,
        Err(bootstrap::Error::Engine(
            metier_common::engine::Error::Disabled(Chain::Bitcoin)
        ))
    ));
    assert_eq!(
        handle.calls(),
        vec![Call::Enable(Chain::Bitcoin, String::new())],
        "nothing happens after a failure"
    );
}

#[test]
fn test_report_order_is_fixed() {
    let a = launch(&config(&["--bch", "--btc"])).unwrap();
    let b = launch(&config(&["--btc", "--bch"])).unwrap();

    a.engine.set(
        Chain::BitcoinCash,
        ChainStatus {
            peers: 4,
            ..ChainStatus::default()
        },
    );
    b.engine.set(
        Chain::BitcoinCash,
        ChainStatus {
            peers: 4,
            ..ChainStatus::default()
        },
    );

    let ma = Monitor::new(a.engine.clone(), a.chains.iter().copied());
    let mb = Monitor::new(b.engine.clone(), b.chains.iter().copied());
    let (mut ra, mut rb) = (String::new(), String::new());

    assert!(ma.tick(|r| ra = r));
    assert!(mb.tick(|r| rb = r));
    assert_eq!(ra, rb);
    assert_eq!(ma.table().chains(), &[Chain::Bitcoin, Chain::BitcoinCash]);

    let rows = ra.lines().skip(2).map(str::trim_start).collect::<Vec<_>>();

    assert!(rows[0].starts_with("Bitcoin "));
    assert!(rows[1].starts_with("Bitcoin Cash "));
    assert!(rows[1].contains(" 4 "));
}

#[test]
fn test_monitor_never_overlaps() {
    let engine = mock::Engine::slow(time::Duration::from_millis(200));
    let monitor = Arc::new(Monitor::new(engine.clone(), [Chain::Bitcoin]));
    let barrier = Arc::new(Barrier::new(4));
    let threads = (0..4)
        .map(|_| {
            let monitor = monitor.clone();
            let barrier = barrier.clone();

            thread::spawn(move || {
                barrier.wait();
                monitor.tick(|_| {})
            })
        })
        .collect::<Vec<_>>();
    let fired = threads
        .into_iter()
        .map(|t| t.join().unwrap())
        .filter(|fired| *fired)
        .count();

    assert!(fired >= 1);
    assert_eq!(engine.peak(), 1);
    assert_eq!(
        engine.calls().iter().filter(|c| **c == Call::Stats).count(),
        fired
    );

    // Once the report is done, the monitor can fire again.
    assert!(monitor.tick(|_| {}));
}

#[test]
fn test_scheduler() {
    let engine = mock::Engine::slow(time::Duration::from_millis(30));
    let monitor = Arc::new(Monitor::new(engine.clone(), [Chain::Dash, Chain::Bitcoin]));
    let (tx, rx) = chan::unbounded();
    let scheduler = Scheduler::spawn(monitor, time::Duration::from_millis(5), move |report| {
        tx.send(report).ok();
    })
    .unwrap();

    let first = rx.recv_timeout(time::Duration::from_secs(5)).unwrap();
    let second = rx.recv_timeout(time::Duration::from_secs(5)).unwrap();

    scheduler.shutdown().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 4);
    assert_eq!(engine.peak(), 1);
}

#[test]
fn test_malformed_port_is_not_fatal() {
    let cfg = config(&["--sync_server", "-1", "--doge", "--btc"]);
    let running = launch(&cfg).unwrap();

    assert!(!cfg.sync_server());
    assert_eq!(running.engine.calls(), vec![Call::Enable(Chain::Bitcoin, String::new())]);

    let cfg = config(&["--sync_server", "-1", "--help"]);

    assert!(cfg.help);
    assert!(!cfg.sync_server());
}
