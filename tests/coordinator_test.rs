//! Integration tests for the load gate, driven on a paused clock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use loadgate::{
    CompletionHook, Endpoint, FetchPlan, GateError, GateSettings, LoadCoordinator,
    LoadInitiator, LoadOptions, LoadPhase, LoadState, Loader, Role,
};

const INTERVAL: Duration = Duration::from_millis(300);

/// Records every load and keeps the hooks for the test to fire.
#[derive(Default)]
struct FakeLoader {
    calls: AtomicUsize,
    hooks: Mutex<Vec<CompletionHook>>,
}

impl FakeLoader {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fire(&self) {
        let hook = self.hooks.lock().unwrap().pop().expect("no hook registered");
        hook.fire();
    }
}

impl Loader for FakeLoader {
    fn begin(&self, _plan: FetchPlan, hook: CompletionHook) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hooks.lock().unwrap().push(hook);
    }
}

struct Fixture {
    gate: LoadCoordinator,
    loader: Arc<FakeLoader>,
    ready: Arc<AtomicBool>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_settings(GateSettings::default())
    }

    fn with_settings(settings: GateSettings) -> Self {
        let ready = Arc::new(AtomicBool::new(false));
        let loader = Arc::new(FakeLoader::default());
        let probe = {
            let ready = Arc::clone(&ready);
            move || ready.load(Ordering::SeqCst)
        };
        let initiator = LoadInitiator::new(Endpoint::default(), loader.clone());
        let gate = LoadCoordinator::new(Arc::new(probe), initiator, settings);
        Self { gate, loader, ready }
    }

    fn make_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }
}

async fn run_pending() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn advance(by: Duration) {
    tokio::time::advance(by).await;
    run_pending().await;
}

#[tokio::test(start_paused = true)]
async fn burst_of_requesters_issues_one_load() {
    let fx = Fixture::new();

    let requesters: Vec<_> = (0..8)
        .map(|_| fx.gate.activate(&LoadOptions::new("abc")).unwrap())
        .collect();

    assert_eq!(fx.loader.calls(), 1);
    assert_eq!(requesters[0].state(), LoadState::Loading(Role::Leader));
    for follower in &requesters[1..] {
        assert_eq!(follower.state(), LoadState::Loading(Role::Follower));
    }
    assert_eq!(fx.gate.stats().loads_issued, 1);
}

#[tokio::test(start_paused = true)]
async fn ready_at_activation_schedules_nothing() {
    let fx = Fixture::new();
    fx.make_ready();

    let requester = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    assert!(requester.is_ready());
    assert_eq!(requester.pending_timers(), 0);
    let stats = fx.gate.stats();
    assert_eq!(stats.phase, LoadPhase::Idle);
    assert!(!stats.hook_registered);
    assert_eq!(stats.loads_issued, 0);
    assert_eq!(fx.loader.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn early_hook_readies_leader_exactly_once() {
    let fx = Fixture::new();
    let leader = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    advance(INTERVAL / 3).await;
    fx.make_ready();
    fx.loader.fire();
    run_pending().await;

    assert!(leader.is_ready());
    assert_eq!(leader.pending_timers(), 0);

    advance(INTERVAL * 3).await;
    let stats = fx.gate.stats();
    assert_eq!(stats.ready_notifications, 1);
    assert_eq!(stats.phase, LoadPhase::Settled);
    assert!(!stats.hook_registered);
}

#[tokio::test(start_paused = true)]
async fn follower_readies_on_next_poll() {
    let fx = Fixture::new();
    let _leader = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    let follower = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    advance(INTERVAL).await;
    assert_eq!(follower.state(), LoadState::Loading(Role::Follower));
    assert_eq!(follower.pending_timers(), 1);

    // Ready between two polls, without the hook.
    advance(INTERVAL / 2).await;
    fx.make_ready();
    assert!(!follower.is_ready());

    advance(INTERVAL / 2).await;
    assert!(follower.is_ready());
    assert_eq!(follower.pending_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_timers_and_suppresses_ready() {
    let fx = Fixture::new();
    let leader = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    let follower = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    let signal = follower.signal();

    follower.teardown();
    run_pending().await;

    fx.make_ready();
    fx.loader.fire();
    advance(INTERVAL * 2).await;

    assert!(leader.is_ready());
    assert_eq!(signal.state(), LoadState::Loading(Role::Follower));
    assert_eq!(fx.gate.stats().ready_notifications, 1);
}

#[tokio::test(start_paused = true)]
async fn leader_teardown_does_not_abort_shared_load() {
    let fx = Fixture::new();
    let leader = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    let follower = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    run_pending().await;
    leader.teardown();
    assert_eq!(fx.gate.stats().phase, LoadPhase::InFlight);

    fx.make_ready();
    fx.loader.fire();
    run_pending().await;

    assert!(follower.is_ready());
}

#[tokio::test(start_paused = true)]
async fn missing_identifier_fails_synchronously() {
    let fx = Fixture::new();

    let err = fx.gate.activate(&LoadOptions::default()).unwrap_err();

    assert!(matches!(err, GateError::MissingIdentifier));
    assert_eq!(fx.loader.calls(), 0);
    assert_eq!(fx.gate.stats().phase, LoadPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn two_requesters_in_one_tick_both_become_ready() {
    let fx = Fixture::new();
    let first = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    let second = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    assert_eq!(fx.gate.stats().phase, LoadPhase::InFlight);

    advance(INTERVAL * 4).await;
    assert!(!first.is_ready());
    assert!(!second.is_ready());

    fx.make_ready();
    fx.loader.fire();
    run_pending().await;

    assert!(first.is_ready());
    assert!(second.is_ready());
    assert_eq!(fx.loader.calls(), 1);
    assert_eq!(fx.gate.stats().ready_notifications, 2);
}

#[tokio::test(start_paused = true)]
async fn late_requester_after_settle_follows() {
    let fx = Fixture::new();
    let _leader = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    fx.loader.fire();

    let late = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    assert_eq!(late.state(), LoadState::Loading(Role::Follower));
    assert_eq!(fx.loader.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn stalled_load_keeps_polling() {
    let fx = Fixture::with_settings(GateSettings {
        poll_interval: INTERVAL,
        stall_warning: Some(Duration::from_secs(1)),
    });
    let requester = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    advance(Duration::from_millis(600)).await;
    assert_eq!(fx.gate.stats().stall_warnings, 0);

    for _ in 0..10 {
        advance(INTERVAL).await;
    }
    assert!(!requester.is_ready());
    assert_eq!(requester.pending_timers(), 1);
    assert_eq!(fx.gate.stats().stall_warnings, 1);

    fx.make_ready();
    advance(INTERVAL).await;
    assert!(requester.is_ready());
    assert_eq!(fx.gate.stats().stall_warnings, 1);
}

#[tokio::test(start_paused = true)]
async fn stall_warning_is_per_requester() {
    let fx = Fixture::with_settings(GateSettings {
        poll_interval: INTERVAL,
        stall_warning: Some(Duration::from_secs(1)),
    });
    let _leader = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    let _follower = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    for _ in 0..10 {
        advance(INTERVAL).await;
    }

    assert_eq!(fx.gate.stats().stall_warnings, 2);
}

#[tokio::test(start_paused = true)]
async fn no_stall_warning_when_disabled() {
    let fx = Fixture::new();
    let _requester = fx.gate.activate(&LoadOptions::new("abc")).unwrap();

    for _ in 0..10 {
        advance(INTERVAL).await;
    }

    assert_eq!(fx.gate.stats().stall_warnings, 0);
}

#[tokio::test(start_paused = true)]
async fn ready_future_resolves_in_another_task() {
    let fx = Fixture::new();
    let requester = fx.gate.activate(&LoadOptions::new("abc")).unwrap();
    let mut signal = requester.signal();

    let waiter = tokio::spawn(async move { signal.wait_ready().await });
    advance(INTERVAL).await;
    assert!(!waiter.is_finished());

    fx.make_ready();
    advance(INTERVAL).await;

    assert!(waiter.await.unwrap());
    assert!(requester.is_ready());
}

#[tokio::test(start_paused = true)]
async fn loader_may_fire_hook_inline() {
    struct Inline(Arc<AtomicBool>);
    impl Loader for Inline {
        fn begin(&self, _plan: FetchPlan, hook: CompletionHook) {
            self.0.store(true, Ordering::SeqCst);
            hook.fire();
        }
    }

    let ready = Arc::new(AtomicBool::new(false));
    let probe = {
        let ready = Arc::clone(&ready);
        move || ready.load(Ordering::SeqCst)
    };
    let initiator = LoadInitiator::new(Endpoint::default(), Arc::new(Inline(ready)));
    let gate = LoadCoordinator::new(Arc::new(probe), initiator, GateSettings::default());

    let requester = gate.activate(&LoadOptions::new("abc")).unwrap();
    assert_eq!(gate.stats().phase, LoadPhase::Settled);

    // The hook fired before the cycle first waited, so it is picked up on the first tick.
    advance(INTERVAL).await;
    assert!(requester.is_ready());
}
