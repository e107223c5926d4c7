//! End-to-end behavior of the shared state, persistence gate and screens.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use marquee::{MemoryStorage, StateRecorder};
use movie_browser::catalog::TransportResponse;
use movie_browser::{
    Action, AppContext, AppState, CatalogConfig, CatalogFetcher, CatalogTransport, FetchError,
    Filter, FilterController, Navigator, Route, ValidationError,
};
use proptest::prelude::*;

const KEY: &str = "movie-browser";

#[derive(Default)]
struct StubTransport {
    responses: RefCell<VecDeque<TransportResponse>>,
    requests: RefCell<Vec<String>>,
}

impl StubTransport {
    fn respond(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(TransportResponse {
            status,
            body: body.to_string(),
        });
        self
    }
}

impl CatalogTransport for StubTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| FetchError::Transport("connection refused".into()))
    }
}

fn context(storage: &Rc<MemoryStorage>) -> Rc<AppContext> {
    Rc::new(AppContext::new(AppState::default(), Rc::clone(storage), KEY))
}

fn navigator(ctx: &Rc<AppContext>, transport: StubTransport) -> Navigator<StubTransport> {
    Navigator::new(
        Rc::clone(ctx),
        CatalogFetcher::new(CatalogConfig::default(), transport),
        "Movie Browser",
    )
}

fn persisted(storage: &MemoryStorage) -> serde_json::Value {
    let raw = storage.get(KEY).expect("snapshot written");
    serde_json::from_str(&raw).expect("snapshot is JSON")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn fresh_install_resolves_default_filter_and_persists_it() {
    let storage = Rc::new(MemoryStorage::new());
    let ctx = context(&storage);

    let _unlocked = ctx.gate().acquire();
    let resolved = FilterController::new(&ctx).resolve_on_load(Some(""));

    assert_eq!(resolved, Filter::NowPlaying);
    assert_eq!(ctx.read().browse.filter(), Some(Filter::NowPlaying));
    assert_eq!(
        persisted(&storage),
        serde_json::json!({
            "auth": { "username": "" },
            "browse": { "homeFilter": "NOW_PLAYING" }
        })
    );
}

#[test]
fn home_activation_on_fresh_install_uses_default() {
    let storage = Rc::new(MemoryStorage::new());
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Home);

    assert_eq!(ctx.read().browse.filter(), Some(Filter::NowPlaying));
    assert_eq!(persisted(&storage)["browse"]["homeFilter"], "NOW_PLAYING");
}

#[test]
fn persisted_filter_is_restored_without_fallback() {
    let storage = Rc::new(MemoryStorage::with_entry(
        KEY,
        r#"{"browse":{"homeFilter":"UPCOMING"}}"#,
    ));
    let ctx = context(&storage);
    let recorder = StateRecorder::attach(ctx.store());
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Home);

    let filters: Vec<_> = recorder
        .snapshots()
        .iter()
        .map(|state| state.browse.filter())
        .collect();
    // Snapshot load, then the explicit SetFilter dispatch
    assert_eq!(filters, vec![Some(Filter::Upcoming), Some(Filter::Upcoming)]);
    assert_eq!(nav.home().unwrap().selected_filter(), Some(Filter::Upcoming));
}

#[test]
fn short_username_never_reaches_the_store() {
    let storage = Rc::new(MemoryStorage::new());
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Login);
    let before = ctx.read();
    let revision = ctx.store().revision();

    let result = nav.login().unwrap().submit("al", "password123");

    assert_eq!(result, Err(ValidationError::UsernameTooShort));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Ensure your username is 3+ alphanumeric characters long"
    );
    assert_eq!(ctx.read(), before);
    assert_eq!(ctx.store().revision(), revision);
    assert_eq!(storage.writes(), 0);
}

#[test]
fn valid_login_sets_username_and_leaves_browse_alone() {
    let storage = Rc::new(MemoryStorage::with_entry(
        KEY,
        r#"{"browse":{"homeFilter":"POPULAR"}}"#,
    ));
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Login);
    let browse_before = ctx.read().browse;

    let next = nav.login().unwrap().submit("alice", "password123");

    assert_eq!(next, Ok(Route::Home));
    assert_eq!(ctx.read().auth.username, "alice");
    assert_eq!(ctx.read().browse, browse_before);
    assert_eq!(persisted(&storage)["auth"]["username"], "alice");
}

#[tokio::test]
async fn server_error_yields_none_and_no_update() {
    let storage = Rc::new(MemoryStorage::new());
    let ctx = context(&storage);
    let fetcher = CatalogFetcher::new(
        CatalogConfig::default(),
        StubTransport::default().respond(500, "{}"),
    );
    let revision = ctx.store().revision();

    assert!(fetcher.fetch(Filter::TopRated, 1).await.is_none());
    assert_eq!(ctx.store().revision(), revision);
    assert!(fetcher.transport().requests.borrow()[0].contains("/top_rated?"));
}

#[tokio::test]
async fn failed_refresh_keeps_the_previous_list() {
    let storage = Rc::new(MemoryStorage::new());
    let ctx = context(&storage);
    let transport = StubTransport::default().respond(
        200,
        r#"{"page":1,"results":[{"id":1,"title":"Alien"}],"total_pages":1,"total_results":1}"#,
    );
    let mut nav = navigator(&ctx, transport);

    nav.navigate(Route::Home);
    let home = nav.home().unwrap();
    assert!(home.refresh().await);
    // No queued response: the transport fails
    assert!(!home.refresh().await);

    assert_eq!(home.movies().unwrap()[0].title, "Alien");
}

// ============================================================================
// Screen transitions
// ============================================================================

#[test]
fn writes_stop_once_the_screen_is_left() {
    let storage = Rc::new(MemoryStorage::new());
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Home);
    let writes = storage.writes();
    nav.leave();

    ctx.dispatch(Action::SetFilter(Filter::Popular));

    assert_eq!(storage.writes(), writes);
    assert_eq!(persisted(&storage)["browse"]["homeFilter"], "NOW_PLAYING");
}

#[test]
fn filter_survives_a_restart() {
    let storage = Rc::new(MemoryStorage::new());
    {
        let ctx = context(&storage);
        let mut nav = navigator(&ctx, StubTransport::default());
        nav.navigate(Route::Home);
        FilterController::new(&ctx).on_tab_selected(Filter::TopRated);
    }

    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());
    nav.navigate(Route::Home);

    assert_eq!(ctx.read().browse.filter(), Some(Filter::TopRated));
}

#[test]
fn home_button_follows_the_last_activated_screen() {
    let storage = Rc::new(MemoryStorage::new());
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    assert!(!ctx.is_home_btn_enabled());
    nav.navigate(Route::Support);
    assert!(ctx.is_home_btn_enabled());
    nav.leave();
    assert!(ctx.is_home_btn_enabled());
    nav.navigate(Route::Home);
    assert!(!ctx.is_home_btn_enabled());
}

#[test]
fn reopening_the_gate_reloads_the_same_state() {
    let storage = Rc::new(MemoryStorage::with_entry(
        KEY,
        r#"{"auth":{"username":"bob"},"browse":{"homeFilter":"UPCOMING"}}"#,
    ));
    let ctx = context(&storage);

    let first = {
        let _unlocked = ctx.gate().acquire();
        ctx.read()
    };
    let second = {
        let _unlocked = ctx.gate().acquire();
        ctx.read()
    };

    assert_eq!(first, second);
    assert_eq!(first.auth.username, "bob");
}

#[test]
fn unknown_persisted_filter_falls_back_and_keeps_the_login() {
    let storage = Rc::new(MemoryStorage::with_entry(
        KEY,
        r#"{"auth":{"username":"alice"},"browse":{"homeFilter":"LATEST"}}"#,
    ));
    let ctx = context(&storage);
    let recorder = StateRecorder::attach(ctx.store());
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Home);

    let state = ctx.read();
    assert_eq!(state.auth.username, "alice");
    assert_eq!(state.browse.filter(), Some(Filter::NowPlaying));
    assert_eq!(
        persisted(&storage),
        serde_json::json!({
            "auth": { "username": "alice" },
            "browse": { "homeFilter": "NOW_PLAYING" }
        })
    );
    assert!(recorder.snapshots().iter().all(|seen| seen.auth.username == "alice"));
}

#[test]
fn non_string_persisted_filter_keeps_the_login() {
    let storage = Rc::new(MemoryStorage::with_entry(
        KEY,
        r#"{"auth":{"username":"alice"},"browse":{"homeFilter":null}}"#,
    ));
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Home);

    assert_eq!(ctx.read().auth.username, "alice");
    assert_eq!(ctx.read().browse.filter(), Some(Filter::NowPlaying));
    assert_eq!(persisted(&storage)["auth"]["username"], "alice");
}

#[test]
fn unparseable_snapshot_counts_as_absent() {
    let storage = Rc::new(MemoryStorage::with_entry(KEY, "{not json"));
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Home);

    assert_eq!(ctx.read().auth.username, "");
    assert_eq!(ctx.read().browse.filter(), Some(Filter::NowPlaying));
}

#[test]
fn unreadable_storage_falls_back_to_defaults() {
    let storage = Rc::new(MemoryStorage::with_entry(
        KEY,
        r#"{"browse":{"homeFilter":"UPCOMING"}}"#,
    ));
    storage.fail_loads(true);
    storage.fail_saves(true);
    let ctx = context(&storage);
    let mut nav = navigator(&ctx, StubTransport::default());

    nav.navigate(Route::Home);
    FilterController::new(&ctx).on_tab_selected(Filter::Popular);

    assert_eq!(ctx.read().browse.filter(), Some(Filter::Popular));
    assert_eq!(storage.writes(), 0);
}

// ============================================================================
// Properties
// ============================================================================

fn filter_strategy() -> impl Strategy<Value = Filter> {
    prop::sample::select(Filter::ALL.to_vec())
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        "[a-z]{3,12}".prop_map(|username| Action::LogIn { username }),
        filter_strategy().prop_map(Action::SetFilter),
    ]
}

#[derive(Debug, Clone)]
enum GateOp {
    Open,
    Close,
    Dispatch(Action),
}

fn gate_op_strategy() -> impl Strategy<Value = GateOp> {
    prop_oneof![
        Just(GateOp::Open),
        Just(GateOp::Close),
        action_strategy().prop_map(GateOp::Dispatch),
    ]
}

proptest! {
    #[test]
    fn updates_leave_other_slices_untouched(
        actions in prop::collection::vec(action_strategy(), 1..20)
    ) {
        let storage = Rc::new(MemoryStorage::new());
        let ctx = context(&storage);

        for action in actions {
            let before = ctx.read();
            ctx.dispatch(action.clone());
            let after = ctx.read();
            match action {
                Action::LogIn { .. } => prop_assert_eq!(&after.browse, &before.browse),
                Action::SetFilter(_) => prop_assert_eq!(&after.auth, &before.auth),
            }
        }
    }

    #[test]
    fn closed_gate_never_writes(ops in prop::collection::vec(gate_op_strategy(), 1..30)) {
        let storage = Rc::new(MemoryStorage::new());
        let ctx = context(&storage);

        for op in ops {
            let was_open = ctx.gate().is_open();
            let writes = storage.writes();
            match op {
                GateOp::Open => ctx.gate().open(),
                GateOp::Close => ctx.gate().close(),
                GateOp::Dispatch(action) => {
                    ctx.dispatch(action);
                }
            }
            if !was_open && !ctx.gate().is_open() {
                prop_assert_eq!(storage.writes(), writes);
            }
        }
    }

    #[test]
    fn only_the_four_names_are_valid(candidate in "\\PC{0,16}") {
        let known = Filter::ALL.iter().any(|filter| filter.as_str() == candidate);
        prop_assert_eq!(FilterController::is_valid(&candidate), known);

        if !known {
            let ctx = context(&Rc::new(MemoryStorage::new()));
            FilterController::new(&ctx).resolve_on_load(Some(&candidate));
            prop_assert_eq!(ctx.read().browse.filter(), Some(Filter::NowPlaying));
        }
    }

    #[test]
    fn every_known_name_is_kept(filter in filter_strategy()) {
        prop_assert!(FilterController::is_valid(filter.as_str()));

        let ctx = context(&Rc::new(MemoryStorage::new()));
        FilterController::new(&ctx).resolve_on_load(Some(filter.as_str()));
        prop_assert_eq!(ctx.read().browse.filter(), Some(filter));
    }

    #[test]
    fn reloading_a_snapshot_is_idempotent(username in "[a-z]{3,8}", filter in filter_strategy()) {
        let snapshot = serde_json::json!({
            "auth": { "username": username },
            "browse": { "homeFilter": filter.as_str() }
        })
        .to_string();
        let storage = Rc::new(MemoryStorage::with_entry(KEY, &snapshot));
        let ctx = context(&storage);

        ctx.gate().open();
        let first = ctx.read();
        ctx.gate().close();
        ctx.gate().open();
        let second = ctx.read();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.browse.filter(), Some(filter));
    }
}
