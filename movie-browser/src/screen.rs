//! Screen controllers and their activation lifecycle
//!
//! A screen is active for exactly as long as its [`ActiveScreen`] guard
//! lives. Activation opens the persistence gate (loading the snapshot) and
//! runs the screen's own setup; dropping the guard runs `deactivate` and
//! closes the gate on every exit path.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use marquee::{GateGuard, Subscription};

use crate::action::Action;
use crate::catalog::{CatalogFetcher, CatalogTransport, Movie};
use crate::context::AppContext;
use crate::filter::FilterController;
use crate::login::{validate_login, ValidationError};
use crate::state::{AppState, Filter};

/// Screens the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Support,
}

/// Lifecycle hooks for a screen controller
pub trait Screen {
    fn route(&self) -> Route;

    fn context(&self) -> &Rc<AppContext>;

    /// Runs after the gate opened and the snapshot was loaded
    fn activate(&mut self) {}

    /// Runs before the gate closes
    fn deactivate(&mut self) {}
}

/// Keeps a screen active until dropped.
pub struct ActiveScreen<S: Screen> {
    screen: S,
    _gate: GateGuard,
}

impl<S: Screen> ActiveScreen<S> {
    /// Open the gate and activate `screen`
    pub fn activate(mut screen: S) -> Self {
        let gate = screen.context().gate().acquire();
        screen.activate();
        tracing::info!(route = ?screen.route(), "Screen activated");
        Self {
            screen,
            _gate: gate,
        }
    }
}

impl<S: Screen> Drop for ActiveScreen<S> {
    fn drop(&mut self) {
        self.screen.deactivate();
        tracing::info!(route = ?self.screen.route(), "Screen deactivated");
        // `_gate` is dropped after this, closing the gate
    }
}

impl<S: Screen> Deref for ActiveScreen<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.screen
    }
}

impl<S: Screen> DerefMut for ActiveScreen<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.screen
    }
}

// ============================================================================
// Login
// ============================================================================

/// Login form controller
pub struct LoginScreen {
    ctx: Rc<AppContext>,
}

impl LoginScreen {
    pub fn new(ctx: Rc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Validate the form and log in.
    ///
    /// On success returns where to navigate next; on failure the shared
    /// state is untouched and the error carries the message to show.
    pub fn submit(&self, username: &str, password: &str) -> Result<Route, ValidationError> {
        let credentials = validate_login(username, password)?;
        self.ctx.dispatch(Action::LogIn {
            username: credentials.username,
        });
        Ok(Route::Home)
    }
}

impl Screen for LoginScreen {
    fn route(&self) -> Route {
        Route::Login
    }

    fn context(&self) -> &Rc<AppContext> {
        &self.ctx
    }
}

// ============================================================================
// Home
// ============================================================================

/// A started fetch. Only the most recently started ticket may update the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub filter: Filter,
    pub page: u32,
    generation: u64,
}

/// Catalog browsing screen
///
/// Activation only resolves the filter; the list is loaded by the first
/// [`refresh`](Self::refresh). [`Navigator::open_home`] does both.
pub struct HomeScreen<T> {
    ctx: Rc<AppContext>,
    fetcher: Rc<CatalogFetcher<T>>,
    /// Filter currently held in the `browse` slice
    selected: Rc<Cell<Option<Filter>>>,
    page: u32,
    generation: u64,
    movies: Option<Vec<Movie>>,
    shown_filter: Option<Filter>,
    _browse_sub: Option<Subscription>,
}

impl<T: CatalogTransport> HomeScreen<T> {
    pub fn new(ctx: Rc<AppContext>, fetcher: Rc<CatalogFetcher<T>>) -> Self {
        Self {
            ctx,
            fetcher,
            selected: Rc::new(Cell::new(None)),
            page: 1,
            generation: 0,
            movies: None,
            shown_filter: None,
            _browse_sub: None,
        }
    }

    /// Filter the next fetch will use
    pub fn selected_filter(&self) -> Option<Filter> {
        self.selected.get()
    }

    /// Filter of the list currently shown
    pub fn shown_filter(&self) -> Option<Filter> {
        self.shown_filter
    }

    /// Last successfully fetched list; stays in place when a fetch fails
    pub fn movies(&self) -> Option<&[Movie]> {
        self.movies.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Set the 1-based page for the next fetch
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Start a fetch for the selected filter and page.
    ///
    /// Returns `None` if no filter has been resolved yet. Starting a new
    /// fetch makes every earlier ticket stale.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let filter = self.selected.get()?;
        self.generation += 1;
        Some(FetchTicket {
            filter,
            page: self.page,
            generation: self.generation,
        })
    }

    /// Apply a fetch result. Returns `true` if the list was replaced.
    ///
    /// Results for stale tickets are discarded; a failed fetch leaves the
    /// previous list in place.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Option<Vec<Movie>>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(filter = %ticket.filter, "Discarding stale catalog result");
            return false;
        }
        match result {
            Some(movies) => {
                self.movies = Some(movies);
                self.shown_filter = Some(ticket.filter);
                true
            }
            None => false,
        }
    }

    /// Fetch the list for the selected filter and show it
    pub async fn refresh(&mut self) -> bool {
        let Some(ticket) = self.begin_fetch() else {
            return false;
        };
        let result = self.fetcher.fetch(ticket.filter, ticket.page).await;
        self.finish_fetch(ticket, result)
    }

    /// Handle a tab click: dispatch the filter, go back to page 1 and fetch
    pub async fn select_tab(&mut self, filter: Filter) -> bool {
        FilterController::new(&self.ctx).on_tab_selected(filter);
        self.page = 1;
        self.refresh().await
    }
}

impl<T: CatalogTransport> Screen for HomeScreen<T> {
    fn route(&self) -> Route {
        Route::Home
    }

    fn context(&self) -> &Rc<AppContext> {
        &self.ctx
    }

    fn activate(&mut self) {
        self.ctx.set_home_btn_enabled(false);

        let selected = Rc::clone(&self.selected);
        self._browse_sub = Some(self.ctx.store().subscribe(move |state: &AppState| {
            selected.set(state.browse.filter());
        }));

        let persisted = self.ctx.read().browse.home_filter;
        FilterController::new(&self.ctx).resolve_on_load(Some(&persisted));
    }

    fn deactivate(&mut self) {
        self._browse_sub = None;
    }
}

// ============================================================================
// Support
// ============================================================================

/// A question and its answer on the support screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportEntry {
    pub question: &'static str,
    pub answer: String,
}

/// A group of support entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportSection {
    pub title: &'static str,
    pub entries: Vec<SupportEntry>,
}

/// Help and FAQ screen; enables the shared "home" button
pub struct SupportScreen {
    ctx: Rc<AppContext>,
    app_name: String,
}

impl SupportScreen {
    pub fn new(ctx: Rc<AppContext>, app_name: impl Into<String>) -> Self {
        Self {
            ctx,
            app_name: app_name.into(),
        }
    }

    /// Support topics, grouped by category
    pub fn sections(&self) -> Vec<SupportSection> {
        let app = &self.app_name;
        let entry = |question, answer: String| SupportEntry { question, answer };

        vec![
            SupportSection {
                title: "App & website issues",
                entries: vec![
                    entry(
                        "Broken or bad links",
                        format!(
                            "For external links, check the address is valid and contact that \
                             site's support team if it is. If the link is internal to {app}, \
                             try refreshing. If this does not work, contact our Support team."
                        ),
                    ),
                    entry(
                        "Images missing",
                        "Reload, then try another browser or device. If the images still do \
                         not appear, please contact our Support team."
                            .to_string(),
                    ),
                    entry(
                        "Favourites not remembered",
                        "Ensure local storage is allowed.".to_string(),
                    ),
                    entry(
                        "Poor site performance",
                        "Try another device and connection, or try again after 24 hours. If \
                         it persists, report it to our Support team."
                            .to_string(),
                    ),
                ],
            },
            SupportSection {
                title: "Account issues",
                entries: vec![
                    entry(
                        "Login failure or forgotten password",
                        "Use the Forgot Password link on the login page, or register a new \
                         account."
                            .to_string(),
                    ),
                    entry(
                        "Favourites not remembered",
                        format!(
                            "Ensure local storage is allowed. Having an account helps {app} \
                             recall your choices."
                        ),
                    ),
                    entry(
                        "Unable to update profile information",
                        "Ensure local storage is allowed, then contact our Support team."
                            .to_string(),
                    ),
                ],
            },
            SupportSection {
                title: "Content issues",
                entries: vec![entry(
                    "Movie information",
                    format!(
                        "All movie-related content on {app} is curated and managed by TMDB. \
                         This product uses the TMDB API but is not endorsed or certified by \
                         TMDB. For content issues contact https://www.themoviedb.org/talk"
                    ),
                )],
            },
        ]
    }
}

impl Screen for SupportScreen {
    fn route(&self) -> Route {
        Route::Support
    }

    fn context(&self) -> &Rc<AppContext> {
        &self.ctx
    }

    fn activate(&mut self) {
        self.ctx.set_home_btn_enabled(true);
    }
}

// ============================================================================
// Navigator
// ============================================================================

/// The currently active screen
pub enum Current<T: CatalogTransport> {
    Login(ActiveScreen<LoginScreen>),
    Home(ActiveScreen<HomeScreen<T>>),
    Support(ActiveScreen<SupportScreen>),
}

impl<T: CatalogTransport> Current<T> {
    pub fn route(&self) -> Route {
        match self {
            Current::Login(_) => Route::Login,
            Current::Home(_) => Route::Home,
            Current::Support(_) => Route::Support,
        }
    }
}

/// Owns screen transitions: the old screen is fully deactivated before the
/// next one activates.
pub struct Navigator<T: CatalogTransport> {
    ctx: Rc<AppContext>,
    fetcher: Rc<CatalogFetcher<T>>,
    app_name: String,
    current: Option<Current<T>>,
}

impl<T: CatalogTransport> Navigator<T> {
    pub fn new(
        ctx: Rc<AppContext>,
        fetcher: CatalogFetcher<T>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            fetcher: Rc::new(fetcher),
            app_name: app_name.into(),
            current: None,
        }
    }

    pub fn context(&self) -> &Rc<AppContext> {
        &self.ctx
    }

    pub fn current_route(&self) -> Option<Route> {
        self.current.as_ref().map(Current::route)
    }

    /// Deactivate the current screen, then activate `route`
    pub fn navigate(&mut self, route: Route) -> &mut Current<T> {
        self.current = None;

        let ctx = Rc::clone(&self.ctx);
        let next = match route {
            Route::Login => Current::Login(ActiveScreen::activate(LoginScreen::new(ctx))),
            Route::Home => Current::Home(ActiveScreen::activate(HomeScreen::new(
                ctx,
                Rc::clone(&self.fetcher),
            ))),
            Route::Support => Current::Support(ActiveScreen::activate(SupportScreen::new(
                ctx,
                self.app_name.clone(),
            ))),
        };
        self.current.insert(next)
    }

    /// Activate the home screen and load the list for the resolved filter.
    ///
    /// Returns `true` if a list is shown.
    pub async fn open_home(&mut self) -> bool {
        self.navigate(Route::Home);
        match self.home() {
            Some(home) => home.refresh().await,
            None => false,
        }
    }

    /// Deactivate the current screen without activating another
    pub fn leave(&mut self) {
        self.current = None;
    }

    pub fn home(&mut self) -> Option<&mut ActiveScreen<HomeScreen<T>>> {
        match self.current.as_mut() {
            Some(Current::Home(home)) => Some(home),
            _ => None,
        }
    }

    pub fn login(&mut self) -> Option<&mut ActiveScreen<LoginScreen>> {
        match self.current.as_mut() {
            Some(Current::Login(login)) => Some(login),
            _ => None,
        }
    }

    pub fn support(&mut self) -> Option<&mut ActiveScreen<SupportScreen>> {
        match self.current.as_mut() {
            Some(Current::Support(support)) => Some(support),
            _ => None,
        }
    }
}
