//! Choosing which view to show from the stored token
//!
//! The choice is made once per [`ViewController::load`]; role changes or
//! token expiry are not observed until the next load.

use crate::error::Result;
use crate::session::{ACCESS_KEY, REFRESH_KEY, TOKEN_KEY};
use crate::storage::StorageArea;
use crate::token::{decode_payload, TokenPayload};
use tracing::{debug, warn};

/// The three mutually exclusive views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Login / register form
    Unauthenticated,
    AdminDashboard,
    UserDashboard,
}

impl View {
    /// Dashboard for a decoded token
    pub fn for_payload(payload: &TokenPayload) -> Self {
        if payload.is_admin() {
            View::AdminDashboard
        } else {
            View::UserDashboard
        }
    }

    /// Whether `section` is shown while this view is active
    pub fn shows(self, section: Section) -> bool {
        matches!(
            (self, section),
            (View::Unauthenticated, Section::Auth)
                | (View::AdminDashboard, Section::Admin | Section::LogoutButton)
                | (View::UserDashboard, Section::User | Section::LogoutButton)
        )
    }
}

/// Parts of the page whose visibility depends on the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Auth,
    Admin,
    User,
    LogoutButton,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Auth,
        Section::Admin,
        Section::User,
        Section::LogoutButton,
    ];
}

/// Handles to the page sections, supplied by the front end
pub trait ViewSurface {
    fn set_visible(&mut self, section: Section, visible: bool);
}

/// Pick the view for the token stored under `key`.
///
/// A token whose payload cannot be decoded is removed from `storage` and
/// treated as absent.
pub fn select_view<S: StorageArea + ?Sized>(storage: &S, key: &str) -> View {
    let Some(token) = storage.get(key).filter(|t| !t.is_empty()) else {
        return View::Unauthenticated;
    };

    match decode_payload(&token) {
        Ok(payload) => View::for_payload(&payload),
        Err(e) => {
            warn!(key = %key, error = %e, "Discarding malformed stored token");
            if let Err(e) = storage.remove(key) {
                warn!(key = %key, error = %e, "Failed to remove malformed token");
            }
            View::Unauthenticated
        }
    }
}

/// Applies the selected view to injected page sections
pub struct ViewController<S, U> {
    storage: S,
    surface: U,
    token_key: String,
    current: Option<View>,
}

impl<S: StorageArea, U: ViewSurface> ViewController<S, U> {
    /// Create a controller reading the page-load `token` key
    pub fn new(storage: S, surface: U) -> Self {
        Self {
            storage,
            surface,
            token_key: TOKEN_KEY.to_string(),
            current: None,
        }
    }

    /// Read the token from `key` instead, e.g. the session's `access` slot
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Select the view from storage and show it
    pub fn load(&mut self) -> View {
        let view = select_view(&self.storage, &self.token_key);
        self.apply(view);
        view
    }

    /// Show `view`, hiding every section it does not use
    pub fn apply(&mut self, view: View) {
        for section in Section::ALL {
            self.surface.set_visible(section, view.shows(section));
        }
        debug!(view = ?view, "Applied view");
        self.current = Some(view);
    }

    /// Forget the stored tokens and go back to the login view
    pub fn logout(&mut self) -> Result<View> {
        for key in [self.token_key.as_str(), TOKEN_KEY, ACCESS_KEY, REFRESH_KEY] {
            self.storage.remove(key)?;
        }
        Ok(self.load())
    }

    /// The view applied last, if any
    pub fn current(&self) -> Option<View> {
        self.current
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
