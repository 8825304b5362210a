//! Operator session: the bearer token and display name kept between
//! requests, plus notification of session end.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Storage key of the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Storage key of the operator's display name.
pub const USER_NAME_KEY: &str = "userName";

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The operator logged out.
    Logout,
    /// The API rejected the token.
    Expired,
}

/// Persistent key-value storage for session credentials.
#[cfg_attr(feature = "test-mocks", mockall::automock)]
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process store, used by tests and tools that run without cookies.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

#[cfg(feature = "server")]
pub use cookie::CookieCredentialStore;

#[cfg(feature = "server")]
mod cookie {
    use std::future::{Ready, ready};
    use std::rc::Rc;

    use actix_session::{Session, SessionExt};
    use actix_web::dev::Payload;
    use actix_web::{FromRequest, HttpRequest};

    use super::{CredentialStore, SessionContext};

    /// Credentials kept in the signed session cookie.
    pub struct CookieCredentialStore {
        session: Session,
    }

    impl CookieCredentialStore {
        pub fn new(session: Session) -> Self {
            Self { session }
        }
    }

    impl CredentialStore for CookieCredentialStore {
        fn get(&self, key: &str) -> Option<String> {
            match self.session.get::<String>(key) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("Unreadable session value {key}: {err}");
                    None
                }
            }
        }

        fn set(&self, key: &str, value: &str) {
            if let Err(err) = self.session.insert(key, value) {
                log::error!("Failed to store session value {key}: {err}");
            }
        }

        fn remove(&self, key: &str) {
            self.session.remove(key);
        }
    }

    /// Handlers receive the session backed by the request's cookie.
    impl FromRequest for SessionContext {
        type Error = actix_web::Error;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
            let store = CookieCredentialStore::new(req.get_session());
            ready(Ok(SessionContext::new(Rc::new(store))))
        }
    }
}

type EndListener = Box<dyn Fn(SessionEnd)>;

/// Handle to the current operator session.
///
/// Clones share the store and the listeners, so every consumer of a request
/// sees the same session.
#[derive(Clone)]
pub struct SessionContext {
    store: Rc<dyn CredentialStore>,
    listeners: Rc<RefCell<Vec<EndListener>>>,
}

impl SessionContext {
    pub fn new(store: Rc<dyn CredentialStore>) -> Self {
        Self {
            store,
            listeners: Rc::default(),
        }
    }

    /// Session backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryCredentialStore::new()))
    }

    pub fn auth_token(&self) -> Option<String> {
        self.store
            .get(AUTH_TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    pub fn user_name(&self) -> Option<String> {
        self.store.get(USER_NAME_KEY)
    }

    pub fn is_active(&self) -> bool {
        self.auth_token().is_some()
    }

    /// Stores the credentials returned by a successful login.
    pub fn start(&self, token: &str, user_name: &str) {
        self.store.set(AUTH_TOKEN_KEY, token);
        self.store.set(USER_NAME_KEY, user_name);
    }

    /// Clears the credentials and notifies every listener.
    pub fn end(&self, reason: SessionEnd) {
        self.store.remove(AUTH_TOKEN_KEY);
        self.store.remove(USER_NAME_KEY);
        log::info!("Session ended: {reason:?}");

        for listener in self.listeners.borrow().iter() {
            listener(reason);
        }
    }

    /// Registers a callback run whenever the session ends.
    pub fn subscribe(&self, listener: impl Fn(SessionEnd) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }
}
