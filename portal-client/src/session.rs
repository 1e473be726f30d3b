//! Authentication state of the portal. The [SessionStore] is the single owner of the token and
//! user pair; both are persisted, read back and dropped together.

use std::{cell::RefCell, rc::Rc};

use chrono::{DateTime, TimeZone, Utc};
use common::error::{RpError, RpResult};
use jsonwebtoken::{DecodingKey, Validation};
use recruit_portal_common::{Session, User};
use serde::Deserialize;

use crate::{config::StorageKeys, storage::KeyValueStore};

/// Callback notified with the current user after every session change
pub type SessionListener = Box<dyn Fn(Option<&User>)>;

/// Registered claims needed to decide if a token is still usable
#[derive(Deserialize)]
struct ExpiryClaims {
    /// Expiry as seconds since the epoch. Some issuers send fractional values.
    #[serde(default)]
    exp: Option<f64>,
}

/// Expiry encoded in a JWT `token`. The signature is not checked since the client holds no key;
/// the backend remains the authority on validity. Returns [None] if the token is not a JWT or
/// carries no `exp` claim.
#[allow(clippy::cast_possible_truncation)]
fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    let data = match jsonwebtoken::decode::<ExpiryClaims>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    ) {
        Ok(data) => data,
        Err(error) => {
            log::debug!("Token is not a readable JWT, treating it as non-expiring. {error}");
            return None;
        }
    };
    let exp = data.claims.exp?;
    Utc.timestamp_opt(exp.trunc() as i64, 0).single()
}

/// Possible states of the persisted session data found while loading
enum Stored {
    Empty,
    Complete { token: String, user: String },
    Malformed,
}

/// Persistent session holder shared by the controller and the authorized API
pub struct SessionStore {
    storage: Rc<dyn KeyValueStore>,
    keys: StorageKeys,
    session: RefCell<Option<Session>>,
    listeners: RefCell<Vec<SessionListener>>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self {
            storage,
            keys,
            session: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Register a `listener` called after every [load][Self::load], [save][Self::save] and
    /// [clear][Self::clear]. Listeners must not subscribe further listeners while being notified.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(Option<&User>) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Read the session from storage, see [load_at][Self::load_at]
    pub fn load(&self) -> bool {
        self.load_at(Utc::now())
    }

    /// Read the session from storage, migrating legacy keys first. Malformed data and tokens
    /// expired at `now` are removed from storage. Returns true if a usable session was found.
    pub fn load_at(&self, now: DateTime<Utc>) -> bool {
        self.migrate_legacy();
        let session = match self.read_stored() {
            Stored::Empty => None,
            Stored::Complete { token, user } => match serde_json::from_str::<User>(&user) {
                Ok(user) => Some(Session { token, user }),
                Err(error) => {
                    log::warn!("Stored user could not be read, dropping session. {error}");
                    None
                }
            },
            Stored::Malformed => {
                log::warn!("Stored session is incomplete, dropping it");
                None
            }
        };
        let session = session.filter(|session| match token_expiry(&session.token) {
            Some(expiry) if expiry <= now => {
                log::info!("Stored session expired at {expiry}");
                false
            }
            _ => true,
        });
        if session.is_none() {
            self.remove_keys(&[&self.keys.token, &self.keys.user]);
        }
        let found = session.is_some();
        *self.session.borrow_mut() = session;
        self.notify();
        found
    }

    /// Persist the `token` and `user` as the new session. The pair is written atomically: when
    /// the second write fails the first one is rolled back and the previous session stays
    /// active.
    /// # Errors
    /// This function will return an error if the token is blank, the user cannot be serialized
    /// or the storage rejects a write
    pub fn save(&self, token: &str, user: User) -> RpResult<()> {
        if token.trim().is_empty() {
            return Err(RpError::Generic("Refusing to store a blank token".to_owned()));
        }
        let user_json = serde_json::to_string(&user)?;
        let previous_token = self.storage.get(&self.keys.token).unwrap_or(None);
        self.storage.set(&self.keys.token, token)?;
        if let Err(error) = self.storage.set(&self.keys.user, &user_json) {
            let rollback = match previous_token {
                Some(previous) => self.storage.set(&self.keys.token, &previous),
                None => self.storage.remove(&self.keys.token),
            };
            if let Err(rollback_error) = rollback {
                log::error!("Could not roll back token after failed save. {rollback_error}");
            }
            return Err(error);
        }
        *self.session.borrow_mut() = Some(Session {
            token: token.to_owned(),
            user,
        });
        log::info!("Session stored");
        self.notify();
        Ok(())
    }

    /// Drop the session from memory and storage
    pub fn clear(&self) {
        self.remove_keys(&[
            &self.keys.token,
            &self.keys.user,
            &self.keys.legacy_token,
            &self.keys.legacy_user,
        ]);
        *self.session.borrow_mut() = None;
        log::info!("Session cleared");
        self.notify();
    }

    pub fn token(&self) -> Option<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Copy a complete legacy pair to the canonical keys when no canonical data exists. Legacy
    /// keys are always removed afterwards.
    fn migrate_legacy(&self) {
        let read = |key: &str| match self.storage.get(key) {
            Ok(value) => value,
            Err(error) => {
                log::error!("Could not read `{key}` from storage. {error}");
                None
            }
        };
        let legacy_token = read(&self.keys.legacy_token);
        let legacy_user = read(&self.keys.legacy_user);
        if legacy_token.is_none() && legacy_user.is_none() {
            return;
        }
        let has_canonical =
            read(&self.keys.token).is_some() || read(&self.keys.user).is_some();
        if let (false, Some(token), Some(user)) = (has_canonical, &legacy_token, &legacy_user) {
            let copied = self
                .storage
                .set(&self.keys.token, token)
                .and_then(|_| self.storage.set(&self.keys.user, user));
            match copied {
                Ok(()) => log::info!("Migrated session from legacy storage keys"),
                Err(error) => log::error!("Could not migrate legacy session. {error}"),
            }
        }
        self.remove_keys(&[&self.keys.legacy_token, &self.keys.legacy_user]);
    }

    /// Classify what the canonical keys currently hold
    fn read_stored(&self) -> Stored {
        let token = self.storage.get(&self.keys.token);
        let user = self.storage.get(&self.keys.user);
        match (token, user) {
            (Ok(None), Ok(None)) => Stored::Empty,
            (Ok(Some(token)), Ok(Some(user))) if !token.trim().is_empty() => {
                Stored::Complete { token, user }
            }
            (Err(error), _) | (_, Err(error)) => {
                log::error!("Could not read session from storage. {error}");
                Stored::Malformed
            }
            _ => Stored::Malformed,
        }
    }

    /// Remove every key in `keys`, logging failures
    fn remove_keys(&self, keys: &[&String]) {
        for key in keys {
            if let Err(error) = self.storage.remove(key) {
                log::error!("Could not remove `{key}` from storage. {error}");
            }
        }
    }

    /// Call every listener with the current user
    fn notify(&self) {
        let user = self.user();
        for listener in self.listeners.borrow().iter() {
            listener(user.as_ref());
        }
    }
}
