use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication failure carrying the provider's reason string.
#[derive(Debug, Error)]
#[error("auth error: {0}")]
pub struct AuthError(pub String);

/// The signed-in user as the auth provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Listener invoked whenever the signed-in user changes.
pub type SessionListener = Box<dyn FnMut(Option<&UserAccount>) + Send>;

/// Boundary to the external auth provider
///
/// Session state lives with the provider; callers observe it through
/// `current_user` and registered listeners.
pub trait AuthProvider {
    fn current_user(&self) -> Option<UserAccount>;

    fn login(&mut self, email: &str, password: &str) -> Result<UserAccount, AuthError>;

    fn signup(&mut self, email: &str, password: &str) -> Result<UserAccount, AuthError>;

    fn logout(&mut self) -> Result<(), AuthError>;

    /// Register a session-change listener, fired on login, signup and logout.
    fn on_session_change(&mut self, listener: SessionListener);
}

/// Single-user stand-in for a managed auth backend
///
/// The CLI operator is signed in as the user named on the command line;
/// login/signup switch that identity rather than checking credentials.
pub struct LocalUser {
    account: UserAccount,
    signed_in: bool,
    listeners: Vec<SessionListener>,
}

impl LocalUser {
    pub fn new(user_id: &str) -> Self {
        Self {
            account: account_for(user_id),
            signed_in: true,
            listeners: Vec::new(),
        }
    }

    fn notify(&mut self) {
        let current = if self.signed_in {
            Some(self.account.clone())
        } else {
            None
        };
        for listener in &mut self.listeners {
            listener(current.as_ref());
        }
    }
}

fn account_for(user_id: &str) -> UserAccount {
    UserAccount {
        id: user_id.to_string(),
        email: format!("{user_id}@localhost"),
        display_name: None,
    }
}

impl AuthProvider for LocalUser {
    fn current_user(&self) -> Option<UserAccount> {
        self.signed_in.then(|| self.account.clone())
    }

    fn login(&mut self, email: &str, _password: &str) -> Result<UserAccount, AuthError> {
        let user_id = email
            .split('@')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AuthError(format!("invalid email address: {email}")))?;

        self.account = account_for(user_id);
        self.signed_in = true;
        self.notify();
        Ok(self.account.clone())
    }

    fn signup(&mut self, email: &str, password: &str) -> Result<UserAccount, AuthError> {
        // No account records to create locally; signup behaves like login
        self.login(email, password)
    }

    fn logout(&mut self) -> Result<(), AuthError> {
        self.signed_in = false;
        self.notify();
        Ok(())
    }

    fn on_session_change(&mut self, listener: SessionListener) {
        self.listeners.push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn starts_signed_in_as_named_user() {
        let auth = LocalUser::new("ada");
        let user = auth.current_user().expect("signed in");
        assert_eq!(user.id, "ada");
        assert_eq!(user.email, "ada@localhost");
    }

    #[test]
    fn logout_clears_session_and_notifies() {
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut auth = LocalUser::new("ada");
        auth.on_session_change(Box::new(move |user| {
            sink.lock().unwrap().push(user.map(|u| u.id.clone()));
        }));

        auth.logout().expect("logout");
        assert!(auth.current_user().is_none());

        auth.login("grace@example.com", "pw").expect("login");
        assert_eq!(auth.current_user().unwrap().id, "grace");

        let events = seen.lock().unwrap();
        assert_eq!(events.as_slice(), &[None, Some("grace".to_string())]);
    }

    #[test]
    fn login_rejects_empty_identity() {
        let mut auth = LocalUser::new("ada");
        assert!(auth.login("@nowhere", "pw").is_err());
    }
}
