//! Account flow implementation

use crate::api::{AccountApi, Registration};
use crate::error::{Result, SnapLabelError};
use crate::navigation::{Notice, View};
use crate::session::SessionStore;
use crate::utils::validation::{validate_confirmation_code, validate_email, validate_password};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a completed account flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Logged in; the token is in the session store
    LoggedIn,
    /// The account must be confirmed first; a fresh code was emailed
    ConfirmationRequired {
        /// Account to confirm
        email: String,
    },
    /// Account created; a confirmation code was emailed
    Registered {
        /// Account to confirm
        email: String,
    },
    /// The email already has an account
    AlreadyRegistered,
    /// Account confirmed; the user can log in
    Confirmed,
}

impl AuthOutcome {
    /// View the front end should show next
    pub fn next_view(&self) -> View {
        match self {
            Self::LoggedIn => View::Search,
            Self::ConfirmationRequired { email } | Self::Registered { email } => {
                View::EnterConfirmationCode {
                    email: email.clone(),
                }
            }
            Self::AlreadyRegistered | Self::Confirmed => View::Login,
        }
    }

    /// Message to show the user
    pub fn notice(&self) -> Notice {
        match self {
            Self::LoggedIn => Notice::success("Login successful"),
            Self::ConfirmationRequired { .. } => {
                Notice::success("Confirmation code sent. Please check your email.")
            }
            Self::Registered { .. } => {
                Notice::success("Registration successful. Please check your email for a code.")
            }
            Self::AlreadyRegistered => Notice::error("Already registered, please login."),
            Self::Confirmed => Notice::success("Account confirmed. Please login."),
        }
    }
}

/// Registration form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account email
    pub email: String,
    /// Chosen password
    pub password: String,
    /// Password typed a second time
    pub confirm_password: String,
}

/// Login, registration and confirmation against the service
pub struct AccountFlow {
    api: Arc<dyn AccountApi>,
    session: Arc<dyn SessionStore>,
}

impl AccountFlow {
    /// Create account flows sharing `session`
    pub fn new(api: Arc<dyn AccountApi>, session: Arc<dyn SessionStore>) -> Self {
        Self { api, session }
    }

    /// Log in and store the returned token
    ///
    /// An unconfirmed account triggers a new confirmation code and yields
    /// [`AuthOutcome::ConfirmationRequired`] instead of an error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        match self.api.login(email, password).await {
            Ok(token) => {
                self.session.set_token(&token)?;
                info!("Logged in as {}", email);
                Ok(AuthOutcome::LoggedIn)
            }
            Err(SnapLabelError::AccountNotConfirmed) => {
                self.api.request_confirmation_code(email).await?;
                info!("Confirmation code requested for {}", email);
                Ok(AuthOutcome::ConfirmationRequired {
                    email: email.to_string(),
                })
            }
            Err(e) => {
                warn!("Login failed for {}: {}", email, e);
                Err(e)
            }
        }
    }

    /// Validate the form and create an account
    ///
    /// Checks run in order: passwords match, email shape, password strength.
    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthOutcome> {
        if form.password != form.confirm_password {
            return Err(SnapLabelError::PasswordMismatch);
        }
        validate_email(&form.email)?;
        validate_password(&form.password)?;

        let registration = Registration {
            name: format!("{} {}", form.first_name.trim(), form.last_name.trim()),
            password: form.password.clone(),
            email: form.email.clone(),
        };

        match self.api.register(&registration).await {
            Ok(()) => {
                info!("Registered {}", form.email);
                Ok(AuthOutcome::Registered {
                    email: form.email.clone(),
                })
            }
            Err(SnapLabelError::AlreadyRegistered) => Ok(AuthOutcome::AlreadyRegistered),
            Err(e) => {
                warn!("Registration failed for {}: {}", form.email, e);
                Err(e)
            }
        }
    }

    /// Confirm an account with its six-digit code
    pub async fn confirm(&self, email: &str, code: &str) -> Result<AuthOutcome> {
        validate_confirmation_code(code)?;
        self.api.confirm(email, code).await?;
        info!("Confirmed {}", email);
        Ok(AuthOutcome::Confirmed)
    }

    /// Forget the session token
    pub fn logout(&self) -> Result<()> {
        self.session.clear_token()?;
        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records calls and answers from fixed scripts
    #[derive(Default)]
    struct FakeAccountApi {
        unconfirmed: bool,
        existing_email: Option<String>,
        calls: Mutex<Vec<String>>,
        registrations: Mutex<Vec<Registration>>,
    }

    #[async_trait]
    impl AccountApi for FakeAccountApi {
        async fn login(&self, email: &str, password: &str) -> Result<String> {
            self.calls.lock().push(format!("login {email}"));
            if self.unconfirmed {
                return Err(SnapLabelError::AccountNotConfirmed);
            }
            if password == "Abcd@1234" {
                Ok(format!("token-for-{email}"))
            } else {
                Err(SnapLabelError::Unauthorized("Incorrect username or password.".to_string()))
            }
        }

        async fn request_confirmation_code(&self, email: &str) -> Result<()> {
            self.calls.lock().push(format!("request_code {email}"));
            Ok(())
        }

        async fn register(&self, registration: &Registration) -> Result<()> {
            self.calls.lock().push(format!("register {}", registration.email));
            if self.existing_email.as_deref() == Some(registration.email.as_str()) {
                return Err(SnapLabelError::AlreadyRegistered);
            }
            self.registrations.lock().push(registration.clone());
            Ok(())
        }

        async fn confirm(&self, email: &str, code: &str) -> Result<()> {
            self.calls.lock().push(format!("confirm {email} {code}"));
            Ok(())
        }
    }

    fn flow(api: FakeAccountApi) -> (AccountFlow, Arc<FakeAccountApi>, Arc<MemorySessionStore>) {
        let api = Arc::new(api);
        let session = Arc::new(MemorySessionStore::new());
        let flow = AccountFlow::new(api.clone(), session.clone());
        (flow, api, session)
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "Abcd@1234".to_string(),
            confirm_password: "Abcd@1234".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let (flow, _api, session) = flow(FakeAccountApi::default());

        let outcome = flow.login("ada@example.com", "Abcd@1234").await.unwrap();
        assert_eq!(outcome, AuthOutcome::LoggedIn);
        assert_eq!(outcome.next_view(), View::Search);
        assert_eq!(
            session.get_token().as_deref(),
            Some("token-for-ada@example.com")
        );
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let (flow, _api, session) = flow(FakeAccountApi::default());

        let result = flow.login("ada@example.com", "wrong").await;
        assert!(matches!(result, Err(SnapLabelError::Unauthorized(_))));
        assert_eq!(session.get_token(), None);
    }

    #[tokio::test]
    async fn test_login_unconfirmed_requests_code() {
        let (flow, api, session) = flow(FakeAccountApi {
            unconfirmed: true,
            ..FakeAccountApi::default()
        });

        let outcome = flow.login("ada@example.com", "Abcd@1234").await.unwrap();
        assert_eq!(
            outcome.next_view(),
            View::EnterConfirmationCode {
                email: "ada@example.com".to_string()
            }
        );
        assert_eq!(
            api.calls.lock().as_slice(),
            &["login ada@example.com", "request_code ada@example.com"]
        );
        assert_eq!(session.get_token(), None);
    }

    #[tokio::test]
    async fn test_register_sends_full_name() {
        let (flow, api, _session) = flow(FakeAccountApi::default());

        let outcome = flow.register(&form()).await.unwrap();
        assert_eq!(
            outcome,
            AuthOutcome::Registered {
                email: "ada@example.com".to_string()
            }
        );
        assert_eq!(api.registrations.lock()[0].name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let (flow, api, _session) = flow(FakeAccountApi::default());

        let mut mismatch = form();
        mismatch.email = "not-an-email".to_string();
        mismatch.confirm_password = "Other@1234".to_string();
        assert!(matches!(
            flow.register(&mismatch).await,
            Err(SnapLabelError::PasswordMismatch)
        ));

        let mut bad_email = form();
        bad_email.email = "not-an-email".to_string();
        bad_email.password = "weak".to_string();
        bad_email.confirm_password = "weak".to_string();
        assert!(matches!(
            flow.register(&bad_email).await,
            Err(SnapLabelError::InvalidEmail(_))
        ));

        let mut weak = form();
        weak.password = "password".to_string();
        weak.confirm_password = "password".to_string();
        assert!(matches!(
            flow.register(&weak).await,
            Err(SnapLabelError::WeakPassword)
        ));

        assert!(api.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_register_existing_account_goes_to_login() {
        let (flow, _api, _session) = flow(FakeAccountApi {
            existing_email: Some("ada@example.com".to_string()),
            ..FakeAccountApi::default()
        });

        let outcome = flow.register(&form()).await.unwrap();
        assert_eq!(outcome, AuthOutcome::AlreadyRegistered);
        assert_eq!(outcome.next_view(), View::Login);
    }

    #[tokio::test]
    async fn test_confirm_validates_code_locally() {
        let (flow, api, _session) = flow(FakeAccountApi::default());

        assert!(matches!(
            flow.confirm("ada@example.com", "12345").await,
            Err(SnapLabelError::InvalidConfirmationCode)
        ));
        assert!(api.calls.lock().is_empty());

        let outcome = flow.confirm("ada@example.com", "123456").await.unwrap();
        assert_eq!(outcome.next_view(), View::Login);
        assert_eq!(
            api.calls.lock().as_slice(),
            &["confirm ada@example.com 123456"]
        );
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let (flow, _api, session) = flow(FakeAccountApi::default());
        session.set_token("t").unwrap();

        flow.logout().unwrap();
        assert_eq!(session.get_token(), None);
    }
}
