//! User Service
//!
//! The generic entity operations for users, with password hashing applied on
//! every write, plus the user-specific use cases: password and passcode
//! login, format checks, password reset, registration and paged search.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::application::dto::{LoginResponse, RegisterRequest};
use crate::application::validators::UserValidator;
use crate::domain::{
    CaptchaVerifier, LogSink, OperationKind, Session, User, UserFilter, UserStore,
};
use crate::infrastructure::metrics;
use crate::shared::operation_result::{Failure, OperationResult};
use crate::shared::validation::is_valid_email;

use super::entity_service::{EntityOperations, EntityService};
use super::otp_service::OtpService;
use super::password::{hash_password, verify_password};
use super::token_service::TokenService;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{5,49}$").expect("Invalid username pattern")
});

/// User service trait
#[async_trait]
pub trait UserService: EntityOperations<User> {
    /// Log in with username and password; opens a session on success.
    async fn login(&self, username: &str, password: &str) -> OperationResult<LoginResponse>;

    /// Log in with a passcode previously sent to the email.
    async fn login_otp(&self, email: &str, otp: &str) -> OperationResult<LoginResponse>;

    /// Shape check only, registration is not consulted.
    fn validate_email(&self, email: &str) -> OperationResult<bool>;

    /// Shape check only, registration is not consulted.
    fn validate_username(&self, username: &str) -> OperationResult<bool>;

    async fn set_new_password(&self, email: &str, new_password: &str) -> OperationResult<bool>;

    /// `set_new_password`, authorised by a passcode sent to the email.
    async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> OperationResult<bool>;

    /// Zero-based page of users. An empty filter text returns every user.
    async fn get_page_by_filter(
        &self,
        page_number: i64,
        page_size: i64,
        filter_text: &str,
    ) -> OperationResult<Vec<User>>;

    async fn get_count_by_filter(&self, filter_text: &str) -> OperationResult<i64>;

    /// Public sign-up, gated by the captcha.
    async fn register(&self, request: RegisterRequest) -> OperationResult<i64>;
}

fn hash_user_password(mut user: User) -> Result<User, Failure> {
    user.password = hash_password(&user.password)?;
    Ok(user)
}

fn search_text(filter_text: &str) -> Option<&str> {
    let text = filter_text.trim();
    (!text.is_empty()).then_some(text)
}

/// UserService implementation
pub struct UserServiceImpl {
    users: EntityService<User>,
    store: Arc<dyn UserStore>,
    sessions: Arc<dyn EntityOperations<Session>>,
    otp: Arc<dyn OtpService>,
    captcha: Arc<dyn CaptchaVerifier>,
    tokens: Arc<TokenService>,
}

impl UserServiceImpl {
    pub fn new<S>(
        store: Arc<S>,
        sessions: Arc<dyn EntityOperations<Session>>,
        otp: Arc<dyn OtpService>,
        captcha: Arc<dyn CaptchaVerifier>,
        tokens: Arc<TokenService>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self
    where
        S: UserStore + 'static,
    {
        let validator = Arc::new(UserValidator::new(store.clone()));
        Self {
            users: EntityService::new(store.clone(), validator, log_sink),
            store,
            sessions,
            otp,
            captcha,
            tokens,
        }
    }

    async fn find_user(&self, filter: UserFilter) -> Result<Option<User>, Failure> {
        match self.store.get_by_filter(&filter).await {
            Ok(rows) => Ok(rows.into_iter().next()),
            Err(e) => Err(self.users.store_failure(e, OperationKind::Read, None)),
        }
    }

    /// Issue a bearer token and record it as a session.
    async fn open_session(&self, user: &User) -> Result<LoginResponse, Failure> {
        if !user.active {
            return Err(Failure::failure_authentication(
                "The user account is deactivated.",
            ));
        }

        let issued = self.tokens.issue(user)?;
        let session = Session::new(user.id, issued.token.clone(), issued.expires_at);
        self.sessions.add(Some(session)).await.into_result()?;

        info!(user_id = user.id, "Session opened");
        Ok(LoginResponse {
            user_id: user.id,
            username: user.username.clone(),
            token: issued.token,
            token_type: "Bearer".to_string(),
            expiration: issued.expires_at,
        })
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<LoginResponse, Failure> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Failure::failure_user_input("Username not submitted."));
        }
        if password.is_empty() {
            return Err(Failure::failure_user_input("Password not submitted."));
        }

        let user = self
            .find_user(UserFilter::Username(username.to_string()))
            .await?
            .ok_or_else(|| Failure::failure_authentication("User not found."))?;
        if !verify_password(password, &user.password)? {
            return Err(Failure::failure_authentication(
                "Incorrect username or password.",
            ));
        }

        self.open_session(&user).await
    }

    async fn try_login_otp(&self, email: &str, otp: &str) -> Result<LoginResponse, Failure> {
        self.otp.validate_otp(email, otp).await.into_result()?;

        let user = self
            .find_user(UserFilter::Email(email.trim().to_string()))
            .await?
            .ok_or_else(|| Failure::failure_authentication("User not found."))?;

        self.open_session(&user).await
    }

    async fn try_set_new_password(&self, email: &str, new_password: &str) -> Result<bool, Failure> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Failure::failure_user_input("Email not submitted."));
        }

        let mut user = self
            .find_user(UserFilter::Email(email.to_string()))
            .await?
            .ok_or_else(|| Failure::failure_not_found("The email is not registered."))?;
        user.password = new_password.to_string();

        self.users
            .modify_prepared(Some(user), hash_user_password)
            .await
            .into_result()
    }

    async fn try_get_page(
        &self,
        page_number: i64,
        page_size: i64,
        filter_text: &str,
    ) -> Result<Vec<User>, Failure> {
        if page_number < 0 || page_size < 0 {
            return Err(Failure::failure_user_input(
                "Page number and page size must not be negative.",
            ));
        }
        let offset = page_number
            .checked_mul(page_size)
            .ok_or_else(|| Failure::failure_user_input("The requested page is out of range."))?;

        match self.store.get_page(search_text(filter_text), offset, page_size).await {
            Ok(users) => Ok(users),
            Err(e) => Err(self.users.store_failure(e, OperationKind::Read, None)),
        }
    }

    async fn try_register(&self, request: RegisterRequest) -> Result<i64, Failure> {
        self.captcha
            .validate(&request.captcha_token)
            .await
            .into_result()?;

        let user = User::new(
            request.username.trim(),
            request.email.trim(),
            request.password,
        );
        self.users
            .add_prepared(Some(user), hash_user_password)
            .await
            .into_result()
    }
}

#[async_trait]
impl EntityOperations<User> for UserServiceImpl {
    async fn add(&self, entity: Option<User>) -> OperationResult<i64> {
        self.users.add_prepared(entity, hash_user_password).await
    }

    async fn modify(&self, entity: Option<User>) -> OperationResult<bool> {
        self.users.modify_prepared(entity, hash_user_password).await
    }

    async fn remove(&self, id: i64) -> OperationResult<bool> {
        self.users.remove(id).await
    }

    async fn activate(&self, id: i64) -> OperationResult<bool> {
        self.users.activate(id).await
    }

    async fn deactivate(&self, id: i64) -> OperationResult<bool> {
        self.users.deactivate(id).await
    }

    async fn retrieve_all(&self) -> OperationResult<Vec<User>> {
        self.users.retrieve_all().await
    }

    async fn retrieve_by_id(&self, id: i64) -> OperationResult<User> {
        self.users.retrieve_by_id(id).await
    }

    async fn retrieve_by_filter(&self, filter: &UserFilter) -> OperationResult<Vec<User>> {
        self.users.retrieve_by_filter(filter).await
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> OperationResult<LoginResponse> {
        let result = self.try_login(username, password).await;
        match &result {
            Ok(_) => metrics::record_login_attempt("password", "success"),
            Err(failure) => {
                warn!(message = failure.message(), "Password login rejected");
                metrics::record_login_attempt("password", failure.category().as_str());
            }
        }
        OperationResult::from_result(result, "Login successful.")
    }

    #[instrument(skip(self, otp))]
    async fn login_otp(&self, email: &str, otp: &str) -> OperationResult<LoginResponse> {
        let result = self.try_login_otp(email, otp).await;
        match &result {
            Ok(_) => metrics::record_login_attempt("otp", "success"),
            Err(failure) => {
                warn!(message = failure.message(), "Passcode login rejected");
                metrics::record_login_attempt("otp", failure.category().as_str());
            }
        }
        OperationResult::from_result(result, "Login successful.")
    }

    fn validate_email(&self, email: &str) -> OperationResult<bool> {
        if is_valid_email(email.trim()) {
            OperationResult::success(true, "The email is valid.")
        } else {
            OperationResult::failure_user_input("The email is not in a valid format.")
        }
    }

    fn validate_username(&self, username: &str) -> OperationResult<bool> {
        if USERNAME_PATTERN.is_match(username.trim()) {
            OperationResult::success(true, "The username is valid.")
        } else {
            OperationResult::failure_user_input("The username is not in a valid format.")
        }
    }

    #[instrument(skip(self, new_password))]
    async fn set_new_password(&self, email: &str, new_password: &str) -> OperationResult<bool> {
        OperationResult::from_result(
            self.try_set_new_password(email, new_password).await,
            "The password was updated successfully.",
        )
    }

    #[instrument(skip(self, otp, new_password))]
    async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> OperationResult<bool> {
        if let Err(failure) = self.otp.validate_otp(email, otp).await.into_result() {
            return failure.into();
        }
        self.set_new_password(email, new_password).await
    }

    async fn get_page_by_filter(
        &self,
        page_number: i64,
        page_size: i64,
        filter_text: &str,
    ) -> OperationResult<Vec<User>> {
        OperationResult::from_result(
            self.try_get_page(page_number, page_size, filter_text).await,
            "User records retrieved successfully.",
        )
    }

    async fn get_count_by_filter(&self, filter_text: &str) -> OperationResult<i64> {
        let result = match self.store.count(search_text(filter_text)).await {
            Ok(count) => Ok(count),
            Err(e) => Err(self.users.store_failure(e, OperationKind::Read, None)),
        };
        OperationResult::from_result(result, "User count retrieved successfully.")
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn register(&self, request: RegisterRequest) -> OperationResult<i64> {
        OperationResult::from_result(
            self.try_register(request).await,
            "The user was registered successfully.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::otp_service::MockOtpService;
    use crate::application::validators::TokenValidator;
    use crate::config::JwtSettings;
    use crate::domain::{MockCaptchaVerifier, Store, TokenFilter};
    use crate::infrastructure::external::TracingLogSink;
    use crate::infrastructure::repositories::InMemoryRepository;
    use crate::shared::operation_result::ErrorCategory;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const FIRST_NAMES: [&str; 17] = [
        "andrea", "bianca", "carlos", "dimitri", "elena", "fabian", "greta", "hector", "ingrid",
        "jonas", "katrin", "lorenzo", "marta", "nikolai", "olivia", "pietro", "quentin",
    ];

    struct Fixture {
        service: UserServiceImpl,
        users: Arc<InMemoryRepository<User>>,
        sessions: Arc<InMemoryRepository<Session>>,
    }

    fn fixture_with(otp: MockOtpService, captcha: MockCaptchaVerifier) -> Fixture {
        let users = Arc::new(InMemoryRepository::users());
        let sessions = Arc::new(InMemoryRepository::<Session>::tokens());
        let log_sink = Arc::new(TracingLogSink);
        let session_service = EntityService::<Session>::new(
            sessions.clone(),
            Arc::new(TokenValidator::<Session>::new(sessions.clone(), users.clone())),
            log_sink.clone(),
        );
        let tokens = TokenService::new(&JwtSettings {
            secret: "0123456789abcdef0123456789abcdef".into(),
            token_expiry_minutes: 60,
        });

        let service = UserServiceImpl::new(
            users.clone(),
            Arc::new(session_service),
            Arc::new(otp),
            Arc::new(captcha),
            Arc::new(tokens),
            log_sink,
        );
        Fixture {
            service,
            users,
            sessions,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockOtpService::new(), MockCaptchaVerifier::new())
    }

    async fn add_user(fixture: &Fixture, username: &str, email: &str) -> i64 {
        let result = fixture
            .service
            .add(Some(User::new(username, email, "secret-password")))
            .await;
        assert!(result.is_successful(), "{}", result.message());
        *result.data().expect("id")
    }

    async fn seed_seventeen(fixture: &Fixture) {
        for name in FIRST_NAMES {
            add_user(fixture, &format!("{}_user", name), &format!("{}@example.com", name)).await;
        }
    }

    #[tokio::test]
    async fn test_add_hashes_password() {
        let fixture = fixture();
        let id = add_user(&fixture, "someone", "someone@example.com").await;

        let stored = fixture.service.retrieve_by_id(id).await.into_data().expect("user");
        assert!(stored.password.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_login_opens_session() {
        let fixture = fixture();
        let id = add_user(&fixture, "someone", "someone@example.com").await;

        let result = fixture.service.login("someone", "secret-password").await;

        assert!(result.is_successful(), "{}", result.message());
        let login = result.into_data().expect("login");
        assert_eq!(login.user_id, id);
        assert_eq!(login.token_type, "Bearer");
        assert_eq!(fixture.sessions.len(), 1);

        let sessions = fixture
            .sessions
            .get_by_filter(&TokenFilter::UserToken {
                user_id: id,
                token: login.token.clone(),
            })
            .await
            .expect("sessions");
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_login_messages_distinguish_missing_user_and_wrong_password() {
        let fixture = fixture();
        add_user(&fixture, "someone", "someone@example.com").await;

        let missing = fixture.service.login("nobody_here", "secret-password").await;
        let wrong = fixture.service.login("someone", "not-the-password").await;

        assert_eq!(missing.error_category(), ErrorCategory::Authentication);
        assert_eq!(missing.message(), "User not found.");
        assert_eq!(wrong.error_category(), ErrorCategory::Authentication);
        assert_eq!(wrong.message(), "Incorrect username or password.");
        assert!(fixture.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_login_rejects_deactivated_user() {
        let fixture = fixture();
        let id = add_user(&fixture, "someone", "someone@example.com").await;
        assert!(fixture.service.deactivate(id).await.is_successful());

        let result = fixture.service.login("someone", "secret-password").await;

        assert_eq!(result.message(), "The user account is deactivated.");
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let fixture = fixture();

        let result = fixture.service.login("  ", "secret-password").await;

        assert_eq!(result.error_category(), ErrorCategory::UserInput);
    }

    #[tokio::test]
    async fn test_login_otp_opens_session_after_valid_code() {
        let mut otp = MockOtpService::new();
        otp.expect_validate_otp()
            .withf(|email, code| email == "someone@example.com" && code == "123456")
            .times(1)
            .returning(|_, _| OperationResult::success(true, "The OTP is valid."));
        let fixture = fixture_with(otp, MockCaptchaVerifier::new());
        add_user(&fixture, "someone", "someone@example.com").await;

        let result = fixture.service.login_otp("someone@example.com", "123456").await;

        assert!(result.is_successful(), "{}", result.message());
        assert_eq!(fixture.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_login_otp_propagates_otp_failure() {
        let mut otp = MockOtpService::new();
        otp.expect_validate_otp()
            .returning(|_, _| OperationResult::failure_authentication("The OTP is incorrect."));
        let fixture = fixture_with(otp, MockCaptchaVerifier::new());
        add_user(&fixture, "someone", "someone@example.com").await;

        let result = fixture.service.login_otp("someone@example.com", "000000").await;

        assert_eq!(result.message(), "The OTP is incorrect.");
        assert!(fixture.sessions.is_empty());
    }

    #[test_case("someone@example.com", true ; "plain address")]
    #[test_case("someone.example.com", false ; "missing at sign")]
    #[test_case("", false ; "empty")]
    #[tokio::test]
    async fn test_validate_email(email: &str, valid: bool) {
        let result = fixture().service.validate_email(email);
        assert_eq!(result.is_successful(), valid);
        if !valid {
            assert_eq!(result.message(), "The email is not in a valid format.");
        }
    }

    #[test_case("andrea_rossi", true ; "underscore")]
    #[test_case("a.b-c_d", true ; "punctuation inside")]
    #[test_case("short", false ; "five characters")]
    #[test_case("has space", false ; "whitespace")]
    #[test_case("_leading", false ; "leading underscore")]
    #[tokio::test]
    async fn test_validate_username(username: &str, valid: bool) {
        let result = fixture().service.validate_username(username);
        assert_eq!(result.is_successful(), valid);
    }

    #[tokio::test]
    async fn test_set_new_password_changes_login_password() {
        let fixture = fixture();
        add_user(&fixture, "someone", "someone@example.com").await;

        let result = fixture
            .service
            .set_new_password("Someone@Example.com", "brand-new-password")
            .await;

        assert!(result.is_successful(), "{}", result.message());
        assert!(!fixture.service.login("someone", "secret-password").await.is_successful());
        assert!(fixture.service.login("someone", "brand-new-password").await.is_successful());
    }

    #[tokio::test]
    async fn test_set_new_password_unknown_email() {
        let fixture = fixture();

        let result = fixture
            .service
            .set_new_password("nobody@example.com", "brand-new-password")
            .await;

        assert_eq!(result.error_category(), ErrorCategory::NotFound);
        assert_eq!(result.message(), "The email is not registered.");
    }

    #[tokio::test]
    async fn test_set_new_password_is_validated() {
        let fixture = fixture();
        add_user(&fixture, "someone", "someone@example.com").await;

        let result = fixture.service.set_new_password("someone@example.com", "abc").await;

        assert_eq!(result.error_category(), ErrorCategory::BusinessValidation);
    }

    #[tokio::test]
    async fn test_reset_password_checks_otp_first() {
        let mut otp = MockOtpService::new();
        otp.expect_validate_otp().times(1).returning(|_, _| {
            OperationResult::failure_authentication("The OTP has expired or was never generated.")
        });
        let fixture = fixture_with(otp, MockCaptchaVerifier::new());
        add_user(&fixture, "someone", "someone@example.com").await;

        let result = fixture
            .service
            .reset_password("someone@example.com", "123456", "brand-new-password")
            .await;

        assert_eq!(result.error_category(), ErrorCategory::Authentication);
        assert!(fixture.service.login("someone", "secret-password").await.is_successful());
    }

    #[tokio::test]
    async fn test_first_page_of_seventeen() {
        let fixture = fixture();
        seed_seventeen(&fixture).await;

        let page = fixture
            .service
            .get_page_by_filter(0, 3, "")
            .await
            .into_data()
            .expect("page");

        let names: Vec<&str> = page.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["andrea_user", "bianca_user", "carlos_user"]);
    }

    #[tokio::test]
    async fn test_last_partial_page() {
        let fixture = fixture();
        seed_seventeen(&fixture).await;

        let page = fixture.service.get_page_by_filter(5, 3, "").await;

        assert_eq!(page.data().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_filter_andrea_matches_one() {
        let fixture = fixture();
        seed_seventeen(&fixture).await;

        let page = fixture.service.get_page_by_filter(0, 10, "Andrea").await;
        let count = fixture.service.get_count_by_filter("Andrea").await;

        assert_eq!(page.data().map(Vec::len), Some(1));
        assert_eq!(count.data(), Some(&1));
        assert_eq!(fixture.service.get_count_by_filter("").await.data(), Some(&17));
    }

    #[test_case(-1, 3 ; "negative page")]
    #[test_case(0, -3 ; "negative size")]
    #[test_case(i64::MAX, 2 ; "offset overflow")]
    #[tokio::test]
    async fn test_page_arguments_are_checked(page_number: i64, page_size: i64) {
        let result = fixture()
            .service
            .get_page_by_filter(page_number, page_size, "")
            .await;

        assert_eq!(result.error_category(), ErrorCategory::UserInput);
    }

    #[tokio::test]
    async fn test_register_requires_captcha() {
        let mut captcha = MockCaptchaVerifier::new();
        captcha
            .expect_validate()
            .times(1)
            .returning(|_| {
                OperationResult::failure_data_submitted_invalid("The captcha token is invalid.")
            });
        let fixture = fixture_with(MockOtpService::new(), captcha);

        let result = fixture
            .service
            .register(RegisterRequest {
                username: "someone".into(),
                email: "someone@example.com".into(),
                password: "secret-password".into(),
                captcha_token: "bad".into(),
            })
            .await;

        assert_eq!(result.message(), "The captcha token is invalid.");
        assert!(fixture.users.is_empty());
    }

    #[tokio::test]
    async fn test_register_adds_user() {
        let mut captcha = MockCaptchaVerifier::new();
        captcha
            .expect_validate()
            .withf(|token| token == "good")
            .returning(|_| OperationResult::success(true, "Captcha verified successfully."));
        let fixture = fixture_with(MockOtpService::new(), captcha);

        let result = fixture
            .service
            .register(RegisterRequest {
                username: "someone".into(),
                email: "someone@example.com".into(),
                password: "secret-password".into(),
                captcha_token: "good".into(),
            })
            .await;

        assert!(result.is_successful(), "{}", result.message());
        assert!(fixture.service.login("someone", "secret-password").await.is_successful());
    }
}
