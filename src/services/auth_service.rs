use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use jsonwebtoken::errors::ErrorKind;
use password_hash::rand_core::OsRng;

use crate::{
    config::AppConfig,
    dto::auth::{ProfileUpdateRequest, SignupRequest},
    error::{AppError, AppResult, is_unique_violation},
    mailer::Mailer,
    models::{Role, User},
    repository::{NewUser, UserChanges, UserRepository},
    response::ApiResponse,
    token::{Claims, create_token, decode_token},
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Insert a new account with a hashed password. Uniqueness is not pre-checked;
/// a duplicate key rejection from the store maps to the registration failure.
pub async fn register(
    repo: &impl UserRepository,
    payload: SignupRequest,
) -> AppResult<ApiResponse<User>> {
    let role = Role::parse(payload.user_type.trim())
        .filter(|role| *role != Role::Admin)
        .ok_or_else(|| AppError::BadRequest("Geçersiz kullanıcı tipi".to_string()))?;

    let new_user = NewUser {
        username: payload.username.trim().to_string(),
        password_hash: hash_password(&payload.password)?,
        email: payload.email.trim().to_string(),
        role: role.as_str().to_string(),
    };

    let user = match repo.save(&new_user).await {
        Ok(user) => user,
        Err(AppError::DbError(err)) if is_unique_violation(&err) => {
            return Err(AppError::BadRequest("Kayıt başarısız".to_string()));
        }
        Err(err) => return Err(err),
    };

    Ok(ApiResponse::success("Kayıt başarılı", user, None))
}

/// Credential check; on success mints a session token.
pub async fn login(
    repo: &impl UserRepository,
    config: &AppConfig,
    username: &str,
    password: &str,
) -> AppResult<(User, String)> {
    let unauthorized = || AppError::Unauthorized("Kullanıcı adı veya şifre hatalı".to_string());

    let user = repo
        .find_by_username(username.trim())
        .await?
        .ok_or_else(unauthorized)?;

    if !verify_password(&user.password_hash, password) {
        return Err(unauthorized());
    }

    let token = create_token(
        user.id,
        &user.username,
        &user.role,
        config.token_ttl_secs,
        &config.secret_key,
    )?;

    Ok((user, token))
}

#[derive(Debug)]
pub struct ProfileUpdateOutcome {
    pub message: String,
    /// Fresh token when the username changed; the old one still carries the
    /// stale identity until it expires.
    pub token: Option<String>,
}

/// Partial profile update with per-field uniqueness checks. Nothing is
/// written unless every requested change passes.
pub async fn update_profile(
    repo: &impl UserRepository,
    config: &AppConfig,
    user_id: i32,
    payload: ProfileUpdateRequest,
) -> AppResult<ProfileUpdateOutcome> {
    let user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Kullanıcı bulunamadı.".to_string()))?;

    let password_hash = match payload.new_password.as_deref().filter(|p| !p.is_empty()) {
        Some(new_password) => {
            let current = payload.current_password.as_deref().unwrap_or("");
            if current.is_empty() || !verify_password(&user.password_hash, current) {
                return Err(AppError::BadRequest("Mevcut şifre yanlış.".to_string()));
            }
            Some(hash_password(new_password)?)
        }
        None => None,
    };

    let username = payload.username.filter(|u| !u.is_empty());
    let email = payload.email.filter(|e| !e.is_empty());

    if let Some(username) = &username {
        if *username != user.username && repo.find_by_username(username).await?.is_some() {
            return Err(AppError::BadRequest(
                "Bu kullanıcı adı zaten kullanılıyor.".to_string(),
            ));
        }
    }

    if let Some(email) = &email {
        if *email != user.email && repo.find_by_email(email).await?.is_some() {
            return Err(AppError::BadRequest(
                "Bu e-posta adresi zaten kullanılıyor.".to_string(),
            ));
        }
    }

    let changes = UserChanges {
        username: username.clone(),
        email,
        password_hash,
    };
    if changes.is_empty() {
        return Err(AppError::BadRequest("Değişiklik yapılmadı.".to_string()));
    }

    if !repo.update(user_id, &changes).await? {
        return Err(AppError::BadRequest(
            "Profil güncellenirken bir hata oluştu.".to_string(),
        ));
    }

    let token = match username.filter(|u| *u != user.username) {
        Some(new_username) => Some(create_token(
            user.id,
            &new_username,
            &user.role,
            config.token_ttl_secs,
            &config.secret_key,
        )?),
        None => None,
    };

    Ok(ProfileUpdateOutcome {
        message: "Profil başarıyla güncellendi.".to_string(),
        token,
    })
}

/// Issue a reset link when the address is known. The route answers with the
/// same generic message either way.
pub async fn forget_password(
    repo: &impl UserRepository,
    config: &AppConfig,
    mailer: &Mailer,
    email: &str,
) -> AppResult<()> {
    match repo.find_by_email(email.trim()).await? {
        Some(user) => {
            let token = create_token(
                user.id,
                &user.username,
                &user.role,
                config.reset_ttl_secs,
                &config.secret_key,
            )?;
            let verify_link = format!("{}/verify_reset/{}", config.base_url, token);
            mailer.send_verification_email(&user.email, &verify_link).await;
        }
        None => {
            tracing::debug!("password reset requested for unknown address");
        }
    }
    Ok(())
}

/// Decode a reset token, mapping expiry and malformed tokens to the
/// user-visible messages.
pub fn validate_reset_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode_token(token, secret).map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => AppError::BadRequest(
            "Bağlantı süresi dolmuş. Lütfen tekrar deneyin.".to_string(),
        ),
        _ => AppError::BadRequest("Geçersiz bağlantı.".to_string()),
    })
}

pub async fn reset_password(
    repo: &impl UserRepository,
    config: &AppConfig,
    token: &str,
    new_password: &str,
) -> AppResult<()> {
    let claims = validate_reset_token(token, &config.secret_key)?;
    let user_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::BadRequest("Geçersiz bağlantı.".to_string()))?;

    let password_hash = hash_password(new_password)?;
    if !repo.update_password(user_id, &password_hash).await? {
        return Err(AppError::BadRequest(
            "Şifre güncellenirken bir hata oluştu.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockUserRepo {
        users: Mutex<Vec<User>>,
        update_calls: AtomicUsize,
    }

    impl MockUserRepo {
        fn with_users(users: Vec<User>) -> Self {
            Self {
                users: Mutex::new(users),
                update_calls: AtomicUsize::new(0),
            }
        }

        fn updates(&self) -> usize {
            self.update_calls.load(Ordering::SeqCst)
        }
    }

    impl UserRepository for MockUserRepo {
        async fn save(&self, user: &NewUser) -> AppResult<User> {
            let mut users = self.users.lock().unwrap();
            let user = User {
                id: users.len() as i32 + 1,
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                email: user.email.clone(),
                role: user.role.clone(),
                created_at: Utc::now(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.username == username).cloned())
        }

        async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn update(&self, id: i32, changes: &UserChanges) -> AppResult<bool> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            let Some(user) = users.iter_mut().find(|u| u.id == id) else {
                return Ok(false);
            };
            if let Some(username) = &changes.username {
                user.username = username.clone();
            }
            if let Some(email) = &changes.email {
                user.email = email.clone();
            }
            if let Some(password_hash) = &changes.password_hash {
                user.password_hash = password_hash.clone();
            }
            Ok(true)
        }

        async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<bool> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            let Some(user) = users.iter_mut().find(|u| u.id == id) else {
                return Ok(false);
            };
            user.password_hash = password_hash.to_string();
            Ok(true)
        }

        async fn list_all(&self) -> AppResult<Vec<User>> {
            Ok(self.users.lock().unwrap().clone())
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: String::new(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            secret_key: "test-secret".to_string(),
            token_ttl_secs: 7200,
            reset_ttl_secs: 900,
            base_url: "http://127.0.0.1:3000".to_string(),
            mail: MailConfig {
                server: None,
                port: 587,
                username: None,
                password: None,
                sender: "noreply@localhost".to_string(),
            },
        }
    }

    fn seed_user(id: i32, username: &str, email: &str, password: &str) -> User {
        User {
            id,
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
            email: email.to_string(),
            role: "customer".to_string(),
            created_at: Utc::now(),
        }
    }

    fn bad_request_message(err: AppError) -> String {
        match err {
            AppError::BadRequest(message) => message,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_accepts_only_the_matching_password() {
        let repo = MockUserRepo::with_users(vec![seed_user(1, "ali", "ali@ornek.com", "parola1")]);
        let config = test_config();

        let (user, token) = login(&repo, &config, "ali", "parola1").await.unwrap();
        assert_eq!(user.id, 1);
        assert!(!token.is_empty());

        let err = login(&repo, &config, "ali", "yanlis").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = login(&repo, &config, "yok", "parola1").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn register_rejects_admin_and_unknown_roles() {
        let repo = MockUserRepo::with_users(vec![]);
        for user_type in ["admin", "yonetici", ""] {
            let err = register(
                &repo,
                SignupRequest {
                    username: "yeni".to_string(),
                    password: "parola".to_string(),
                    email: "yeni@ornek.com".to_string(),
                    user_type: user_type.to_string(),
                },
            )
            .await
            .unwrap_err();
            assert_eq!(bad_request_message(err), "Geçersiz kullanıcı tipi");
        }
        assert!(repo.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_hashes_the_password() {
        let repo = MockUserRepo::with_users(vec![]);
        register(
            &repo,
            SignupRequest {
                username: "ayse".to_string(),
                password: "gizli123".to_string(),
                email: "ayse@ornek.com".to_string(),
                user_type: "supplier".to_string(),
            },
        )
        .await
        .unwrap();

        let users = repo.users.lock().unwrap();
        assert_ne!(users[0].password_hash, "gizli123");
        assert!(verify_password(&users[0].password_hash, "gizli123"));
        assert_eq!(users[0].role, "supplier");
    }

    #[tokio::test]
    async fn profile_update_rejects_wrong_current_password() {
        let repo = MockUserRepo::with_users(vec![seed_user(1, "ali", "ali@ornek.com", "parola1")]);
        let err = update_profile(
            &repo,
            &test_config(),
            1,
            ProfileUpdateRequest {
                current_password: Some("yanlis".to_string()),
                new_password: Some("yeniparola".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(bad_request_message(err), "Mevcut şifre yanlış.");
        assert_eq!(repo.updates(), 0);
    }

    #[tokio::test]
    async fn profile_update_rejects_taken_username_without_partial_write() {
        let repo = MockUserRepo::with_users(vec![
            seed_user(1, "ali", "ali@ornek.com", "parola1"),
            seed_user(2, "veli", "veli@ornek.com", "parola2"),
        ]);
        let err = update_profile(
            &repo,
            &test_config(),
            1,
            ProfileUpdateRequest {
                username: Some("veli".to_string()),
                email: Some("ali2@ornek.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(bad_request_message(err), "Bu kullanıcı adı zaten kullanılıyor.");
        assert_eq!(repo.updates(), 0);
        assert_eq!(
            repo.find_by_id(1).await.unwrap().unwrap().email,
            "ali@ornek.com"
        );
    }

    #[tokio::test]
    async fn profile_update_rejects_taken_email() {
        let repo = MockUserRepo::with_users(vec![
            seed_user(1, "ali", "ali@ornek.com", "parola1"),
            seed_user(2, "veli", "veli@ornek.com", "parola2"),
        ]);
        let err = update_profile(
            &repo,
            &test_config(),
            1,
            ProfileUpdateRequest {
                email: Some("veli@ornek.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(bad_request_message(err), "Bu e-posta adresi zaten kullanılıyor.");
    }

    #[tokio::test]
    async fn profile_update_without_changes_is_rejected() {
        let repo = MockUserRepo::with_users(vec![seed_user(1, "ali", "ali@ornek.com", "parola1")]);
        let err = update_profile(&repo, &test_config(), 1, ProfileUpdateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(bad_request_message(err), "Değişiklik yapılmadı.");
    }

    #[tokio::test]
    async fn profile_update_applies_partial_changes() {
        let repo = MockUserRepo::with_users(vec![seed_user(1, "ali", "ali@ornek.com", "parola1")]);
        let outcome = update_profile(
            &repo,
            &test_config(),
            1,
            ProfileUpdateRequest {
                email: Some("ali@yeni.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.message, "Profil başarıyla güncellendi.");
        assert!(outcome.token.is_none());
        let user = repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(user.email, "ali@yeni.com");
        assert_eq!(user.username, "ali");
    }

    #[tokio::test]
    async fn username_change_mints_a_fresh_token() {
        let repo = MockUserRepo::with_users(vec![seed_user(1, "ali", "ali@ornek.com", "parola1")]);
        let config = test_config();
        let outcome = update_profile(
            &repo,
            &config,
            1,
            ProfileUpdateRequest {
                username: Some("mehmet".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let token = outcome.token.expect("expected a fresh token");
        let claims = decode_token(&token, &config.secret_key).unwrap();
        assert_eq!(claims.username, "mehmet");
        assert_eq!(claims.sub, "1");
    }

    #[tokio::test]
    async fn reset_password_rewrites_the_hash() {
        let repo = MockUserRepo::with_users(vec![seed_user(1, "ali", "ali@ornek.com", "eski")]);
        let config = test_config();
        let token = create_token(1, "ali", "customer", config.reset_ttl_secs, &config.secret_key)
            .unwrap();

        reset_password(&repo, &config, &token, "yepyeni").await.unwrap();

        let user = repo.find_by_id(1).await.unwrap().unwrap();
        assert!(verify_password(&user.password_hash, "yepyeni"));
        assert!(!verify_password(&user.password_hash, "eski"));
    }

    #[test]
    fn expired_reset_token_maps_to_the_expiry_message() {
        let token = create_token(1, "ali", "customer", -3600, "test-secret").unwrap();
        let err = validate_reset_token(&token, "test-secret").unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "Bağlantı süresi dolmuş. Lütfen tekrar deneyin."
        );

        let err = validate_reset_token("bozuk-token", "test-secret").unwrap_err();
        assert_eq!(bad_request_message(err), "Geçersiz bağlantı.");
    }
}
