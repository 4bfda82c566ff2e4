use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::models::User;
use crate::repositories::UserRepository;
use crate::services::auth::hash_password;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String, // SecretBox不要（Deserialize後すぐハッシュ化）
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
}

/// ユーザー登録ハンドラー
///
/// POST /api/v1/register
///
/// # Security
/// - パスワードはログに出力しない
/// - パスワードは即座にハッシュ化
/// - レスポンスの user row に password_hash は含まれない（`#[serde(skip)]`）
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    // バリデーション
    validate_register_request(&request)?;

    let user_repo = UserRepository::new(state.db_pool.clone());

    // ユーザー名の重複チェック（部分書き込みを防ぐため先に確認）
    if user_repo
        .find_by_username(&request.username)
        .await?
        .is_some()
    {
        tracing::warn!(username = %request.username, "登録失敗: ユーザー名重複");
        return Err(AppError::UsernameAlreadyExists);
    }

    // パスワードハッシュ化
    let password_hash = hash_password(&request.password)?;

    // ユーザー作成
    // 事前チェックと挿入の間に同名登録が割り込んだ場合はUNIQUE制約が正
    let user = user_repo
        .create_user(
            &request.username,
            &password_hash,
            &request.name,
            &request.email,
            &request.phone,
            &request.role,
        )
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.constraint() == Some("users_username_key")
            {
                return AppError::UsernameAlreadyExists;
            }
            AppError::Database(e)
        })?;

    tracing::info!(username = %user.username, "ユーザー登録成功");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// 登録リクエストのバリデーション
fn validate_register_request(request: &RegisterRequest) -> Result<(), AppError> {
    // username: 必須
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    // password: 8文字以上
    if request.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    // email: 必須、メール形式
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(())
}
