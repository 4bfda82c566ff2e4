use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// ログインハンドラー
///
/// POST /api/v1/login
///
/// 処理フロー:
/// 1. ユーザー認証（DB照合、ユーザー不在と不一致は同一応答）
/// 2. 最終ログイン日時を更新（fire-and-forget）
/// 3. ユーザー情報を返却
///
/// # Note
/// 欠落フィールドや空文字のバリデーション応答は返さない。
/// 資格情報に関わる失敗はすべて同一の401になる（列挙攻撃防止）
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let auth_service = AuthService::new(state.user_repo.clone());

    let user = auth_service
        .authenticate(&request.username, &request.password)
        .await?;

    // 最終ログイン日時の更新は監査用であり、認証の成立条件ではない。
    // 書き込み失敗してもログインは成功させ、レスポンスも遅延させない
    let user_repo = state.user_repo.clone();
    let user_id = user.id;
    tokio::spawn(async move {
        if let Err(e) = user_repo.touch_last_login(user_id).await {
            tracing::warn!(error = ?e, user_id = %user_id, "最終ログイン日時の更新失敗");
        }
    });

    Ok(Json(ApiResponse::success(user)))
}
