use async_trait::async_trait;

use crate::error::AppError;

/// 認証済みランディング画面のルート
pub const LANDING_ROUTE: &str = "/dashboard";

/// ログイン画面（アプリのエントリポイント）のルート
pub const LOGIN_ROUTE: &str = "/";

/// プロバイダ発行のセッション
///
/// この層ではトークンの中身を解釈しない（存在確認とログ用の識別子のみ）
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub identifier: String,
}

/// 外部セッションプロバイダ境界
///
/// フローに注入される能力。本番実装は `services::SessionClient`。
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// 現在の有効なセッションを返す（なければ None）
    async fn get_session(&self) -> Result<Option<Session>, AppError>;

    /// 資格情報でサインインし、新しいセッションを得る
    async fn sign_in_with_password(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Session, AppError>;

    /// 現在のセッション文脈でパスワードを更新
    ///
    /// # Note
    /// リセットトークンはプロバイダのセッション文脈が保持している。
    /// フローから引数で渡さない
    async fn update_user_password(&self, new_password: &str) -> Result<(), AppError>;

    /// パスワードリセット手順の送付を依頼
    async fn request_password_reset(&self, email: &str) -> Result<(), AppError>;
}

/// ナビゲーション能力（ルーターの抽象）
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}
