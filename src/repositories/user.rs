use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// ユーザー名でユーザーを検索
    ///
    /// # Note
    /// DB セットアップ後は `query_as!` マクロに変更してコンパイル時SQL検証を有効にすること
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, name, email, phone, role,
                   last_login_at, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// 新しいユーザーを作成
    ///
    /// # Errors
    /// - UNIQUE制約違反時: `sqlx::Error::Database` (constraint = "users_username_key")
    ///   呼び出し側で `AppError::UsernameAlreadyExists` に変換すること
    ///   （事前チェックをすり抜けた同時登録はこの制約が正とする）
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        name: &str,
        email: &str,
        phone: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, name, email, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password_hash, name, email, phone, role,
                      last_login_at, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    /// 最終ログイン日時を現在時刻に更新
    ///
    /// # Note
    /// 監査用。ログインレスポンスをブロックしない経路から呼ぶこと
    pub async fn touch_last_login(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
