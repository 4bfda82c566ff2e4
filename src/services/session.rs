use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::flows::provider::{Session, SessionProvider};

/// トークンエンドポイントのレスポンス（パスワードグラント）
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: ProviderUser,
}

/// プロバイダ側のユーザー情報（必要な項目のみ）
#[derive(Debug, Deserialize)]
pub struct ProviderUser {
    pub id: String,
}

/// サインインリクエスト（clinigate → プロバイダ）
#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// パスワード更新リクエスト（clinigate → プロバイダ）
#[derive(Debug, Serialize)]
struct UpdatePasswordRequest<'a> {
    password: &'a str,
}

/// リセットメール送付リクエスト（clinigate → プロバイダ）
#[derive(Debug, Serialize)]
struct RecoverRequest<'a> {
    email: &'a str,
}

/// セッションプロバイダAPIクライアント
///
/// マネージド認証サービスの薄いラッパー。セッション（アクセストークン）を
/// 保持し、`SessionProvider` としてフローに注入される。
#[derive(Clone)]
pub struct SessionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl SessionClient {
    /// 新しい SessionClient を作成（セッションなし）
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            access_token: None,
        }
    }

    /// 既存のアクセストークンを持つクライアントを作成
    ///
    /// パスワードリセット画面など、ナビゲーションで受け取ったトークンから
    /// セッション文脈を復元する場合に使う
    pub fn with_session(mut self, access_token: String) -> Self {
        self.access_token = Some(access_token);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

#[async_trait]
impl SessionProvider for SessionClient {
    /// 現在のセッションを取得
    ///
    /// トークンを保持していなければネットワークを介さず None を返す。
    /// プロバイダが 401 を返した場合もセッションなしとして扱う
    async fn get_session(&self) -> Result<Option<Session>, AppError> {
        let token = match &self.access_token {
            Some(token) => token,
            None => return Ok(None),
        };

        let response: reqwest::Response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::debug!("セッション無効（期限切れまたは失効）");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "セッション取得失敗");
            return Err(AppError::Internal(anyhow::anyhow!(
                "session provider returned status: {}",
                status
            )));
        }

        let user: ProviderUser = response.json().await.map_err(|e| {
            tracing::error!(error = ?e, "プロバイダレスポンスのパースエラー");
            AppError::Internal(anyhow::anyhow!("failed to parse provider response"))
        })?;

        tracing::debug!("セッション取得成功");
        Ok(Some(Session {
            access_token: token.clone(),
            identifier: user.id,
        }))
    }

    /// 資格情報でサインイン
    async fn sign_in_with_password(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        let url = format!("{}?grant_type=password", self.endpoint("token"));

        let body = PasswordGrantRequest {
            identifier,
            password,
        };

        let response: reqwest::Response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            tracing::warn!(status = %status, "サインイン拒否");
            return Err(AppError::Authentication("invalid_credentials".to_string()));
        }

        if !status.is_success() {
            tracing::error!(status = %status, "サインイン失敗");
            return Err(AppError::Internal(anyhow::anyhow!(
                "session provider returned status: {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            tracing::error!(error = ?e, "プロバイダレスポンスのパースエラー");
            AppError::Internal(anyhow::anyhow!("failed to parse provider response"))
        })?;

        tracing::info!("サインイン成功");
        Ok(Session {
            access_token: token.access_token,
            identifier: token.user.id,
        })
    }

    /// 現在のセッション文脈でパスワードを更新
    async fn update_user_password(&self, new_password: &str) -> Result<(), AppError> {
        let token = self
            .access_token
            .as_ref()
            .ok_or_else(|| AppError::Authentication("missing session".to_string()))?;

        let body = UpdatePasswordRequest {
            password: new_password,
        };

        let response: reqwest::Response = self
            .client
            .put(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "パスワード更新失敗");
            return Err(AppError::Internal(anyhow::anyhow!(
                "session provider returned status: {}",
                status
            )));
        }

        tracing::info!("パスワード更新成功");
        Ok(())
    }

    /// パスワードリセット手順の送付を依頼
    ///
    /// # Security
    /// プロバイダはアカウントの存在有無によらず成功を返す
    async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let body = RecoverRequest { email };

        let response: reqwest::Response = self
            .client
            .post(self.endpoint("recover"))
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "リセットメール依頼失敗");
            return Err(AppError::Internal(anyhow::anyhow!(
                "session provider returned status: {}",
                status
            )));
        }

        tracing::info!("リセットメール依頼成功");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let client = SessionClient::new(
            "https://auth.example.com".to_string(),
            "anon-key".to_string(),
        );
        assert_eq!(
            client.endpoint("token"),
            "https://auth.example.com/auth/v1/token"
        );
        assert_eq!(
            client.endpoint("user"),
            "https://auth.example.com/auth/v1/user"
        );
    }

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{"access_token": "tok-abc", "user": {"id": "user-1"}}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "tok-abc");
        assert_eq!(parsed.user.id, "user-1");
    }

    #[tokio::test]
    async fn test_get_session_without_token_skips_network() {
        // トークン未保持なら即 None（ネットワーク不要なのでテスト可能）
        let client = SessionClient::new(
            "https://auth.example.com".to_string(),
            "anon-key".to_string(),
        );
        let session = client.get_session().await.unwrap();
        assert!(session.is_none());
    }
}
