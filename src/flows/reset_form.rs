use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use url::Url;

use crate::flows::provider::{LOGIN_ROUTE, Navigator, SessionProvider};

pub const TOKEN_MISSING_MESSAGE: &str =
    "Invalid or missing token. Please request a new password reset.";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match";
pub const RESET_FAILED_MESSAGE: &str = "Failed to update password. Please try again.";
pub const RESET_SUCCESS_MESSAGE: &str = "Password updated successfully. Redirecting to login...";

/// 成功表示からログイン画面へ戻るまでの遅延
const REDIRECT_DELAY: Duration = Duration::from_millis(3000);

/// リセットフォームのフェーズ
///
/// マウント時のトークン解決（AwaitingToken）はコンストラクタ内で即座に
/// TokenMissing / Ready のどちらかに解決される
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    TokenMissing,
    Ready,
    Submitting,
    Success,
    Failed,
}

/// エントリURLのクエリからリセットトークンを取り出す
///
/// トークンはプロバイダのリセットリンク経由で `access_token` クエリ
/// パラメータとして届く。相対URL（パスのみ）も受け付ける
pub fn extract_access_token(entry_url: &str) -> Option<String> {
    let parsed = match Url::parse(entry_url) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost").ok()?.join(entry_url).ok()?
        }
        Err(_) => return None,
    };

    parsed
        .query_pairs()
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// パスワードリセットフォームの状態機械
///
/// トークン自体はここでは検証しない。送信時の有効性判定はプロバイダに
/// 委ね、このフローはトークンの存在確認と画面状態の管理のみを行う
pub struct ResetForm {
    provider: Arc<dyn SessionProvider>,
    navigator: Arc<dyn Navigator>,

    phase: ResetPhase,
    error: Option<String>,
    notice: Option<String>,
    pub password: String,
    pub confirm_password: String,

    /// 成功後の遅延ナビゲーション。Drop時にabortする
    /// （アンマウント済みビューへの遷移を防ぐ）
    redirect_task: Option<JoinHandle<()>>,
}

impl ResetForm {
    /// エントリURLからフォームを構築
    ///
    /// `access_token` クエリパラメータが無ければ即 TokenMissing となり、
    /// ユーザー操作を待たずにエラーを表示する
    pub fn from_entry_url(
        entry_url: &str,
        provider: Arc<dyn SessionProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (phase, error) = match extract_access_token(entry_url) {
            Some(_) => (ResetPhase::Ready, None),
            None => {
                tracing::warn!("リセットトークンなしでフォームがマウントされた");
                (
                    ResetPhase::TokenMissing,
                    Some(TOKEN_MISSING_MESSAGE.to_string()),
                )
            }
        };

        Self {
            provider,
            navigator,
            phase,
            error,
            notice: None,
            password: String::new(),
            confirm_password: String::new(),
            redirect_task: None,
        }
    }

    pub fn phase(&self) -> ResetPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// 成功後はフォームを隠す
    pub fn form_visible(&self) -> bool {
        self.phase != ResetPhase::Success
    }

    /// 新しいパスワードを送信
    ///
    /// ローカル検証（トークン存在・確認入力の一致）を通らない限り
    /// ネットワークには出ない。送信中・成功後の再送信は無視
    pub async fn submit(&mut self) {
        match self.phase {
            ResetPhase::Submitting | ResetPhase::Success => return,
            ResetPhase::TokenMissing => {
                // トークンが無い以上プロバイダは拒否するだけなので送信しない
                self.error = Some(TOKEN_MISSING_MESSAGE.to_string());
                return;
            }
            ResetPhase::Ready | ResetPhase::Failed => {}
        }

        if self.password != self.confirm_password {
            self.error = Some(PASSWORD_MISMATCH_MESSAGE.to_string());
            return;
        }

        self.phase = ResetPhase::Submitting;
        self.error = None;

        match self.provider.update_user_password(&self.password).await {
            Ok(()) => {
                tracing::info!("パスワードリセット完了");
                self.phase = ResetPhase::Success;
                self.notice = Some(RESET_SUCCESS_MESSAGE.to_string());
                self.schedule_redirect();
            }
            Err(e) => {
                tracing::error!(error = ?e, "パスワードリセット失敗");
                self.phase = ResetPhase::Failed;
                self.error = Some(RESET_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// ログイン画面への一回限りの遅延ナビゲーションを予約
    fn schedule_redirect(&mut self) {
        let navigator = Arc::clone(&self.navigator);
        self.redirect_task = Some(tokio::spawn(async move {
            tokio::time::sleep(REDIRECT_DELAY).await;
            navigator.navigate(LOGIN_ROUTE);
        }));
    }
}

impl Drop for ResetForm {
    fn drop(&mut self) {
        // 予約済みのナビゲーションをアンマウント時に取り消す
        if let Some(task) = &self.redirect_task {
            task.abort();
        }
    }
}
