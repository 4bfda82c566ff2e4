use std::sync::Arc;

use crate::flows::provider::{LANDING_ROUTE, Navigator, SessionProvider};

/// ゲート通過の結果
#[derive(Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// セッションあり → ランディング画面へリダイレクト済み
    Redirected,
    /// セッションなし → ログインフォームを表示
    ShowLogin,
}

/// セッション存在ゲート
///
/// ログイン画面のマウント時に一度だけプロバイダへ問い合わせ、
/// 認証済みユーザーをログイン画面から遠ざける。ポーリングはしない。
pub struct SessionGate {
    provider: Arc<dyn SessionProvider>,
    navigator: Arc<dyn Navigator>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn SessionProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            provider,
            navigator,
        }
    }

    /// セッションの有無を確認（マウントごとに一度だけ呼ぶ）
    ///
    /// プロバイダエラー時はセッションなしとして扱う
    /// （ログインフォーム表示が安全側のフォールバック）
    pub async fn check(&self) -> GateOutcome {
        match self.provider.get_session().await {
            Ok(Some(session)) => {
                tracing::debug!(identifier = %session.identifier, "セッションあり、リダイレクト");
                self.navigator.navigate(LANDING_ROUTE);
                GateOutcome::Redirected
            }
            Ok(None) => GateOutcome::ShowLogin,
            Err(e) => {
                tracing::warn!(error = ?e, "セッション確認失敗、ログイン画面を表示");
                GateOutcome::ShowLogin
            }
        }
    }
}
