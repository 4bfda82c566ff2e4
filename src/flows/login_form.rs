use std::sync::Arc;

use crate::flows::provider::{LANDING_ROUTE, Navigator, SessionProvider};

/// ログイン失敗時の統一メッセージ
///
/// 資格情報不正・通信エラーいずれもこの一文のみ表示する
/// （どの失敗モードかをユーザー側に漏らさない）
pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect username or password";

/// リセット依頼後の中立メッセージ（アカウント存在有無を漏らさない）
pub const RESET_SENT_MESSAGE: &str =
    "If an account exists for that email, reset instructions have been sent.";

/// リセット依頼の通信失敗メッセージ
pub const RESET_REQUEST_FAILED_MESSAGE: &str =
    "Failed to send reset instructions. Please try again.";

/// 認証のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    Submitting,
    /// ランディング画面への遷移済み（コンポーネントはアンマウントされる）
    Success,
    Failed,
}

/// 表示中のビュー（ログイン ⇄ パスワードを忘れた）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Login,
    ForgotPassword,
}

/// ログインフォームの状態機械
///
/// 認証フェーズとは独立に、パスワード表示とテーマの各トグル、
/// および「パスワードを忘れた」ビューの独立したフォーム状態を持つ。
pub struct LoginForm {
    provider: Arc<dyn SessionProvider>,
    navigator: Arc<dyn Navigator>,

    phase: LoginPhase,
    error: Option<String>,
    pub username: String,
    pub password: String,

    // 直交する表示状態（認証フェーズに影響しない）
    show_password: bool,
    dark_mode: bool,

    view: ActiveView,
    pub forgot_email: String,
    forgot_notice: Option<String>,
    forgot_submitting: bool,
}

impl LoginForm {
    pub fn new(provider: Arc<dyn SessionProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            provider,
            navigator,
            phase: LoginPhase::Idle,
            error: None,
            username: String::new(),
            password: String::new(),
            show_password: false,
            dark_mode: false,
            view: ActiveView::Login,
            forgot_email: String::new(),
            forgot_notice: None,
            forgot_submitting: false,
        }
    }

    pub fn phase(&self) -> LoginPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    pub fn show_password(&self) -> bool {
        self.show_password
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn forgot_notice(&self) -> Option<&str> {
        self.forgot_notice.as_deref()
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// ビューを切り替える
    ///
    /// 離れる側のフォーム状態はリセットする（再表示時は常に初期状態）
    pub fn switch_view(&mut self, view: ActiveView) {
        if self.view == view {
            return;
        }

        match self.view {
            ActiveView::Login => {
                self.username.clear();
                self.password.clear();
                self.error = None;
                self.phase = LoginPhase::Idle;
            }
            ActiveView::ForgotPassword => {
                self.forgot_email.clear();
                self.forgot_notice = None;
                self.forgot_submitting = false;
            }
        }

        self.view = view;
    }

    /// ログインを送信
    ///
    /// 送信中および成功後の再送信は無視（多重送信ガード）。
    /// 失敗理由によらず表示は `LOGIN_FAILED_MESSAGE` の一文のみで、
    /// 詳細はログにのみ残す
    pub async fn submit(&mut self) {
        if !matches!(self.phase, LoginPhase::Idle | LoginPhase::Failed) {
            return;
        }

        self.phase = LoginPhase::Submitting;
        self.error = None;

        match self
            .provider
            .sign_in_with_password(&self.username, &self.password)
            .await
        {
            Ok(session) => {
                tracing::info!(identifier = %session.identifier, "ログイン成功");
                self.phase = LoginPhase::Success;
                self.navigator.navigate(LANDING_ROUTE);
            }
            Err(e) => {
                tracing::warn!(error = ?e, "ログイン失敗");
                self.phase = LoginPhase::Failed;
                self.error = Some(LOGIN_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// パスワードリセット手順の送付を依頼
    pub async fn submit_forgot(&mut self) {
        if self.forgot_submitting {
            return;
        }

        self.forgot_submitting = true;
        self.forgot_notice = None;

        match self.provider.request_password_reset(&self.forgot_email).await {
            Ok(()) => {
                self.forgot_notice = Some(RESET_SENT_MESSAGE.to_string());
            }
            Err(e) => {
                tracing::error!(error = ?e, "リセットメール依頼失敗");
                self.forgot_notice = Some(RESET_REQUEST_FAILED_MESSAGE.to_string());
            }
        }

        self.forgot_submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::flows::provider::Session;

    struct MockProvider {
        reject: bool,
        sign_in_calls: AtomicUsize,
        reset_calls: AtomicUsize,
    }

    impl MockProvider {
        fn accepting() -> Self {
            Self {
                reject: false,
                sign_in_calls: AtomicUsize::new(0),
                reset_calls: AtomicUsize::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::accepting()
            }
        }
    }

    #[async_trait]
    impl SessionProvider for MockProvider {
        async fn get_session(&self) -> Result<Option<Session>, AppError> {
            Ok(None)
        }

        async fn sign_in_with_password(
            &self,
            identifier: &str,
            _password: &str,
        ) -> Result<Session, AppError> {
            self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                Err(AppError::Authentication("invalid_credentials".to_string()))
            } else {
                Ok(Session {
                    access_token: "tok".to_string(),
                    identifier: identifier.to_string(),
                })
            }
        }

        async fn update_user_password(&self, _new_password: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn request_password_reset(&self, _email: &str) -> Result<(), AppError> {
            self.reset_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                Err(AppError::Internal(anyhow::anyhow!("provider down")))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        routes: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: &str) {
            self.routes.lock().unwrap().push(route.to_string());
        }
    }

    fn form_with(provider: Arc<MockProvider>) -> (LoginForm, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        (LoginForm::new(provider, navigator.clone()), navigator)
    }

    #[tokio::test]
    async fn test_successful_login_navigates_to_landing() {
        let provider = Arc::new(MockProvider::accepting());
        let (mut form, navigator) = form_with(provider);
        form.username = "doc1".to_string();
        form.password = "password123".to_string();

        form.submit().await;

        assert_eq!(form.phase(), LoginPhase::Success);
        assert!(form.error().is_none());
        assert_eq!(*navigator.routes.lock().unwrap(), vec![LANDING_ROUTE]);
    }

    #[tokio::test]
    async fn test_rejected_login_shows_uniform_message_without_navigation() {
        let provider = Arc::new(MockProvider::rejecting());
        let (mut form, navigator) = form_with(provider);
        form.username = "doc1".to_string();
        form.password = "wrongpw".to_string();

        form.submit().await;

        assert_eq!(form.phase(), LoginPhase::Failed);
        assert_eq!(form.error(), Some(LOGIN_FAILED_MESSAGE));
        assert!(navigator.routes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_failure_clears_previous_error() {
        let provider = Arc::new(MockProvider::rejecting());
        let (mut form, _) = form_with(provider.clone());
        form.submit().await;
        assert!(form.error().is_some());

        // 2度目の送信は許可され、エラーは一旦クリアされてから再設定される
        form.submit().await;
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 2);
        assert_eq!(form.phase(), LoginPhase::Failed);
    }

    #[tokio::test]
    async fn test_resubmit_after_success_is_ignored() {
        let provider = Arc::new(MockProvider::accepting());
        let (mut form, navigator) = form_with(provider.clone());

        form.submit().await;
        form.submit().await;

        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 1);
        assert_eq!(navigator.routes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggles_do_not_affect_auth_phase() {
        let provider = Arc::new(MockProvider::accepting());
        let (mut form, _) = form_with(provider);

        form.toggle_password_visibility();
        form.toggle_theme();

        assert!(form.show_password());
        assert!(form.dark_mode());
        assert_eq!(form.phase(), LoginPhase::Idle);

        form.toggle_password_visibility();
        assert!(!form.show_password());
    }

    #[tokio::test]
    async fn test_switch_view_resets_abandoned_form_state() {
        let provider = Arc::new(MockProvider::rejecting());
        let (mut form, _) = form_with(provider);
        form.username = "doc1".to_string();
        form.password = "wrongpw".to_string();
        form.submit().await;
        assert!(form.error().is_some());

        form.switch_view(ActiveView::ForgotPassword);

        assert_eq!(form.view(), ActiveView::ForgotPassword);
        assert!(form.username.is_empty());
        assert!(form.password.is_empty());
        assert!(form.error().is_none());
        assert_eq!(form.phase(), LoginPhase::Idle);

        // 逆方向も同様（忘れた側の状態がリセットされる）
        form.forgot_email = "doc1@clinic.example".to_string();
        form.switch_view(ActiveView::Login);
        assert!(form.forgot_email.is_empty());
        assert!(form.forgot_notice().is_none());
    }

    #[tokio::test]
    async fn test_forgot_submit_shows_neutral_notice() {
        let provider = Arc::new(MockProvider::accepting());
        let (mut form, _) = form_with(provider.clone());
        form.switch_view(ActiveView::ForgotPassword);
        form.forgot_email = "doc1@clinic.example".to_string();

        form.submit_forgot().await;

        assert_eq!(form.forgot_notice(), Some(RESET_SENT_MESSAGE));
        assert_eq!(provider.reset_calls.load(Ordering::SeqCst), 1);
    }
}
