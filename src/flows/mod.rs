//! ブラウザUI側のセッションライフサイクルフロー
//!
//! 各フローはセッションプロバイダとナビゲーションを能力として注入されて
//! 動作する（モジュールレベルのシングルトンに依存しない）。本番では
//! `services::SessionClient` が `SessionProvider` を実装し、テストでは
//! モックを差し込む。

pub mod login_form;
pub mod provider;
pub mod reset_form;
pub mod session_gate;

pub use login_form::LoginForm;
pub use reset_form::ResetForm;
pub use session_gate::SessionGate;
