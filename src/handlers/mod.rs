use serde::Serialize;

pub mod health;
pub mod login;
pub mod register;

pub use health::health_check;
pub use login::login;
pub use register::register;

/// 成功レスポンス
///
/// フロントエンドが期待する `{status: "success", data: ...}` 形式。
/// エラー側の形式は `error::AppError` の `IntoResponse` を参照
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
