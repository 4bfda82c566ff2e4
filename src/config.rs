use secrecy::SecretBox;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: SecretBox<String>,

    // セッションプロバイダ設定（フロントエンドのフロー側で使用）
    /// セッションプロバイダのベースURL
    pub auth_api_url: String,
    /// セッションプロバイダの公開APIキー
    pub auth_api_key: SecretBox<String>,

    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // CORS設定（未設定時は permissive）
    #[serde(default)]
    pub cors_origin: Option<String>,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// 環境変数から設定を読み込む
    ///
    /// # Note
    /// 必須項目（DATABASE_URL, AUTH_API_URL, AUTH_API_KEY）が欠けている場合は
    /// エラーを返す。起動時に失敗させること（初回リクエスト時ではなく）。
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
