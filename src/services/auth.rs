use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserRepository;

/// パスワードをargon2idでハッシュ化
///
/// ソルトは毎回ランダム生成（同じ平文でもハッシュは毎回異なる）
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!(error = ?e, "パスワードハッシュ生成エラー");
            AppError::Internal(anyhow::anyhow!("password hash error"))
        })?;
    Ok(hash.to_string())
}

/// 平文パスワードを保存済みハッシュと照合
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::error!(error = ?e, "パスワードハッシュのパースエラー");
        AppError::Internal(anyhow::anyhow!("password hash parse error"))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// タイミング攻撃対策用のダミーハッシュ
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$RWh6";

/// 認証サービス
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
}

impl AuthService {
    /// 新しい AuthService を作成
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// ユーザー認証を実行
    ///
    /// タイミング攻撃対策: ユーザーが存在しない場合もダミーのパスワード検証を実行
    ///
    /// # Errors
    /// ユーザー不在とパスワード不一致は同じ `AppError::Authentication` を返す
    /// （応答からユーザー名の存在有無を推測させない）
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self.user_repo.find_by_username(username).await?;

        match user {
            Some(user) => {
                if verify_password(password, &user.password_hash)? {
                    tracing::info!(username = %username, "認証成功");
                    Ok(user)
                } else {
                    tracing::warn!(username = %username, "認証失敗: パスワード不一致");
                    Err(AppError::Authentication("invalid_credentials".to_string()))
                }
            }
            None => {
                // ユーザーが存在しない場合もダミーのパスワード検証を実行
                // これにより、ユーザーの存在有無を応答時間から推測できなくなる
                let _ = verify_password(password, DUMMY_HASH);
                tracing::warn!(username = %username, "認証失敗: ユーザー不在");
                Err(AppError::Authentication("invalid_credentials".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_is_salted() {
        // 同じ平文を2回ハッシュ化しても結果は異なる（ソルト付き）
        let first = hash_password("newpw123").unwrap();
        let second = hash_password("newpw123").unwrap();
        assert_ne!(first, second);

        // どちらのハッシュも同じ平文で検証に成功する
        assert!(verify_password("newpw123", &first).unwrap());
        assert!(verify_password("newpw123", &second).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_wrong_password() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(!verify_password("wrongpw", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash_format() {
        // 不正なハッシュ形式はエラー（falseではなく）
        let result = verify_password("whatever", "invalid_hash_format");
        assert!(result.is_err());
    }
}
