use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// ユーザーレコード
///
/// username は作成後に変更不可。password_hash は `#[serde(skip)]` のため
/// APIレスポンスには決して含まれない（ハッシュはAPI境界で遮断する）。
#[derive(Debug, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    /// ログイン成功時のみ更新される監査用タイムスタンプ
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "doc1".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$RWh6".to_string(),
            name: "Doc One".to_string(),
            email: "doc1@clinic.example".to_string(),
            phone: "0312345678".to_string(),
            role: "doctor".to_string(),
            last_login_at: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "doc1");
    }
}
