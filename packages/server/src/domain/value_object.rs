//! Value Object 定義
//!
//! ID や本文などのプリミティブ値をラップし、生成時にバリデーションを行います。
//! 一度生成された Value Object は常に有効な値を保持します。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// ユーザー ID の最大長
pub const USER_ID_MAX_LEN: usize = 128;
/// 表示名の最大長
pub const USERNAME_MAX_LEN: usize = 64;
/// Room ID の最大長
pub const ROOM_ID_MAX_LEN: usize = 128;
/// メッセージ本文の最大長（文字数）
pub const MESSAGE_CONTENT_MAX_LEN: usize = 4096;

fn validate(field: &'static str, value: &str, max: usize) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValueObjectError::TooLong { field, max, actual });
    }
    Ok(())
}

/// 文字列ベースの Value Object を定義するマクロ
///
/// `new` / `as_str` / `into_string` / `TryFrom<String>` / `Display` を実装します。
macro_rules! string_value_object {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate($field, &value, $max)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_value_object!(
    /// ユーザー ID（認証済みの安定した識別子）
    UserId,
    "user_id",
    USER_ID_MAX_LEN
);

string_value_object!(
    /// 表示名
    Username,
    "username",
    USERNAME_MAX_LEN
);

string_value_object!(
    /// Room ID（会話 = Conversation の識別子）
    RoomId,
    "room_id",
    ROOM_ID_MAX_LEN
);

string_value_object!(
    /// 永続化層が採番するメッセージ ID
    MessageId,
    "message_id",
    USER_ID_MAX_LEN
);

string_value_object!(
    /// メッセージ本文
    ///
    /// 空白のみの本文は受け付けない。
    MessageContent,
    "content",
    MESSAGE_CONTENT_MAX_LEN
);

impl RoomId {
    /// 新しい Room ID をランダムに生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl MessageId {
    /// 新しいメッセージ ID をランダムに生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

/// 接続 ID
///
/// 受け付けた接続ごとに払い出される。同一ユーザーの再接続を区別するために使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// タイムスタンプ（Unix ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
