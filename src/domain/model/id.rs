use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// 本のID。UNIXエポックからのミリ秒をそのまま整数として持つ。
/// 永続化形式（JSONの整数）と一致させるため、newtypeはtransparentに扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    /// 現在時刻（ミリ秒）から生成する。時計がエポック前を指す場合は0。
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// 直後のID。上限を超える場合はNone。
    pub fn checked_succ(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<i64> for BookId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
