//! 在线状态实体定义
//!
//! 持久存储中每个用户只有一条记录；缓存中的副本带 TTL，
//! 缓存缺失只代表缓存未命中，不代表用户离线。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户在线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceStatus {
    Online,
    Offline,
    Away,
    Busy,
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceStatus::Online => write!(f, "ONLINE"),
            PresenceStatus::Offline => write!(f, "OFFLINE"),
            PresenceStatus::Away => write!(f, "AWAY"),
            PresenceStatus::Busy => write!(f, "BUSY"),
        }
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = crate::errors::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(PresenceStatus::Online),
            "OFFLINE" => Ok(PresenceStatus::Offline),
            "AWAY" => Ok(PresenceStatus::Away),
            "BUSY" => Ok(PresenceStatus::Busy),
            other => Err(crate::errors::DomainError::validation_error(
                "status",
                format!("unknown presence status: {other}"),
            )),
        }
    }
}

/// 在线状态记录
///
/// `last_seen_at` 仅在合成的离线占位记录中为 None。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    /// 用户ID
    pub user_id: Uuid,
    /// 当前状态
    pub status: PresenceStatus,
    /// 最后一次状态变更或心跳时间
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl PresenceRecord {
    /// 创建新的状态记录
    pub fn new(user_id: Uuid, status: PresenceStatus, last_seen_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            status,
            last_seen_at: Some(last_seen_at),
        }
    }

    /// 合成离线占位记录
    ///
    /// 查询不到持久记录时返回该值，不会在存储中创建任何记录。
    pub fn offline(user_id: Uuid) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Offline,
            last_seen_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_round_trip() {
        for status in [
            PresenceStatus::Online,
            PresenceStatus::Offline,
            PresenceStatus::Away,
            PresenceStatus::Busy,
        ] {
            let parsed: PresenceStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }

        assert!("INVISIBLE".parse::<PresenceStatus>().is_err());
    }

    #[test]
    fn test_record_wire_format() {
        let record = PresenceRecord::new(Uuid::new_v4(), PresenceStatus::Online, Utc::now());
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("userId").is_some());
        assert_eq!(json["status"], "ONLINE");
        assert!(json.get("lastSeenAt").is_some());
    }

    #[test]
    fn test_offline_placeholder() {
        let user_id = Uuid::new_v4();
        let record = PresenceRecord::offline(user_id);

        assert_eq!(record.user_id, user_id);
        assert_eq!(record.status, PresenceStatus::Offline);
        assert!(record.last_seen_at.is_none());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["lastSeenAt"].is_null());
    }
}
