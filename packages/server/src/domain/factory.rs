//! Factories for generated identifiers and names.

use rand::Rng;
use uuid::Uuid;

use super::{
    matchmaking::QueueKind,
    value_object::{AnonAlias, ConnectionId, RoomName, Timestamp},
};

/// Length of the id fragments embedded in anonymous pair room names.
const PAIR_ROOM_ID_FRAGMENT_LEN: usize = 5;

/// Generates connection ids.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// A fresh UUID v4 in simple (hyphen-less) form.
    pub fn generate() -> ConnectionId {
        ConnectionId::from_generated(Uuid::new_v4().simple().to_string())
    }
}

/// Builds room names following the relay's naming conventions.
pub struct RoomNameFactory;

impl RoomNameFactory {
    /// `<queue prefix>-<epoch ms>-<fragment of a>-<fragment of b>`
    pub fn anonymous_pair(
        kind: QueueKind,
        now: Timestamp,
        a: &ConnectionId,
        b: &ConnectionId,
    ) -> RoomName {
        RoomName::from_generated(format!(
            "{}-{}-{}-{}",
            kind.room_prefix(),
            now.value(),
            a.fragment(PAIR_ROOM_ID_FRAGMENT_LEN),
            b.fragment(PAIR_ROOM_ID_FRAGMENT_LEN)
        ))
    }
}

/// Generates anonymous chat aliases.
pub struct AnonAliasFactory;

impl AnonAliasFactory {
    /// `Stranger-NNNN`, `NNNN` uniformly in 1000..=9999.
    pub fn generate() -> AnonAlias {
        AnonAlias::from_number(rand::thread_rng().gen_range(1000..=9999))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_generated_connection_ids_are_unique() {
        // テスト項目: 生成された接続 ID は一意で空でない
        // given (前提条件) / when (操作):
        let first = ConnectionIdFactory::generate();
        let second = ConnectionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
    }

    #[test]
    fn test_anonymous_pair_room_name() {
        // テスト項目: 匿名ペアルーム名は接頭辞・時刻・双方の ID 断片から成る
        // given (前提条件):
        let a = id("abcdef0123");
        let b = id("9876543210");
        let now = Timestamp::new(42);

        // when (操作):
        let chat = RoomNameFactory::anonymous_pair(QueueKind::Chat, now, &a, &b);
        let video = RoomNameFactory::anonymous_pair(QueueKind::Video, now, &a, &b);

        // then (期待する結果):
        assert_eq!(chat.as_str(), "anon-chat-42-abcde-98765");
        assert_eq!(video.as_str(), "anon-video-42-abcde-98765");
        assert!(chat.is_anonymous_chat());
        assert!(video.is_anonymous() && !video.is_anonymous_chat());
    }

    #[test]
    fn test_alias_number_range() {
        // テスト項目: エイリアスの番号は 1000 から 9999 の範囲
        // given (前提条件) / when (操作):
        let aliases: Vec<AnonAlias> = (0..200).map(|_| AnonAliasFactory::generate()).collect();

        // then (期待する結果):
        for alias in aliases {
            let number: u16 = alias
                .as_str()
                .strip_prefix("Stranger-")
                .and_then(|n| n.parse().ok())
                .expect("alias number");
            assert!((1000..=9999).contains(&number));
        }
    }
}
