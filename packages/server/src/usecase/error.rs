//! UseCase 層のエラー型

use thiserror::Error;

/// 接続処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Connection '{0}' is already registered")]
    DuplicateConnectionId(String),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,
}
