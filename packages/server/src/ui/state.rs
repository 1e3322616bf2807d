//! Shared application state handed to every handler.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ChatUseCase, ConnectSessionUseCase, DisconnectSessionUseCase, MatchmakingUseCase,
    PresenceUseCase, RoomUseCase, SignalingUseCase,
};

pub struct AppState {
    /// ConnectSessionUseCase（接続受付のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（切断処理のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// PresenceUseCase（名前登録・招待のユースケース）
    pub presence_usecase: Arc<PresenceUseCase>,
    /// RoomUseCase（通話ルームのユースケース）
    pub room_usecase: Arc<RoomUseCase>,
    /// ChatUseCase（テキストチャットのユースケース）
    pub chat_usecase: Arc<ChatUseCase>,
    /// MatchmakingUseCase（匿名マッチングのユースケース）
    pub matchmaking_usecase: Arc<MatchmakingUseCase>,
    /// SignalingUseCase（シグナリング中継のユースケース）
    pub signaling_usecase: Arc<SignalingUseCase>,
    /// Ping 送信間隔
    pub heartbeat: Duration,
    /// 無通信で切断するまでの時間
    pub idle_timeout: Duration,
}
