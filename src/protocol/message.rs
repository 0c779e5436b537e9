//! Typed messages and the frame codec.
//!
//! [`Message`] is the closed tagged union of everything that can travel on
//! the wire — one variant per [`MessageType`] tag. [`encode_frame`] and
//! [`decode_frame`] convert between a `Message` and the fixed 5520-byte
//! frame through a single exhaustive match per direction, so adding a tag
//! is a compile-checked, localized change.
//!
//! The codec is pure: no I/O, no state. Both directions are implemented for
//! every variant (server-sent shapes also encode) so tests can fabricate
//! peer frames.
//!
//! # Example
//!
//! ```
//! use flotilla_client::protocol::{decode_frame, encode_frame, Message};
//!
//! let msg = Message::PlayerMove {
//!     game_id: "g-42".into(),
//!     row: 3,
//!     col: 7,
//! };
//! let frame = encode_frame(&msg, "session-token").unwrap();
//! assert_eq!(frame.len(), 5520);
//!
//! let decoded = decode_frame(&frame).unwrap();
//! assert_eq!(decoded.token, "session-token");
//! assert_eq!(decoded.message, msg);
//! ```

use bytes::{Bytes, BytesMut};

use crate::error::{ClientError, Result};

use super::board::BOARD_CELLS;
use super::wire::{
    get_cstr, get_i32, get_i64, get_u32, put_cstr, put_i32, put_i64, put_u32, MessageType,
    FRAME_SIZE, MAX_PAYLOAD_SIZE, PAYLOAD_OFFSET, TOKEN_LEN,
};

/// Wire capacity of the online-players roster (fixed slot count).
pub const MAX_ROSTER: usize = 50;

/// One roster entry from an OnlinePlayersList frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub username: String,
    pub elo_rating: i32,
    pub rank: String,
}

/// A decoded frame: session token region plus the typed message.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Token region, lossily decoded with padding stripped. Empty when the
    /// region was all zeros.
    pub token: String,
    pub message: Message,
}

/// Every logical message exchanged with the server.
///
/// String fields live in fixed-width NUL-terminated regions; the width caps
/// below are byte budgets, and values over budget are truncated on encode
/// (the protocol's explicit policy — see [`super::wire::put_cstr`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Create an account. Username/password capped at 31 bytes each.
    Register { username: String, password: String },
    /// Authenticate. Same field budgets as `Register`.
    Login { username: String, password: String },
    /// Server: authentication accepted.
    AuthSuccess { username: String },
    /// Server: authentication rejected.
    AuthFailed { reason: String },
    /// Enter the matchmaking queue.
    JoinQueue,
    /// Leave the matchmaking queue.
    LeaveQueue,
    /// Server: a match begins. `current_turn` names the player to move
    /// first and is authoritative.
    StartGame {
        opponent: String,
        game_id: String,
        current_turn: String,
    },
    /// Fire at a cell.
    PlayerMove { game_id: String, row: i32, col: i32 },
    /// Server: outcome of a shot. `is_your_shot` is the server's word on
    /// whose shot this reports; the client derives no turn state itself.
    MoveResult {
        row: i32,
        col: i32,
        is_hit: bool,
        is_sunk: bool,
        sunk_ship_type: u32,
        game_over: bool,
        is_your_shot: bool,
    },
    /// Server: the game has ended.
    GameOver,
    /// Send a chat line into a game. Message capped at 127 bytes.
    Chat { game_id: String, message: String },
    /// End the session.
    Logout,
    /// Keep-alive probe.
    Ping,
    /// Server: keep-alive reply.
    Pong,
    /// Place one ship during setup.
    PlaceShip {
        ship_type: i32,
        row: i32,
        col: i32,
        is_horizontal: bool,
    },
    /// Signal placement done, carrying the full board snapshot
    /// (one byte per cell, row-major).
    PlayerReady {
        game_id: String,
        board: [u8; BOARD_CELLS],
    },
    /// Ask for the online-player roster.
    GetOnlinePlayers,
    /// Server: the roster. `count` is the server's figure; `players` holds
    /// at most [`MAX_ROSTER`] entries (the wire array is fixed at 50 slots).
    OnlinePlayersList { count: i32, players: Vec<PlayerInfo> },
    /// Challenge a specific player. The challenger and challenge-id regions
    /// of the payload are left zeroed for the server to fill.
    ChallengePlayer {
        target_id: String,
        game_mode: String,
        time_control: i32,
    },
    /// Server: someone challenged you.
    ChallengeReceived {
        challenger_username: String,
        challenger_id: String,
        challenge_id: String,
        game_mode: String,
        time_control: i32,
        expires_at: i64,
    },
    /// Accept a pending challenge.
    ChallengeAccept { challenge_id: String },
    /// Decline a pending challenge.
    ChallengeDecline { challenge_id: String },
    /// Server: your challenge was declined.
    ChallengeDeclined { challenge_id: String },
    /// Server: a challenge expired unanswered.
    ChallengeExpired,
    /// Withdraw a challenge you issued.
    ChallengeCancel { challenge_id: String },
    /// Server: a challenge was withdrawn.
    ChallengeCancelled,
    /// Server: session credential to present in future frames.
    AuthToken { token: String },
    /// Server: turn clock warning.
    TurnWarning { seconds_remaining: i32 },
    /// Server: a game ended on the clock.
    GameTimeout {
        winner_id: String,
        loser_id: String,
        reason: String,
    },
    /// Server: a chat line from another player.
    ChatMessage { username: String, text: String },
}

impl Message {
    /// The wire tag for this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Register { .. } => MessageType::Register,
            Message::Login { .. } => MessageType::Login,
            Message::AuthSuccess { .. } => MessageType::AuthSuccess,
            Message::AuthFailed { .. } => MessageType::AuthFailed,
            Message::JoinQueue => MessageType::JoinQueue,
            Message::LeaveQueue => MessageType::LeaveQueue,
            Message::StartGame { .. } => MessageType::StartGame,
            Message::PlayerMove { .. } => MessageType::PlayerMove,
            Message::MoveResult { .. } => MessageType::MoveResult,
            Message::GameOver => MessageType::GameOver,
            Message::Chat { .. } => MessageType::Chat,
            Message::Logout => MessageType::Logout,
            Message::Ping => MessageType::Ping,
            Message::Pong => MessageType::Pong,
            Message::PlaceShip { .. } => MessageType::PlaceShip,
            Message::PlayerReady { .. } => MessageType::PlayerReady,
            Message::GetOnlinePlayers => MessageType::GetOnlinePlayers,
            Message::OnlinePlayersList { .. } => MessageType::OnlinePlayersList,
            Message::ChallengePlayer { .. } => MessageType::ChallengePlayer,
            Message::ChallengeReceived { .. } => MessageType::ChallengeReceived,
            Message::ChallengeAccept { .. } => MessageType::ChallengeAccept,
            Message::ChallengeDecline { .. } => MessageType::ChallengeDecline,
            Message::ChallengeDeclined { .. } => MessageType::ChallengeDeclined,
            Message::ChallengeExpired => MessageType::ChallengeExpired,
            Message::ChallengeCancel { .. } => MessageType::ChallengeCancel,
            Message::ChallengeCancelled => MessageType::ChallengeCancelled,
            Message::AuthToken { .. } => MessageType::AuthToken,
            Message::TurnWarning { .. } => MessageType::TurnWarning,
            Message::GameTimeout { .. } => MessageType::GameTimeout,
            Message::ChatMessage { .. } => MessageType::ChatMessage,
        }
    }

    /// Serialize this message's payload into the (pre-zeroed) payload region.
    fn encode_payload(&self, p: &mut [u8]) -> Result<()> {
        debug_assert_eq!(p.len(), MAX_PAYLOAD_SIZE);
        match self {
            Message::Register { username, password } | Message::Login { username, password } => {
                put_cstr(&mut p[0..32], username);
                put_cstr(&mut p[32..64], password);
            }
            Message::AuthSuccess { username } => {
                put_cstr(&mut p[0..32], username);
            }
            Message::AuthFailed { reason } => {
                put_cstr(&mut p[0..64], reason);
            }
            Message::StartGame {
                opponent,
                game_id,
                current_turn,
            } => {
                put_cstr(&mut p[0..32], opponent);
                put_cstr(&mut p[32..96], game_id);
                put_cstr(&mut p[96..128], current_turn);
            }
            Message::PlayerMove { game_id, row, col } => {
                put_cstr(&mut p[0..65], game_id);
                put_i32(p, 65, *row);
                put_i32(p, 69, *col);
            }
            Message::MoveResult {
                row,
                col,
                is_hit,
                is_sunk,
                sunk_ship_type,
                game_over,
                is_your_shot,
            } => {
                put_i32(p, 0, *row);
                put_i32(p, 4, *col);
                p[8] = *is_hit as u8;
                p[9] = *is_sunk as u8;
                put_u32(p, 10, *sunk_ship_type);
                p[14] = *game_over as u8;
                p[15] = *is_your_shot as u8;
            }
            Message::Chat { game_id, message } => {
                put_cstr(&mut p[0..64], game_id);
                put_cstr(&mut p[64..192], message);
            }
            Message::PlaceShip {
                ship_type,
                row,
                col,
                is_horizontal,
            } => {
                put_i32(p, 0, *ship_type);
                put_i32(p, 4, *row);
                put_i32(p, 8, *col);
                p[12] = *is_horizontal as u8;
                // bytes 13..16 are alignment padding, already zero
            }
            Message::PlayerReady { game_id, board } => {
                put_cstr(&mut p[0..65], game_id);
                p[65..65 + BOARD_CELLS].copy_from_slice(board);
            }
            Message::OnlinePlayersList { count, players } => {
                if players.len() > MAX_ROSTER {
                    // Width the roster would need without the 50-slot cap.
                    return Err(ClientError::PayloadTooLarge {
                        len: 4 + players.len() * (64 + 4 + 32),
                        max: MAX_PAYLOAD_SIZE,
                    });
                }
                put_i32(p, 0, *count);
                for (i, player) in players.iter().enumerate() {
                    let name_at = 4 + i * 64;
                    put_cstr(&mut p[name_at..name_at + 64], &player.username);
                    put_i32(p, 3204 + i * 4, player.elo_rating);
                    let rank_at = 3404 + i * 32;
                    put_cstr(&mut p[rank_at..rank_at + 32], &player.rank);
                }
            }
            Message::ChallengePlayer {
                target_id,
                game_mode,
                time_control,
            } => {
                // p[0..64] challenger id: server fills.
                put_cstr(&mut p[64..128], target_id);
                // p[128..193] challenge id: server generates.
                put_cstr(&mut p[193..225], game_mode);
                put_i32(p, 225, *time_control);
            }
            Message::ChallengeReceived {
                challenger_username,
                challenger_id,
                challenge_id,
                game_mode,
                time_control,
                expires_at,
            } => {
                put_cstr(&mut p[0..64], challenger_username);
                put_cstr(&mut p[64..128], challenger_id);
                put_cstr(&mut p[128..193], challenge_id);
                put_cstr(&mut p[193..225], game_mode);
                put_i32(p, 225, *time_control);
                put_i64(p, 229, *expires_at);
            }
            Message::ChallengeAccept { challenge_id }
            | Message::ChallengeDecline { challenge_id }
            | Message::ChallengeDeclined { challenge_id }
            | Message::ChallengeCancel { challenge_id } => {
                put_cstr(&mut p[0..65], challenge_id);
            }
            Message::AuthToken { token } => {
                put_cstr(&mut p[0..512], token);
            }
            Message::TurnWarning { seconds_remaining } => {
                put_i32(p, 0, *seconds_remaining);
            }
            Message::GameTimeout {
                winner_id,
                loser_id,
                reason,
            } => {
                put_cstr(&mut p[0..64], winner_id);
                put_cstr(&mut p[64..128], loser_id);
                put_cstr(&mut p[128..192], reason);
            }
            Message::ChatMessage { username, text } => {
                put_cstr(&mut p[0..64], username);
                put_cstr(&mut p[64..192], text);
            }
            // Empty-payload set: the whole region is padding.
            Message::JoinQueue
            | Message::LeaveQueue
            | Message::GameOver
            | Message::Logout
            | Message::Ping
            | Message::Pong
            | Message::GetOnlinePlayers
            | Message::ChallengeExpired
            | Message::ChallengeCancelled => {}
        }
        Ok(())
    }

    /// Deserialize a payload region for a known tag.
    ///
    /// Infallible: the region is width-checked by [`decode_frame`], string
    /// decoding is lossy, and numeric fields read fixed offsets.
    fn decode_payload(ty: MessageType, p: &[u8]) -> Message {
        debug_assert_eq!(p.len(), MAX_PAYLOAD_SIZE);
        match ty {
            MessageType::Register => Message::Register {
                username: get_cstr(&p[0..32]),
                password: get_cstr(&p[32..64]),
            },
            MessageType::Login => Message::Login {
                username: get_cstr(&p[0..32]),
                password: get_cstr(&p[32..64]),
            },
            MessageType::AuthSuccess => Message::AuthSuccess {
                username: get_cstr(&p[0..32]),
            },
            MessageType::AuthFailed => Message::AuthFailed {
                reason: get_cstr(&p[0..64]),
            },
            MessageType::JoinQueue => Message::JoinQueue,
            MessageType::LeaveQueue => Message::LeaveQueue,
            MessageType::StartGame => Message::StartGame {
                opponent: get_cstr(&p[0..32]),
                game_id: get_cstr(&p[32..96]),
                current_turn: get_cstr(&p[96..128]),
            },
            MessageType::PlayerMove => Message::PlayerMove {
                game_id: get_cstr(&p[0..65]),
                row: get_i32(p, 65),
                col: get_i32(p, 69),
            },
            MessageType::MoveResult => Message::MoveResult {
                row: get_i32(p, 0),
                col: get_i32(p, 4),
                is_hit: p[8] != 0,
                is_sunk: p[9] != 0,
                sunk_ship_type: get_u32(p, 10),
                game_over: p[14] != 0,
                is_your_shot: p[15] != 0,
            },
            MessageType::GameOver => Message::GameOver,
            MessageType::Chat => Message::Chat {
                game_id: get_cstr(&p[0..64]),
                message: get_cstr(&p[64..192]),
            },
            MessageType::Logout => Message::Logout,
            MessageType::Ping => Message::Ping,
            MessageType::Pong => Message::Pong,
            MessageType::PlaceShip => Message::PlaceShip {
                ship_type: get_i32(p, 0),
                row: get_i32(p, 4),
                col: get_i32(p, 8),
                is_horizontal: p[12] != 0,
            },
            MessageType::PlayerReady => {
                let mut board = [0u8; BOARD_CELLS];
                board.copy_from_slice(&p[65..65 + BOARD_CELLS]);
                Message::PlayerReady {
                    game_id: get_cstr(&p[0..65]),
                    board,
                }
            }
            MessageType::GetOnlinePlayers => Message::GetOnlinePlayers,
            MessageType::OnlinePlayersList => {
                let count = get_i32(p, 0);
                // The wire array holds exactly 50 slots; the server's count
                // is reported as-is but only physically-present entries are
                // materialized.
                let take = count.clamp(0, MAX_ROSTER as i32) as usize;
                let players = (0..take)
                    .map(|i| {
                        let name_at = 4 + i * 64;
                        let rank_at = 3404 + i * 32;
                        PlayerInfo {
                            username: get_cstr(&p[name_at..name_at + 64]),
                            elo_rating: get_i32(p, 3204 + i * 4),
                            rank: get_cstr(&p[rank_at..rank_at + 32]),
                        }
                    })
                    .collect();
                Message::OnlinePlayersList { count, players }
            }
            MessageType::ChallengePlayer => Message::ChallengePlayer {
                target_id: get_cstr(&p[64..128]),
                game_mode: get_cstr(&p[193..225]),
                time_control: get_i32(p, 225),
            },
            MessageType::ChallengeReceived => Message::ChallengeReceived {
                challenger_username: get_cstr(&p[0..64]),
                challenger_id: get_cstr(&p[64..128]),
                challenge_id: get_cstr(&p[128..193]),
                game_mode: get_cstr(&p[193..225]),
                time_control: get_i32(p, 225),
                expires_at: get_i64(p, 229),
            },
            MessageType::ChallengeAccept => Message::ChallengeAccept {
                challenge_id: get_cstr(&p[0..65]),
            },
            MessageType::ChallengeDecline => Message::ChallengeDecline {
                challenge_id: get_cstr(&p[0..65]),
            },
            MessageType::ChallengeDeclined => Message::ChallengeDeclined {
                challenge_id: get_cstr(&p[0..65]),
            },
            MessageType::ChallengeExpired => Message::ChallengeExpired,
            MessageType::ChallengeCancel => Message::ChallengeCancel {
                challenge_id: get_cstr(&p[0..65]),
            },
            MessageType::ChallengeCancelled => Message::ChallengeCancelled,
            MessageType::AuthToken => Message::AuthToken {
                token: get_cstr(&p[0..512]),
            },
            MessageType::TurnWarning => Message::TurnWarning {
                seconds_remaining: get_i32(p, 0),
            },
            MessageType::GameTimeout => Message::GameTimeout {
                winner_id: get_cstr(&p[0..64]),
                loser_id: get_cstr(&p[64..128]),
                reason: get_cstr(&p[128..192]),
            },
            MessageType::ChatMessage => Message::ChatMessage {
                username: get_cstr(&p[0..64]),
                text: get_cstr(&p[64..192]),
            },
        }
    }
}

/// Encode a message into one complete frame.
///
/// The result is always exactly [`FRAME_SIZE`] bytes. The token is capped
/// at [`TOKEN_LEN`] bytes (all 512 usable, no terminator required); an
/// empty token encodes as an all-zero region.
pub fn encode_frame(message: &Message, token: &str) -> Result<Bytes> {
    let mut frame = BytesMut::zeroed(FRAME_SIZE);

    frame[0..4].copy_from_slice(&message.message_type().to_wire().to_le_bytes());

    let token_bytes = token.as_bytes();
    let n = token_bytes.len().min(TOKEN_LEN);
    frame[4..4 + n].copy_from_slice(&token_bytes[..n]);

    message.encode_payload(&mut frame[PAYLOAD_OFFSET..])?;

    Ok(frame.freeze())
}

/// Decode one complete frame.
///
/// # Errors
///
/// - [`ClientError::BadFrameLength`] if `data` is not exactly
///   [`FRAME_SIZE`] bytes.
/// - [`ClientError::UnknownMessageType`] if the type field carries an
///   unmapped tag.
///
/// Both are per-frame conditions: callers drop the frame and keep reading.
pub fn decode_frame(data: &[u8]) -> Result<DecodedFrame> {
    if data.len() != FRAME_SIZE {
        return Err(ClientError::BadFrameLength(data.len()));
    }

    let tag = get_i32(data, 0);
    let ty = MessageType::from_wire(tag).ok_or(ClientError::UnknownMessageType(tag))?;

    let token = get_cstr(&data[4..4 + TOKEN_LEN]);
    let message = Message::decode_payload(ty, &data[PAYLOAD_OFFSET..]);

    Ok(DecodedFrame { token, message })
}
