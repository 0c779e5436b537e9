//! Frame layout constants and low-level field codecs.
//!
//! Every message on the wire is one fixed 5520-byte frame:
//!
//! ```text
//! ┌───────────┬───────────┬────────────────┐
//! │ type      │ token     │ payload        │
//! │ 4 bytes   │ 512 bytes │ 5004 bytes     │
//! │ i32 LE    │ UTF-8+NUL │ type-specific  │
//! └───────────┴───────────┴────────────────┘
//! ```
//!
//! All multi-byte integers are Little Endian. The tag values and field
//! widths are shared bit-for-bit with the C server; they must never change.

/// Total frame size in bytes (fixed, exactly 5520).
pub const FRAME_SIZE: usize = 5520;

/// Width of the session-token region.
pub const TOKEN_LEN: usize = 512;

/// Width of the type-specific payload region.
pub const MAX_PAYLOAD_SIZE: usize = 5004;

/// Byte offset of the payload region within a frame.
pub const PAYLOAD_OFFSET: usize = 4 + TOKEN_LEN;

/// The closed set of message tags understood by client and server.
///
/// The discriminants travel on the wire as the frame's 4-byte type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MessageType {
    Register = 1,
    Login = 2,
    AuthSuccess = 3,
    AuthFailed = 4,
    JoinQueue = 5,
    LeaveQueue = 6,
    StartGame = 7,
    PlayerMove = 8,
    MoveResult = 9,
    GameOver = 10,
    Chat = 11,
    Logout = 12,
    Ping = 13,
    Pong = 14,
    PlaceShip = 15,
    PlayerReady = 16,
    GetOnlinePlayers = 17,
    OnlinePlayersList = 18,
    ChallengePlayer = 19,
    ChallengeReceived = 20,
    ChallengeAccept = 21,
    ChallengeDecline = 22,
    ChallengeDeclined = 23,
    ChallengeExpired = 24,
    ChallengeCancel = 25,
    ChallengeCancelled = 26,
    AuthToken = 27,
    TurnWarning = 28,
    GameTimeout = 29,
    ChatMessage = 30,
}

impl MessageType {
    /// Map a wire tag to a message type.
    ///
    /// Returns `None` for unmapped tags — the caller drops the frame,
    /// it is not an error escalation.
    pub fn from_wire(tag: i32) -> Option<Self> {
        Some(match tag {
            1 => Self::Register,
            2 => Self::Login,
            3 => Self::AuthSuccess,
            4 => Self::AuthFailed,
            5 => Self::JoinQueue,
            6 => Self::LeaveQueue,
            7 => Self::StartGame,
            8 => Self::PlayerMove,
            9 => Self::MoveResult,
            10 => Self::GameOver,
            11 => Self::Chat,
            12 => Self::Logout,
            13 => Self::Ping,
            14 => Self::Pong,
            15 => Self::PlaceShip,
            16 => Self::PlayerReady,
            17 => Self::GetOnlinePlayers,
            18 => Self::OnlinePlayersList,
            19 => Self::ChallengePlayer,
            20 => Self::ChallengeReceived,
            21 => Self::ChallengeAccept,
            22 => Self::ChallengeDecline,
            23 => Self::ChallengeDeclined,
            24 => Self::ChallengeExpired,
            25 => Self::ChallengeCancel,
            26 => Self::ChallengeCancelled,
            27 => Self::AuthToken,
            28 => Self::TurnWarning,
            29 => Self::GameTimeout,
            30 => Self::ChatMessage,
            _ => return None,
        })
    }

    /// The tag carried in the frame's type field.
    #[inline]
    pub fn to_wire(self) -> i32 {
        self as i32
    }
}

/// Write `value` into a fixed-width NUL-terminated string region.
///
/// The value is truncated at the byte level to `region.len() - 1` bytes
/// (the last byte is always a terminator), then the rest of the region is
/// zero-filled. Byte-level truncation can split a multi-byte UTF-8
/// character; the peer decodes lossily, matching the C server's behavior.
pub(crate) fn put_cstr(region: &mut [u8], value: &str) {
    let cap = region.len() - 1;
    let bytes = value.as_bytes();
    let n = bytes.len().min(cap);
    region[..n].copy_from_slice(&bytes[..n]);
    for b in &mut region[n..] {
        *b = 0;
    }
}

/// Read a fixed-width NUL-terminated string region.
///
/// The logical string ends at the first NUL; a region with no NUL is taken
/// whole. Invalid UTF-8 sequences are replaced, never an error.
pub(crate) fn get_cstr(region: &[u8]) -> String {
    let end = region.iter().position(|&b| b == 0).unwrap_or(region.len());
    String::from_utf8_lossy(&region[..end]).into_owned()
}

#[inline]
pub(crate) fn put_i32(buf: &mut [u8], at: usize, value: i32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn get_i32(buf: &[u8], at: usize) -> i32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    i32::from_le_bytes(b)
}

#[inline]
pub(crate) fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn get_u32(buf: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(b)
}

#[inline]
pub(crate) fn put_i64(buf: &mut [u8], at: usize, value: i64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn get_i64(buf: &[u8], at: usize) -> i64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    i64::from_le_bytes(b)
}
