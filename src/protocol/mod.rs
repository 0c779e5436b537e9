//! Wire protocol: frame layout, typed messages, and stream re-assembly.

pub mod board;
mod frame_buffer;
mod message;
mod wire;

pub use board::{CellState, ShipType, BOARD_CELLS, GRID_SIZE};
pub use frame_buffer::FrameBuffer;
pub use message::{decode_frame, encode_frame, DecodedFrame, Message, PlayerInfo, MAX_ROSTER};
pub use wire::{MessageType, FRAME_SIZE, MAX_PAYLOAD_SIZE, PAYLOAD_OFFSET, TOKEN_LEN};
