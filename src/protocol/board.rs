//! Board geometry and cell encoding shared with the server.
//!
//! The PlayerReady payload carries the whole board as one byte per cell,
//! row-major; PlaceShip identifies ships by the `ShipType` discriminants.

/// Board side length in cells.
pub const GRID_SIZE: usize = 10;

/// Cells in a board snapshot (one byte each on the wire).
pub const BOARD_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// State of one board cell, as encoded in a PlayerReady snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CellState {
    Empty = 0,
    Ship = 1,
    Hit = 2,
    Miss = 3,
}

/// Ship identifiers, as carried in PlaceShip and MoveResult payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ShipType {
    PatrolBoat = 1,
    Submarine = 2,
    Destroyer = 3,
    Battleship = 4,
    Carrier = 5,
}

impl ShipType {
    /// Length of the ship in cells.
    pub fn length(self) -> usize {
        match self {
            Self::PatrolBoat => 2,
            Self::Submarine | Self::Destroyer => 3,
            Self::Battleship => 4,
            Self::Carrier => 5,
        }
    }

    /// Map a wire value to a ship type.
    pub fn from_wire(value: i32) -> Option<Self> {
        Some(match value {
            1 => Self::PatrolBoat,
            2 => Self::Submarine,
            3 => Self::Destroyer,
            4 => Self::Battleship,
            5 => Self::Carrier,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_is_100_cells() {
        assert_eq!(BOARD_CELLS, 100);
    }

    #[test]
    fn test_ship_lengths() {
        assert_eq!(ShipType::PatrolBoat.length(), 2);
        assert_eq!(ShipType::Submarine.length(), 3);
        assert_eq!(ShipType::Destroyer.length(), 3);
        assert_eq!(ShipType::Battleship.length(), 4);
        assert_eq!(ShipType::Carrier.length(), 5);
    }

    #[test]
    fn test_ship_type_from_wire() {
        for v in 1..=5 {
            assert_eq!(ShipType::from_wire(v).unwrap() as i32, v);
        }
        assert!(ShipType::from_wire(0).is_none());
        assert!(ShipType::from_wire(6).is_none());
    }
}
