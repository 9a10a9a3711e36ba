use serde::{Deserialize, Serialize};

/// Server-assigned identity id. Immutable once issued.
pub type IdentityId = i64;

/// Side length of every grid. Coordinates live in `0..GRID_SIZE`.
pub const GRID_SIZE: i64 = 4;

/// Whether `(x, y)` addresses a cell on a grid.
pub fn in_bounds(x: i64, y: i64) -> bool {
    (0..GRID_SIZE).contains(&x) && (0..GRID_SIZE).contains(&y)
}

/// Every cell of a grid in row-major order.
pub fn grid_cells() -> impl Iterator<Item = (i64, i64)> {
    (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| (x, y)))
}

/// What a live-channel hint is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    TileChanged,
    MessageChanged,
}

/// An invalidation hint pushed over the live channel.
///
/// It carries no content. Receivers re-fetch the addressed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub owner_id: IdentityId,
    pub x: i64,
    pub y: i64,
    pub actor_id: IdentityId,
}

/// One identity's view of its contact edges.
///
/// `contacts` are mutually authorized, `pending` are outgoing requests
/// and `incoming` are requests awaiting this identity's accept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactList {
    pub user_id: IdentityId,
    pub contacts: Vec<IdentityId>,
    pub pending: Vec<IdentityId>,
    pub incoming: Vec<IdentityId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(in_bounds(0, 0));
        assert!(in_bounds(3, 3));
        assert!(!in_bounds(-1, 0));
        assert!(!in_bounds(0, -1));
        assert!(!in_bounds(4, 0));
        assert!(!in_bounds(0, 4));
    }

    #[test]
    fn test_grid_cells_cover_grid() {
        let cells: Vec<_> = grid_cells().collect();
        assert_eq!(cells.len(), 16);
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[1], (1, 0));
        assert_eq!(cells[15], (3, 3));
    }

    #[test]
    fn test_change_event_wire_shape() {
        let event = ChangeEvent {
            kind: ChangeKind::MessageChanged,
            owner_id: 1,
            x: 2,
            y: 3,
            actor_id: 4,
        };
        let value = serde_json::to_value(event).unwrap();
        assert_eq!(value["kind"], "message_changed");
        assert_eq!(value["owner_id"], 1);
        assert_eq!(value["actor_id"], 4);
    }
}
