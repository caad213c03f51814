//! Deterministic generation of the fixed slot layout.

use serde::{Deserialize, Serialize};

/// Stacking tiers within one slot column, top to bottom.
pub const TIERS: [&str; 3] = ["T", "M", "B"];

/// One rectangular block of the warehouse floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneBlock {
    pub prefix: String,
    pub zone: String,
    pub rows: u32,
    pub cols: u32,
}

impl ZoneBlock {
    pub fn new(prefix: &str, zone: &str, rows: u32, cols: u32) -> Self {
        Self {
            prefix: prefix.to_string(),
            zone: zone.to_string(),
            rows,
            cols,
        }
    }
}

/// One generated slot, ready to be inserted into the location directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub label: String,
    pub zone: String,
    pub row_index: i64,
    pub col_index: i64,
    pub tier: String,
}

/// The as-built floor plan: Center 25x5, East Wall 23x2, West Wall 24x3,
/// three tiers everywhere.
pub fn default_blocks() -> Vec<ZoneBlock> {
    vec![
        ZoneBlock::new("C", "Center", 25, 5),
        ZoneBlock::new("E", "East Wall", 23, 2),
        ZoneBlock::new("W", "West Wall", 24, 3),
    ]
}

/// Emits every slot of every block, row-major, tiers innermost. Labels are
/// `{prefix}-R{row}-C{col}-{tier}` and unique across blocks.
pub fn generate_layout(blocks: &[ZoneBlock], tiers: &[&str]) -> Vec<SlotSpec> {
    let mut slots = Vec::new();
    for block in blocks {
        for row in 1..=block.rows {
            for col in 1..=block.cols {
                for tier in tiers {
                    slots.push(SlotSpec {
                        label: format!("{}-R{}-C{}-{}", block.prefix, row, col, tier),
                        zone: block.zone.clone(),
                        row_index: i64::from(row),
                        col_index: i64::from(col),
                        tier: (*tier).to_string(),
                    });
                }
            }
        }
    }
    slots
}
