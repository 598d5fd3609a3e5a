//! World-facing collaborator types.
//!
//! The resolver never touches world storage. The host implements
//! [`BlockQuery`] and answers three questions about a position: which block
//! is there, does it let power through, and does it have an inventory.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Sub};

use arcanum_core::id::{BlockId, ItemId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A block position, or an offset between two positions.
///
/// Arithmetic wraps at the `i32` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl Add for BlockPos {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.x.wrapping_add(other.x),
            self.y.wrapping_add(other.y),
            self.z.wrapping_add(other.z),
        )
    }
}

impl Sub for BlockPos {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(
            self.x.wrapping_sub(other.x),
            self.y.wrapping_sub(other.y),
            self.z.wrapping_sub(other.z),
        )
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Block state
// ---------------------------------------------------------------------------

/// The value of one block state property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i32),
    Name(String),
}

impl StateValue {
    /// Numeric value, for integer properties only.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Name(value) => f.write_str(value),
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

/// One concrete block: its type plus its state properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(default)]
    pub state: BTreeMap<String, StateValue>,
}

impl Block {
    pub fn new(id: impl Into<BlockId>) -> Self {
        Self {
            id: id.into(),
            state: BTreeMap::new(),
        }
    }

    /// Builder-style state assignment.
    pub fn with_state(mut self, property: &str, value: impl Into<StateValue>) -> Self {
        self.state.insert(property.to_string(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&StateValue> {
        self.state.get(name)
    }
}

// ---------------------------------------------------------------------------
// Inventories
// ---------------------------------------------------------------------------

/// A stack of items in one inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<ItemId>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// Read-only view of a container attached to a block.
pub trait Inventory {
    fn slot_count(&self) -> usize;

    /// The stack in `slot`, or `None` if the slot is empty.
    fn slot(&self, slot: usize) -> Option<&ItemStack>;
}

impl Inventory for [ItemStack] {
    fn slot_count(&self) -> usize {
        self.len()
    }

    fn slot(&self, slot: usize) -> Option<&ItemStack> {
        self.get(slot).filter(|stack| stack.count > 0)
    }
}

impl Inventory for Vec<ItemStack> {
    fn slot_count(&self) -> usize {
        self.len()
    }

    fn slot(&self, slot: usize) -> Option<&ItemStack> {
        self.as_slice().slot(slot)
    }
}

impl Inventory for [Option<ItemStack>] {
    fn slot_count(&self) -> usize {
        self.len()
    }

    fn slot(&self, slot: usize) -> Option<&ItemStack> {
        self.get(slot)?.as_ref().filter(|stack| stack.count > 0)
    }
}

// ---------------------------------------------------------------------------
// World query
// ---------------------------------------------------------------------------

/// Host-provided view of the world around an anchor.
pub trait BlockQuery {
    /// The block at `pos`, or `None` for air or unloaded positions.
    fn block_at(&self, pos: BlockPos) -> Option<&Block>;

    /// Whether the block at `pos` lets power pass from a provider behind it.
    fn transmits_power(&self, pos: BlockPos) -> bool;

    /// The container attached to the block at `pos`, if any.
    fn inventory_at(&self, pos: BlockPos) -> Option<&dyn Inventory>;
}
