use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit state of one port's lines.
pub type RegisterValue = u8;

/// Width of a register in bits.
pub const REGISTER_WIDTH: u32 = RegisterValue::BITS;

/// The seven register groups of a GPIO port, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegisterGroup {
    Output,
    Input,
    Direction,
    OutputSet,
    OutputClear,
    DirectionSet,
    DirectionClear,
}

impl RegisterGroup {
    pub const COUNT: usize = 7;

    pub const ALL: [RegisterGroup; RegisterGroup::COUNT] = [
        RegisterGroup::Output,
        RegisterGroup::Input,
        RegisterGroup::Direction,
        RegisterGroup::OutputSet,
        RegisterGroup::OutputClear,
        RegisterGroup::DirectionSet,
        RegisterGroup::DirectionClear,
    ];

    /// Position of the group in the flat register layout.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Set/clear groups are write-only commands consumed by the next tick.
    pub fn is_one_shot(self) -> bool {
        matches!(
            self,
            RegisterGroup::OutputSet
                | RegisterGroup::OutputClear
                | RegisterGroup::DirectionSet
                | RegisterGroup::DirectionClear
        )
    }

    pub fn to_str(self) -> &'static str {
        match self {
            RegisterGroup::Output => "Output",
            RegisterGroup::Input => "Input",
            RegisterGroup::Direction => "Direction",
            RegisterGroup::OutputSet => "OutputSet",
            RegisterGroup::OutputClear => "OutputClear",
            RegisterGroup::DirectionSet => "DirectionSet",
            RegisterGroup::DirectionClear => "DirectionClear",
        }
    }
}

impl fmt::Display for RegisterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A port index validated against the bank that issued it.
///
/// The handle remembers which bank issued it; banks reject handles they did
/// not issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    bank: u64,
    index: usize,
}

impl PortId {
    pub(crate) fn new(bank: u64, index: usize) -> Self {
        PortId { bank, index }
    }

    pub(crate) fn bank(&self) -> u64 {
        self.bank
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.index)
    }
}

/// A flat register index validated against the bank that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterId {
    bank: u64,
    index: usize,
}

impl RegisterId {
    pub(crate) fn new(bank: u64, index: usize) -> Self {
        RegisterId { bank, index }
    }

    pub(crate) fn bank(&self) -> u64 {
        self.bank
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.index)
    }
}

impl From<RegisterId> for usize {
    fn from(id: RegisterId) -> Self {
        id.index()
    }
}
