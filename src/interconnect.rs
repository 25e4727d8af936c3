use std::fmt;

use crate::register_bank::RegisterBank;
use crate::types::{RegisterId, RegisterValue};

/// Mirrors the all-set state of `input_mask` in `input` onto `output_mask`
/// in `output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitLink {
    pub input: RegisterId,
    pub input_mask: RegisterValue,
    pub output: RegisterId,
    pub output_mask: RegisterValue,
}

impl BitLink {
    /// Whether every bit of the input mask is set in `snapshot`.
    pub fn is_asserted(&self, snapshot: &[RegisterValue]) -> bool {
        snapshot[self.input.index()] & self.input_mask == self.input_mask
    }

    fn apply(&self, snapshot: &[RegisterValue], bank: &mut RegisterBank) {
        let current = bank.read_register(self.output);
        let next = if self.is_asserted(snapshot) {
            current | self.output_mask
        } else {
            current & !self.output_mask
        };
        bank.write_register(self.output, next);
    }
}

impl fmt::Display for BitLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BitLink {}&0b{:08b} -> {}&0b{:08b}",
            self.input, self.input_mask, self.output, self.output_mask
        )
    }
}

/// A wiring rule between registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterconnectRule {
    BitLink(BitLink),
}

impl InterconnectRule {
    pub fn apply(&self, snapshot: &[RegisterValue], bank: &mut RegisterBank) {
        match self {
            InterconnectRule::BitLink(link) => link.apply(snapshot, bank),
        }
    }

    pub fn input(&self) -> RegisterId {
        match self {
            InterconnectRule::BitLink(link) => link.input,
        }
    }

    pub fn output(&self) -> RegisterId {
        match self {
            InterconnectRule::BitLink(link) => link.output,
        }
    }
}

impl From<BitLink> for InterconnectRule {
    fn from(link: BitLink) -> Self {
        InterconnectRule::BitLink(link)
    }
}

impl fmt::Display for InterconnectRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterconnectRule::BitLink(link) => fmt::Display::fmt(link, f),
        }
    }
}

/// Ordered, append-only collection of wiring rules.
#[derive(Debug, Default)]
pub struct Interconnect {
    rules: Vec<InterconnectRule>,
    /// Register values as of the start of the current evaluation, kept
    /// between calls so its allocation is reused.
    snapshot: Vec<RegisterValue>,
}

impl Interconnect {
    pub fn new() -> Self {
        Interconnect {
            rules: Vec::new(),
            snapshot: Vec::new(),
        }
    }

    pub fn push(&mut self, rule: impl Into<InterconnectRule>) {
        self.rules.push(rule.into());
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[InterconnectRule] {
        &self.rules
    }

    /// Apply every rule once, in insertion order.
    ///
    /// Conditions are read from a snapshot taken before the first rule runs,
    /// so a rule's output only reaches rules reading it on the next call.
    pub fn evaluate(&mut self, bank: &mut RegisterBank) {
        if self.rules.is_empty() {
            return;
        }

        self.snapshot.clear();
        self.snapshot.extend_from_slice(bank.values());
        for rule in &self.rules {
            rule.apply(&self.snapshot, bank);
        }
    }
}
