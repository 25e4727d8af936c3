//! # Wiring Directives
//!
//! Setup-time text instructions that declare connections between registers.
//!
//! ## Grammar
//!
//! A directive is a sequence of whitespace-separated tokens. The first token
//! is the verb, the rest are non-negative integers written in decimal or with
//! a `0x`/`0b` prefix.
//!
//! ```text
//! BitLink <input register> <input mask> <output register> <output mask>
//! ```
//!
//! Register ids are flat indices into the register bank. Masks must fit the
//! register width.
//!
//! ## Usage
//!
//! ```rust
//! use gpio_mock::directive::{Directive, DirectiveBuilder, DirectiveKind};
//!
//! let text = DirectiveBuilder::new(DirectiveKind::BitLink)
//!     .reg(0usize)
//!     .bit(0)
//!     .reg(3usize)
//!     .bit(2)
//!     .to_string();
//! assert_eq!(text, "BitLink 0 1 3 4");
//!
//! let directive: Directive = text.parse().unwrap();
//! assert_eq!(directive.kind(), DirectiveKind::BitLink);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::string_hash::string_hash;
use crate::types::{RegisterValue, REGISTER_WIDTH};

const BIT_LINK_VERB: &str = "BitLink";
const BIT_LINK_HASH: u32 = string_hash(BIT_LINK_VERB);

/// The closed set of directive verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    BitLink,
}

impl DirectiveKind {
    pub fn verb(self) -> &'static str {
        match self {
            DirectiveKind::BitLink => BIT_LINK_VERB,
        }
    }

    /// Number of integer arguments following the verb.
    pub fn arity(self) -> usize {
        match self {
            DirectiveKind::BitLink => 4,
        }
    }

    /// Resolve a verb token. The hash picks the candidate and a string
    /// comparison confirms it, so colliding tokens are never misrouted.
    pub fn from_verb(token: &str) -> Option<Self> {
        match string_hash(token) {
            BIT_LINK_HASH if token == BIT_LINK_VERB => Some(DirectiveKind::BitLink),
            _ => None,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// A parsed directive. Register ids are raw flat indices; they are checked
/// against a bank when the directive is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    BitLink {
        input: usize,
        input_mask: RegisterValue,
        output: usize,
        output_mask: RegisterValue,
    },
}

impl Directive {
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (verb, args) = match tokens.split_first() {
            Some((verb, args)) => (*verb, args),
            None => return Err(CoreError::malformed(text, "empty directive")),
        };

        let kind = DirectiveKind::from_verb(verb).ok_or_else(|| CoreError::UnrecognizedDirective {
            verb: verb.to_string(),
        })?;

        if args.len() != kind.arity() {
            return Err(CoreError::malformed(
                text,
                format!(
                    "{} expects {} arguments, got {}",
                    kind,
                    kind.arity(),
                    args.len()
                ),
            ));
        }

        match kind {
            DirectiveKind::BitLink => Ok(Directive::BitLink {
                input: parse_register(text, args[0])?,
                input_mask: parse_mask(text, args[1])?,
                output: parse_register(text, args[2])?,
                output_mask: parse_mask(text, args[3])?,
            }),
        }
    }

    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::BitLink { .. } => DirectiveKind::BitLink,
        }
    }
}

impl FromStr for Directive {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Directive::parse(s)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::BitLink {
                input,
                input_mask,
                output,
                output_mask,
            } => write!(
                f,
                "{} {} {} {} {}",
                DirectiveKind::BitLink,
                input,
                input_mask,
                output,
                output_mask
            ),
        }
    }
}

fn parse_number(text: &str, token: &str) -> Result<u64> {
    let (digits, radix) = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = token
        .strip_prefix("0b")
        .or_else(|| token.strip_prefix("0B"))
    {
        (bin, 2)
    } else {
        (token, 10)
    };

    // from_str_radix accepts a leading '+', the grammar does not.
    if digits.is_empty() || digits.starts_with('+') {
        return Err(CoreError::malformed(
            text,
            format!("'{}' is not a non-negative integer", token),
        ));
    }

    u64::from_str_radix(digits, radix).map_err(|e| {
        CoreError::malformed(
            text,
            format!("'{}' is not a non-negative integer: {}", token, e),
        )
    })
}

fn parse_register(text: &str, token: &str) -> Result<usize> {
    let value = parse_number(text, token)?;
    usize::try_from(value).map_err(|_| {
        CoreError::malformed(text, format!("register id {} does not fit usize", value))
    })
}

fn parse_mask(text: &str, token: &str) -> Result<RegisterValue> {
    let value = parse_number(text, token)?;
    RegisterValue::try_from(value).map_err(|_| {
        CoreError::malformed(
            text,
            format!("mask {:#x} exceeds the {}-bit register width", value, REGISTER_WIDTH),
        )
    })
}

/// Fluent construction of directive text.
///
/// `reg` appends a register id, `bit` appends a single-bit mask and `mask`
/// appends a raw mask. Arguments are emitted in call order; the result is
/// validated when parsed, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBuilder {
    kind: DirectiveKind,
    args: Vec<u64>,
}

impl DirectiveBuilder {
    pub fn new(kind: DirectiveKind) -> Self {
        DirectiveBuilder {
            kind,
            args: Vec::with_capacity(kind.arity()),
        }
    }

    pub fn reg(mut self, register: impl Into<usize>) -> Self {
        self.args.push(register.into() as u64);
        self
    }

    pub fn bit(mut self, bit: u32) -> Self {
        self.args.push(1u64.checked_shl(bit).unwrap_or(u64::MAX));
        self
    }

    pub fn mask(mut self, mask: RegisterValue) -> Self {
        self.args.push(mask as u64);
        self
    }

    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }
}

impl fmt::Display for DirectiveBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
