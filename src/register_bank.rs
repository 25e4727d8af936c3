use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CoreError, Result};
use crate::types::{PortId, RegisterGroup, RegisterId, RegisterValue};

static NEXT_BANK_ID: AtomicU64 = AtomicU64::new(1);

/// Flat storage for every register of every port.
///
/// Registers are laid out group-major: the register for `(group, port)` lives
/// at `group.index() * ports + port`. The port count is fixed at construction.
/// `PortId` and `RegisterId` handles are only issued after a bounds check and
/// carry the identity of the issuing bank. Passing a handle issued by another
/// bank to any accessor panics instead of aliasing a different register.
#[derive(Debug)]
pub struct RegisterBank {
    id: u64,
    ports: usize,
    registers: Vec<RegisterValue>,
}

impl RegisterBank {
    /// Create a bank with `ports` ports, all registers zeroed.
    pub fn new(ports: usize) -> Self {
        RegisterBank {
            id: NEXT_BANK_ID.fetch_add(1, Ordering::Relaxed),
            ports,
            registers: vec![0; RegisterGroup::COUNT * ports],
        }
    }

    pub fn port_count(&self) -> usize {
        self.ports
    }

    /// Number of addressable registers (seven per port).
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    pub fn port(&self, index: usize) -> Result<PortId> {
        if index < self.ports {
            Ok(PortId::new(self.id, index))
        } else {
            Err(CoreError::OutOfRangeRegister {
                index,
                limit: self.ports,
            })
        }
    }

    /// Validate a raw flat register index, as used in directive text.
    pub fn register(&self, index: usize) -> Result<RegisterId> {
        if index < self.registers.len() {
            Ok(RegisterId::new(self.id, index))
        } else {
            Err(CoreError::OutOfRangeRegister {
                index,
                limit: self.registers.len(),
            })
        }
    }

    pub fn register_id(&self, group: RegisterGroup, port: PortId) -> RegisterId {
        self.check_port(port);
        RegisterId::new(self.id, group.index() * self.ports + port.index())
    }

    /// Inverse of [`RegisterBank::register_id`].
    pub fn locate(&self, id: RegisterId) -> (RegisterGroup, PortId) {
        self.check_register(id);
        let group = RegisterGroup::ALL[id.index() / self.ports];
        (group, PortId::new(self.id, id.index() % self.ports))
    }

    pub fn read(&self, group: RegisterGroup, port: PortId) -> RegisterValue {
        self.read_register(self.register_id(group, port))
    }

    pub fn write(&mut self, group: RegisterGroup, port: PortId, value: RegisterValue) {
        let id = self.register_id(group, port);
        self.write_register(id, value);
    }

    pub fn read_register(&self, id: RegisterId) -> RegisterValue {
        self.check_register(id);
        self.registers[id.index()]
    }

    pub fn write_register(&mut self, id: RegisterId, value: RegisterValue) {
        self.check_register(id);
        self.registers[id.index()] = value;
    }

    fn check_port(&self, port: PortId) {
        assert!(
            port.bank() == self.id && port.index() < self.ports,
            "{} was not issued by this {}-port bank",
            port,
            self.ports
        );
    }

    fn check_register(&self, id: RegisterId) {
        assert!(
            id.bank() == self.id && id.index() < self.registers.len(),
            "{} was not issued by this {}-port bank",
            id,
            self.ports
        );
    }

    /// Read-only view of the flat storage.
    pub fn values(&self) -> &[RegisterValue] {
        &self.registers
    }

    /// Fold every set/clear command into its persistent register and zero
    /// the command registers.
    pub fn consume_one_shots(&mut self) {
        for port in 0..self.ports {
            let port = PortId::new(self.id, port);
            self.consume_pair(
                port,
                RegisterGroup::Output,
                RegisterGroup::OutputSet,
                RegisterGroup::OutputClear,
            );
            self.consume_pair(
                port,
                RegisterGroup::Direction,
                RegisterGroup::DirectionSet,
                RegisterGroup::DirectionClear,
            );
        }
    }

    fn consume_pair(
        &mut self,
        port: PortId,
        target: RegisterGroup,
        set: RegisterGroup,
        clear: RegisterGroup,
    ) {
        let mut value = self.read(target, port);

        value |= self.read(set, port);
        self.write(set, port, 0);

        value &= !self.read(clear, port);
        self.write(clear, port, 0);

        self.write(target, port, value);
    }
}

impl fmt::Display for RegisterBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<15}", "")?;
        for port in 0..self.ports {
            write!(f, " {:>10}", format!("P{}", port))?;
        }
        writeln!(f)?;

        for group in RegisterGroup::ALL {
            write!(f, "{:<15}", group.to_str())?;
            for port in 0..self.ports {
                let value = self.read(group, PortId::new(self.id, port));
                write!(f, " 0b{:08b}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
