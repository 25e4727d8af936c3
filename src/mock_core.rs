use tracing::{debug, trace, warn};

use crate::directive::Directive;
use crate::error::{CoreError, Result};
use crate::interconnect::{BitLink, Interconnect, InterconnectRule};
use crate::register_bank::RegisterBank;
use crate::types::{PortId, RegisterGroup, RegisterId, RegisterValue};
use crate::watcher::{ChangeEvent, WatcherId, WatcherList};

/// Software stand-in for a microcontroller's GPIO register file.
///
/// Owns the register bank, the interconnect rules and the change watchers.
/// Everything happens synchronously: register writes and directives take
/// effect when called, and [`MockCore::tick`] advances the model by one cycle.
/// The core is deliberately not `Clone`; collaborators hold register ids into
/// this one instance.
#[derive(Debug)]
pub struct MockCore {
    bank: RegisterBank,
    interconnect: Interconnect,
    watchers: WatcherList,
    tick_count: u64,
}

impl MockCore {
    pub fn new(ports: usize) -> Self {
        MockCore {
            bank: RegisterBank::new(ports),
            interconnect: Interconnect::new(),
            watchers: WatcherList::new(),
            tick_count: 0,
        }
    }

    /// Advance one cycle: consume set/clear commands, evaluate the wiring
    /// rules, then fire watchers whose bits changed.
    pub fn tick(&mut self) {
        self.tick_count += 1;

        self.bank.consume_one_shots();
        self.interconnect.evaluate(&mut self.bank);

        let bank = &self.bank;
        let fired = self
            .watchers
            .evaluate(|id| bank.read_register(id), self.tick_count);

        trace!(
            tick = self.tick_count,
            rules = self.interconnect.len(),
            fired,
            "tick"
        );
    }

    /// Parse `text` and append the rule it describes.
    ///
    /// Rules may not drive a set/clear register, since those must read zero
    /// once a tick completes. On any error the rule set is left unchanged.
    pub fn apply_directive(&mut self, text: &str) -> Result<()> {
        let rule = Directive::parse(text).and_then(|directive| self.build_rule(text, directive));
        match rule {
            Ok(rule) => {
                debug!(directive = text, %rule, "directive applied");
                self.interconnect.push(rule);
                Ok(())
            }
            Err(e) => {
                warn!(directive = text, error = %e, "directive rejected");
                Err(e)
            }
        }
    }

    fn build_rule(&self, text: &str, directive: Directive) -> Result<InterconnectRule> {
        match directive {
            Directive::BitLink {
                input,
                input_mask,
                output,
                output_mask,
            } => {
                let input = self.bank.register(input)?;
                let output = self.bank.register(output)?;
                let (group, port) = self.bank.locate(output);
                if group.is_one_shot() {
                    return Err(CoreError::malformed(
                        text,
                        format!(
                            "output {} is the one-shot {} register of {}",
                            output, group, port
                        ),
                    ));
                }
                Ok(InterconnectRule::BitLink(BitLink {
                    input,
                    input_mask,
                    output,
                    output_mask,
                }))
            }
        }
    }

    /// Call `callback` from within [`MockCore::tick`] whenever the bits of
    /// `register` under `mask` differ from their value at the end of the
    /// previous tick.
    pub fn on_change<F>(&mut self, register: RegisterId, mask: RegisterValue, callback: F) -> WatcherId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        let current = self.bank.read_register(register);
        let id = self.watchers.add(register, mask, current, Box::new(callback));
        debug!(watcher = %id, %register, mask, "watcher registered");
        id
    }

    pub fn remove_watcher(&mut self, id: WatcherId) -> bool {
        self.watchers.remove(id)
    }

    pub fn port(&self, index: usize) -> Result<PortId> {
        self.bank.port(index)
    }

    pub fn register(&self, index: usize) -> Result<RegisterId> {
        self.bank.register(index)
    }

    pub fn register_id(&self, group: RegisterGroup, port: PortId) -> RegisterId {
        self.bank.register_id(group, port)
    }

    pub fn read(&self, group: RegisterGroup, port: PortId) -> RegisterValue {
        self.bank.read(group, port)
    }

    /// Persistent groups change immediately; set/clear groups are latched
    /// until the next tick.
    pub fn write(&mut self, group: RegisterGroup, port: PortId, value: RegisterValue) {
        self.bank.write(group, port, value);
    }

    pub fn read_register(&self, id: RegisterId) -> RegisterValue {
        self.bank.read_register(id)
    }

    pub fn write_register(&mut self, id: RegisterId, value: RegisterValue) {
        self.bank.write_register(id, value);
    }

    pub fn bank(&self) -> &RegisterBank {
        &self.bank
    }

    pub fn rules(&self) -> &[InterconnectRule] {
        self.interconnect.rules()
    }

    pub fn rule_count(&self) -> usize {
        self.interconnect.len()
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn port_count(&self) -> usize {
        self.bank.port_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_core_creation() {
        let core = MockCore::new(2);
        assert_eq!(core.port_count(), 2);
        assert_eq!(core.rule_count(), 0);
        assert_eq!(core.watcher_count(), 0);
        assert_eq!(core.tick_count(), 0);
    }

    #[test]
    fn test_tick_consumes_one_shots() {
        let mut core = MockCore::new(2);
        let p1 = core.port(1).unwrap();
        core.write(RegisterGroup::OutputSet, p1, 0b1010);
        core.write(RegisterGroup::DirectionSet, p1, 0b0011);

        // Latched, not applied.
        assert_eq!(core.read(RegisterGroup::Output, p1), 0);

        core.tick();

        assert_eq!(core.read(RegisterGroup::Output, p1), 0b1010);
        assert_eq!(core.read(RegisterGroup::Direction, p1), 0b0011);
        assert_eq!(core.read(RegisterGroup::OutputSet, p1), 0);
        assert_eq!(core.read(RegisterGroup::DirectionSet, p1), 0);
        assert_eq!(core.tick_count(), 1);
    }

    #[test]
    fn test_directive_round_trip() {
        let mut core = MockCore::new(1);
        let r0 = core.register(0).unwrap();
        let r1 = core.register(1).unwrap();

        assert_eq!(core.apply_directive("BitLink 0 1 1 1"), Ok(()));

        core.write_register(r0, 1);
        core.tick();
        assert_eq!(core.read_register(r1), 1);

        core.write_register(r0, 0);
        core.tick();
        assert_eq!(core.read_register(r1), 0);
    }

    #[test]
    fn test_set_command_visible_to_rules_in_same_tick() {
        let mut core = MockCore::new(1);
        let p0 = core.port(0).unwrap();
        let out = core.register_id(RegisterGroup::Output, p0);
        let input = core.register_id(RegisterGroup::Input, p0);
        core.apply_directive(&format!("BitLink {} 4 {} 1", out.index(), input.index()))
            .unwrap();

        core.write(RegisterGroup::OutputSet, p0, 4);
        core.tick();

        assert_eq!(core.read_register(input), 1);
    }

    #[test]
    fn test_rejected_directives_leave_rules_unchanged() {
        let mut core = MockCore::new(1);
        assert_eq!(
            core.apply_directive("Foo"),
            Err(CoreError::UnrecognizedDirective {
                verb: "Foo".to_string()
            })
        );
        assert!(matches!(
            core.apply_directive("BitLink 0 1"),
            Err(CoreError::MalformedDirective { .. })
        ));
        assert_eq!(
            core.apply_directive("BitLink 0 1 7 1"),
            Err(CoreError::OutOfRangeRegister { index: 7, limit: 7 })
        );
        assert_eq!(core.rule_count(), 0);
    }

    #[test]
    fn test_rule_driving_one_shot_register_is_rejected() {
        let mut core = MockCore::new(1);
        let p0 = core.port(0).unwrap();

        let result = core.apply_directive("BitLink 1 0 3 255");
        match result {
            Err(CoreError::MalformedDirective { directive, reason }) => {
                assert_eq!(directive, "BitLink 1 0 3 255");
                assert!(reason.contains("OutputSet"), "{}", reason);
            }
            other => panic!("expected MalformedDirective, got {:?}", other),
        }
        assert_eq!(core.rule_count(), 0);

        core.tick();
        assert_eq!(core.read(RegisterGroup::OutputSet, p0), 0);
        assert_eq!(core.read(RegisterGroup::Output, p0), 0);
    }

    #[test]
    fn test_rule_may_read_one_shot_register() {
        let mut core = MockCore::new(1);
        let set = core.register_id(RegisterGroup::OutputSet, core.port(0).unwrap());
        let input = core.register_id(RegisterGroup::Input, core.port(0).unwrap());
        assert!(core
            .apply_directive(&format!("BitLink {} 1 {} 1", set.index(), input.index()))
            .is_ok());
    }

    #[test]
    #[should_panic(expected = "was not issued by this")]
    fn test_foreign_handle_is_rejected_by_core() {
        let large = MockCore::new(3);
        let small = MockCore::new(1);
        let p2 = large.port(2).unwrap();
        small.read(RegisterGroup::Output, p2);
    }

    #[test]
    fn test_watcher_fires_on_input_edges() {
        let mut core = MockCore::new(1);
        let p0 = core.port(0).unwrap();
        let input = core.register_id(RegisterGroup::Input, p0);

        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        core.on_change(input, 0b1, move |_| seen.set(seen.get() + 1));

        core.tick();
        assert_eq!(count.get(), 0);

        core.write(RegisterGroup::Input, p0, 0b1);
        core.tick();
        assert_eq!(count.get(), 1);

        core.write(RegisterGroup::Input, p0, 0b0);
        core.tick();
        assert_eq!(count.get(), 2);

        core.tick();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_removed_watcher_stops_firing() {
        let mut core = MockCore::new(1);
        let r = core.register(0).unwrap();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let id = core.on_change(r, 0xFF, move |_| seen.set(seen.get() + 1));

        assert!(core.remove_watcher(id));
        core.write_register(r, 0xFF);
        core.tick();

        assert_eq!(count.get(), 0);
        assert_eq!(core.watcher_count(), 0);
    }
}
