//! Change-watcher tests
//!
//! These tests use watchers the way an interrupt manager would: a pin's
//! input bit is watched and a handler runs on every edge.

use gpio_mock::{ChangeEvent, DirectiveBuilder, DirectiveKind, MockCore, RegisterGroup};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[cfg(test)]
mod interrupt_on_change_tests {
    use super::*;

    #[test]
    fn test_interrupt_fires_on_each_input_edge() {
        let mut core = MockCore::new(2);
        let port_a = core.port(0).unwrap();
        let input_a = core.register_id(RegisterGroup::Input, port_a);

        let log = Rc::new(RefCell::new(String::new()));
        let sink = log.clone();
        core.on_change(input_a, 0b0000_0001, move |_| sink.borrow_mut().push('I'));

        core.tick();
        assert_eq!(log.borrow().len(), 0);

        core.write(RegisterGroup::Input, port_a, 0b0000_0001);
        core.tick();
        assert_eq!(log.borrow().len(), 1);

        core.write(RegisterGroup::Input, port_a, 0b0000_0000);
        core.tick();
        assert_eq!(log.borrow().len(), 2);

        core.tick();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_watchers_on_same_register_are_independent() {
        let mut core = MockCore::new(1);
        let p0 = core.port(0).unwrap();
        let input = core.register_id(RegisterGroup::Input, p0);

        let low = Rc::new(Cell::new(0));
        let high = Rc::new(Cell::new(0));
        let (l, h) = (low.clone(), high.clone());
        core.on_change(input, 0b0000_0001, move |_| l.set(l.get() + 1));
        core.on_change(input, 0b1000_0000, move |_| h.set(h.get() + 1));

        core.write(RegisterGroup::Input, p0, 0b0000_0001);
        core.tick();
        core.write(RegisterGroup::Input, p0, 0b1000_0001);
        core.tick();

        assert_eq!(low.get(), 1);
        assert_eq!(high.get(), 1);
    }

    #[test]
    fn test_watcher_sees_rule_output_in_same_tick() {
        let mut core = MockCore::new(2);
        let p0 = core.port(0).unwrap();
        let p1 = core.port(1).unwrap();
        let out = core.register_id(RegisterGroup::Output, p0);
        let input = core.register_id(RegisterGroup::Input, p1);
        core.apply_directive(&format!("BitLink {} 1 {} 1", out.index(), input.index()))
            .unwrap();

        let ticks = Rc::new(RefCell::new(Vec::new()));
        let sink = ticks.clone();
        core.on_change(input, 1, move |e: &ChangeEvent| sink.borrow_mut().push(e.tick));

        core.write(RegisterGroup::OutputSet, p0, 1);
        core.tick();

        assert_eq!(*ticks.borrow(), vec![1]);
    }
}

/// A two-wire client: a strobe line and a clock line that samples a data line
/// on its rising edge.
#[derive(Debug, Default)]
struct Client {
    current_bit: bool,
    strobe_edges: Vec<bool>,
    clock_edges: Vec<bool>,
}

#[cfg(test)]
mod strobe_clock_tests {
    use super::*;

    const STROBE: u32 = 0;
    const CLOCK: u32 = 1;
    const DATA: u32 = 2;

    /// Port 0 outputs drive port 1 inputs on bits 0, 1 and 2.
    fn wired_core() -> MockCore {
        let mut core = MockCore::new(2);
        let out = core.register_id(RegisterGroup::Output, core.port(0).unwrap());
        let input = core.register_id(RegisterGroup::Input, core.port(1).unwrap());
        for bit in [STROBE, CLOCK, DATA] {
            let text = DirectiveBuilder::new(DirectiveKind::BitLink)
                .reg(out)
                .bit(bit)
                .reg(input)
                .bit(bit)
                .to_string();
            core.apply_directive(&text).unwrap();
        }
        core
    }

    fn pulse_high(core: &mut MockCore, bit: u32) {
        let p0 = core.port(0).unwrap();
        core.write(RegisterGroup::OutputSet, p0, 1 << bit);
        core.tick();
        core.write(RegisterGroup::OutputClear, p0, 1 << bit);
        core.tick();
    }

    #[test]
    fn test_client_samples_data_on_clock_rising_edge() {
        let mut core = wired_core();
        let p0 = core.port(0).unwrap();
        let input = core.register_id(RegisterGroup::Input, core.port(1).unwrap());

        let client = Rc::new(RefCell::new(Client::default()));

        let c = client.clone();
        core.on_change(input, 1 << CLOCK, move |e: &ChangeEvent| {
            let mut client = c.borrow_mut();
            client.clock_edges.push(e.rising());
            if e.rising() {
                client.current_bit = e.current & (1 << DATA) != 0;
            }
        });
        let c = client.clone();
        core.on_change(input, 1 << STROBE, move |e: &ChangeEvent| {
            c.borrow_mut().strobe_edges.push(e.rising());
        });

        assert!(!client.borrow().current_bit);

        core.write(RegisterGroup::OutputSet, p0, 1 << DATA);
        pulse_high(&mut core, CLOCK);

        assert!(client.borrow().current_bit);
        assert_eq!(client.borrow().clock_edges, vec![true, false]);
        assert!(client.borrow().strobe_edges.is_empty());

        pulse_high(&mut core, STROBE);
        assert_eq!(client.borrow().strobe_edges, vec![true, false]);
    }

    #[test]
    fn test_client_samples_zero_after_data_cleared() {
        let mut core = wired_core();
        let p0 = core.port(0).unwrap();
        let input = core.register_id(RegisterGroup::Input, core.port(1).unwrap());

        let sampled = Rc::new(RefCell::new(Vec::new()));
        let sink = sampled.clone();
        core.on_change(input, 1 << CLOCK, move |e: &ChangeEvent| {
            if e.rising() {
                sink.borrow_mut().push(e.current & (1 << DATA) != 0);
            }
        });

        core.write(RegisterGroup::OutputSet, p0, 1 << DATA);
        pulse_high(&mut core, CLOCK);
        core.write(RegisterGroup::OutputClear, p0, 1 << DATA);
        pulse_high(&mut core, CLOCK);

        assert_eq!(*sampled.borrow(), vec![true, false]);
    }
}
