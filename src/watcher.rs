use std::fmt;

use crate::types::{RegisterId, RegisterValue};

/// Handle returned when a watcher is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(u64);

impl fmt::Display for WatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Passed to a watcher callback when its masked bits change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub watcher: WatcherId,
    pub register: RegisterId,
    pub mask: RegisterValue,
    /// Full register value at the previous observation.
    pub previous: RegisterValue,
    /// Full register value now.
    pub current: RegisterValue,
    pub tick: u64,
}

impl ChangeEvent {
    /// Bits under the mask that went from 0 to 1.
    pub fn rising_bits(&self) -> RegisterValue {
        !self.previous & self.current & self.mask
    }

    /// Bits under the mask that went from 1 to 0.
    pub fn falling_bits(&self) -> RegisterValue {
        self.previous & !self.current & self.mask
    }

    pub fn rising(&self) -> bool {
        self.rising_bits() != 0
    }

    pub fn falling(&self) -> bool {
        self.falling_bits() != 0
    }
}

pub type ChangeCallback = Box<dyn FnMut(&ChangeEvent)>;

struct ChangeWatcher {
    id: WatcherId,
    register: RegisterId,
    mask: RegisterValue,
    previous: RegisterValue,
    callback: ChangeCallback,
}

/// Edge-triggered watchers evaluated once per tick.
#[derive(Default)]
pub struct WatcherList {
    watchers: Vec<ChangeWatcher>,
    next_id: u64,
}

impl WatcherList {
    pub fn new() -> Self {
        WatcherList::default()
    }

    /// Register a watcher. `current` is the register value at registration;
    /// it becomes the baseline, so registering never fires the callback.
    pub fn add(
        &mut self,
        register: RegisterId,
        mask: RegisterValue,
        current: RegisterValue,
        callback: ChangeCallback,
    ) -> WatcherId {
        let id = WatcherId(self.next_id);
        self.next_id += 1;
        self.watchers.push(ChangeWatcher {
            id,
            register,
            mask,
            previous: current,
            callback,
        });
        id
    }

    pub fn remove(&mut self, id: WatcherId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|w| w.id != id);
        self.watchers.len() < before
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Fire every watcher whose masked bits differ from the last observation.
    /// Returns the number of callbacks invoked.
    pub fn evaluate(&mut self, read: impl Fn(RegisterId) -> RegisterValue, tick: u64) -> usize {
        let mut fired = 0;
        for watcher in &mut self.watchers {
            let current = read(watcher.register);
            if (current ^ watcher.previous) & watcher.mask != 0 {
                let event = ChangeEvent {
                    watcher: watcher.id,
                    register: watcher.register,
                    mask: watcher.mask,
                    previous: watcher.previous,
                    current,
                    tick,
                };
                (watcher.callback)(&event);
                fired += 1;
            }
            watcher.previous = current;
        }
        fired
    }
}

impl fmt::Debug for WatcherList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.watchers
                    .iter()
                    .map(|w| (w.id, w.register, w.mask, w.previous)),
            )
            .finish()
    }
}
