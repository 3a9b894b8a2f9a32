//! Callback registry: at most one handler per command class.
//!
//! Handlers are borrowed closures, so they can capture whatever state the
//! caller owns (pin drivers, report flags) without globals or allocation.
//! A message whose class has no handler is dropped silently.
//!
//! # Example
//!
//! ```
//! use core::cell::Cell;
//! use firmata_proto::{CallbackRegistry, CommandClass, Message};
//!
//! let last = Cell::new((0u8, 0u16));
//! let mut on_analog = |channel: u8, value: u16| last.set((channel, value));
//!
//! let mut registry = CallbackRegistry::new();
//! registry.attach(CommandClass::Analog, &mut on_analog);
//!
//! assert!(registry.dispatch(&Message::Analog { channel: 2, value: 512 }));
//! assert!(!registry.dispatch(&Message::Digital { port: 0, value: 1 }));
//! drop(registry);
//! assert_eq!(last.get(), (2, 512));
//! ```

use crate::command::CommandClass;
use crate::message::Message;

/// Handler for fixed-payload messages: `(channel or pin, value or mode)`.
pub type Callback<'a> = &'a mut dyn FnMut(u8, u16);

/// Handler for sysex messages: `(command, payload)`.
pub type SysexCallback<'a> = &'a mut dyn FnMut(u8, &[u8]);

/// Mapping from [`CommandClass`] to an optional handler.
#[derive(Default)]
pub struct CallbackRegistry<'a> {
    slots: [Option<Callback<'a>>; 5],
    sysex: Option<SysexCallback<'a>>,
}

impl<'a> CallbackRegistry<'a> {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None, None, None, None, None],
            sysex: None,
        }
    }

    /// Attach `handler` to `class`, replacing any existing handler.
    pub fn attach(&mut self, class: CommandClass, handler: Callback<'a>) {
        self.slots[class.index()] = Some(handler);
    }

    /// Attach by raw command byte.
    ///
    /// Bytes that are not one of the five handler classes are accepted and
    /// have no effect on dispatch.
    pub fn attach_command(&mut self, command: u8, handler: Callback<'a>) {
        match CommandClass::from_command(command) {
            Some(class) => self.attach(class, handler),
            None => trace!("no handler slot for command {:#x}", command),
        }
    }

    /// Remove the handler for `class`, if any.
    pub fn detach(&mut self, class: CommandClass) {
        self.slots[class.index()] = None;
    }

    /// Attach the sysex handler, replacing any existing one.
    pub fn attach_sysex(&mut self, handler: SysexCallback<'a>) {
        self.sysex = Some(handler);
    }

    /// Remove the sysex handler.
    pub fn detach_sysex(&mut self) {
        self.sysex = None;
    }

    /// Whether a handler is attached to `class`.
    #[must_use]
    pub fn is_attached(&self, class: CommandClass) -> bool {
        self.slots[class.index()].is_some()
    }

    /// Whether a sysex handler is attached.
    #[must_use]
    pub fn has_sysex(&self) -> bool {
        self.sysex.is_some()
    }

    /// Remove every handler.
    pub fn clear(&mut self) {
        self.slots = [None, None, None, None, None];
        self.sysex = None;
    }

    /// Route a decoded message to its handler.
    ///
    /// Returns `true` if a handler ran. Version requests and resets have no
    /// handler slot and always return `false`.
    pub fn dispatch(&mut self, message: &Message<'_>) -> bool {
        if let Message::Sysex { command, payload } = *message {
            return match self.sysex.as_mut() {
                Some(handler) => {
                    handler(command, payload);
                    true
                }
                None => false,
            };
        }

        let (Some(class), Some((first, second))) = (message.class(), message.handler_args())
        else {
            return false;
        };

        match self.slots[class.index()].as_mut() {
            Some(handler) => {
                handler(first, second);
                true
            }
            None => false,
        }
    }
}
