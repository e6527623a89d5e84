//! latched events
//!
//! an event is a one-way mpsc channel: the notifying side holds the
//! `Notifier`, the waiting side owns the `Listener`. notifications queue up
//! until polled, so none is lost while the listener is busy elsewhere.

use std::sync::mpsc;

use ustr::Ustr;

use crate as sim;

/// create a named event carrying values of type `T`
pub fn event<T>(name: &str) -> (Notifier<T>, Listener<T>) {
    let (tx, rx) = mpsc::channel();
    let name = Ustr::from(name);
    (Notifier { name, tx }, Listener { name, rx })
}

#[derive(Debug, Clone)]
pub struct Notifier<T = ()> {
    name: Ustr,
    tx: mpsc::Sender<T>,
}

impl<T> Notifier<T> {
    pub fn name(&self) -> Ustr {
        self.name
    }

    /// notify the listener, passing `value` along
    pub fn notify_with(&self, value: T) -> Result<(), sim::Error> {
        self.tx
            .send(value)
            .map_err(|_| sim::Error::Detached(self.name.to_string()))
    }
}

impl Notifier<()> {
    pub fn notify(&self) -> Result<(), sim::Error> {
        self.notify_with(())
    }
}

#[derive(Debug)]
pub struct Listener<T = ()> {
    name: Ustr,
    rx: mpsc::Receiver<T>,
}

impl<T> Listener<T> {
    pub fn name(&self) -> Ustr {
        self.name
    }

    /// take the oldest pending notification, if any
    pub fn poll(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}
