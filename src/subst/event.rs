//! Change notifications for substitutions.

use std::fmt;
use std::sync::mpsc;

/// What changed in a [`Substitution`](super::Substitution).
///
/// Events carrying an alphabet index refer to one key-rotation slot;
/// `None` means every slot was affected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionEvent {
    /// Characters were added to or replaced in the cipher alphabet.
    CipherAlphabetChanged { alphabet: Option<usize> },
    /// Characters were added to or replaced in the plain alphabet.
    PlainAlphabetChanged { alphabet: Option<usize> },
    /// The ignore set of a slot changed.
    IgnoredCharactersChanged { alphabet: usize },
    /// One or more cipher→plain pairs of a slot changed.
    SubstitutionPairChanged { alphabet: usize },
    /// Slots were added or removed.
    NumberOfAlphabetsChanged { count: usize },
}

/// Handle returned by [`Substitution::subscribe`](super::Substitution::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&SubstitutionEvent) + Send>;

/// Registered callbacks and channel senders.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    callbacks: Vec<(ListenerId, Callback)>,
    senders: Vec<mpsc::Sender<SubstitutionEvent>>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, callback: impl FnMut(&SubstitutionEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(listener, _)| *listener != id);
        self.callbacks.len() != before
    }

    pub(crate) fn channel(&mut self) -> mpsc::Receiver<SubstitutionEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: &SubstitutionEvent) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
        // Drop senders whose receiver is gone
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("callbacks", &self.callbacks.len())
            .field("channels", &self.senders.len())
            .finish()
    }
}
