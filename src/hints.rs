use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::log::debug;
use crate::Addr;


/// A snapshot of the resolution of a single absolute address, taken
/// while capturing.
///
/// Hints outlive the availability of the modules they refer to: the
/// module may have been unloaded since, or never be symbolized locally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressHint {
    /// The path of the module the address belonged to. May be empty if
    /// unknown.
    pub module_path: String,
    /// The name of the function the address belonged to. May be empty
    /// if unknown.
    pub function_name: String,
    /// The offset of the address from the start of the function.
    pub offset_in_function: u64,
}


/// A source of [`AddressHint`]s, keyed by absolute address.
pub trait CaptureAddressHints {
    /// Retrieve the hint recorded for `addr`, if any.
    fn address_hint(&self, addr: Addr) -> Option<&AddressHint>;
}


/// An append-only store of [`AddressHint`]s.
///
/// Each address is written at most once: the first hint recorded for
/// an address is the one that is kept.
#[derive(Clone, Debug, Default)]
pub struct AddressHints {
    hints: HashMap<Addr, AddressHint>,
}

impl AddressHints {
    /// Create a new, empty [`AddressHints`] object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hint for `addr`.
    ///
    /// Returns `true` if the hint got recorded and `false` if a hint
    /// for the address was present already, in which case the existing
    /// one is retained.
    pub fn insert(&mut self, addr: Addr, hint: AddressHint) -> bool {
        match self.hints.entry(addr) {
            Entry::Occupied(..) => {
                debug!("ignoring duplicate address hint for {addr:#x}: {hint:?}");
                false
            }
            Entry::Vacant(vacancy) => {
                let _hint = vacancy.insert(hint);
                true
            }
        }
    }

    /// Retrieve the number of hints present.
    #[inline]
    pub fn len(&self) -> usize {
        self.hints.len()
    }

    /// Check whether no hints are present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

impl CaptureAddressHints for AddressHints {
    #[inline]
    fn address_hint(&self, addr: Addr) -> Option<&AddressHint> {
        self.hints.get(&addr)
    }
}

impl Extend<(Addr, AddressHint)> for AddressHints {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (Addr, AddressHint)>,
    {
        for (addr, hint) in iter {
            let _inserted = self.insert(addr, hint);
        }
    }
}

impl FromIterator<(Addr, AddressHint)> for AddressHints {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Addr, AddressHint)>,
    {
        let mut hints = Self::new();
        let () = hints.extend(iter);
        hints
    }
}
