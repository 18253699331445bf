//! In-memory stand-in for Disk Arbitration that counts every reference it hands out.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;

use crate::native::{Arbitration, Key};

#[derive(Debug, Clone)]
pub(crate) enum FakeValue {
    Boolean(bool),
    Text(String),
    /// String whose copy writes these bytes verbatim, encoding not checked.
    Raw(Vec<u8>),
    /// Any value that is neither a boolean nor a string.
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Session,
    Disk,
    Dictionary,
}

#[derive(Debug)]
struct Object {
    kind: Kind,
    name: String,
}

#[derive(Debug, Default)]
struct State {
    next: usize,
    owned: HashMap<usize, Object>,
    /// Borrowed values, keyed by id, with the dictionary they belong to.
    values: HashMap<usize, (usize, FakeValue)>,
    entries: HashMap<(usize, Key), usize>,
    created: usize,
    released: Vec<Kind>,
}

impl State {
    fn alloc(&mut self) -> usize {
        self.next += 1;
        self.next
    }

    fn create(&mut self, kind: Kind, name: &str) -> usize {
        let id = self.alloc();
        self.owned.insert(
            id,
            Object {
                kind,
                name: name.to_owned(),
            },
        );
        self.created += 1;
        id
    }

    fn expect(&self, id: usize, kind: Kind) -> &Object {
        match self.owned.get(&id) {
            Some(obj) if obj.kind == kind => obj,
            Some(obj) => panic!("reference {id} is a {:?}, expected {kind:?}", obj.kind),
            None => panic!("reference {id} used after release"),
        }
    }

    fn borrowed(&self, id: usize) -> &FakeValue {
        let (dict, value) = self
            .values
            .get(&id)
            .unwrap_or_else(|| panic!("unknown value reference {id}"));
        self.expect(*dict, Kind::Dictionary);
        value
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeArbitration {
    unavailable: bool,
    copy_fails: bool,
    copy_unterminated: bool,
    negative_max_size: bool,
    disks: HashMap<String, Option<Vec<(Key, FakeValue)>>>,
    state: RefCell<State>,
}

impl FakeArbitration {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_disk(mut self, name: &str, description: &[(Key, FakeValue)]) -> Self {
        self.disks.insert(name.to_owned(), Some(description.to_vec()));
        self
    }

    /// A disk the service knows about but cannot describe.
    pub(crate) fn with_undescribed_disk(mut self, name: &str) -> Self {
        self.disks.insert(name.to_owned(), None);
        self
    }

    /// Make every string copy fail regardless of buffer size.
    pub(crate) fn failing_copy(mut self) -> Self {
        self.copy_fails = true;
        self
    }

    /// Fill the whole buffer on copy, leaving no NUL terminator.
    pub(crate) fn unterminated_copy(mut self) -> Self {
        self.copy_unterminated = true;
        self
    }

    /// Report every string as too large to size for UTF-8.
    pub(crate) fn negative_max_size(mut self) -> Self {
        self.negative_max_size = true;
        self
    }

    pub(crate) fn created(&self) -> usize {
        self.state.borrow().created
    }

    pub(crate) fn released(&self) -> usize {
        self.state.borrow().released.len()
    }

    pub(crate) fn release_order(&self) -> Vec<Kind> {
        self.state.borrow().released.clone()
    }

    pub(crate) fn live(&self) -> usize {
        self.state.borrow().owned.len()
    }

    pub(crate) fn is_live(&self, id: usize) -> bool {
        self.state.borrow().owned.contains_key(&id)
    }
}

impl Arbitration for FakeArbitration {
    type Ref = usize;

    fn create_session(&self) -> Option<usize> {
        if self.unavailable {
            return None;
        }
        Some(self.state.borrow_mut().create(Kind::Session, "session"))
    }

    fn create_disk(&self, session: usize, bsd_name: &CStr) -> Option<usize> {
        let mut state = self.state.borrow_mut();
        state.expect(session, Kind::Session);

        let name = bsd_name.to_str().ok()?;
        if !self.disks.contains_key(name) {
            return None;
        }
        Some(state.create(Kind::Disk, name))
    }

    fn copy_description(&self, disk: usize) -> Option<usize> {
        let mut state = self.state.borrow_mut();
        let name = state.expect(disk, Kind::Disk).name.clone();

        let entries = self.disks.get(&name)?.as_ref()?;
        let dict = state.create(Kind::Dictionary, &name);
        for (key, value) in entries {
            let id = state.alloc();
            state.values.insert(id, (dict, value.clone()));
            state.entries.insert((dict, *key), id);
        }
        Some(dict)
    }

    fn value(&self, dictionary: usize, key: Key) -> Option<usize> {
        let state = self.state.borrow();
        state.expect(dictionary, Kind::Dictionary);
        state.entries.get(&(dictionary, key)).copied()
    }

    fn boolean(&self, value: usize) -> Option<bool> {
        match self.state.borrow().borrowed(value) {
            FakeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn string_length(&self, value: usize) -> Option<isize> {
        match self.state.borrow().borrowed(value) {
            FakeValue::Text(s) => Some(s.encode_utf16().count() as isize),
            FakeValue::Raw(bytes) => Some(bytes.len() as isize),
            _ => None,
        }
    }

    fn max_size_for_encoding(&self, length: isize) -> isize {
        if self.negative_max_size {
            return -1;
        }
        length.checked_mul(3).unwrap_or(-1)
    }

    fn copy_c_string(&self, value: usize, buffer: &mut [u8]) -> bool {
        let state = self.state.borrow();
        let (bytes, terminated) = match state.borrowed(value) {
            FakeValue::Text(s) => (s.as_bytes(), true),
            FakeValue::Raw(bytes) => (bytes.as_slice(), false),
            _ => return false,
        };
        if self.copy_fails || bytes.len() + 1 > buffer.len() {
            return false;
        }

        buffer[..bytes.len()].copy_from_slice(bytes);
        if self.copy_unterminated {
            buffer[bytes.len()..].fill(b'A');
        } else if terminated {
            buffer[bytes.len()] = 0;
        }
        true
    }

    fn release(&self, reference: usize) {
        let mut state = self.state.borrow_mut();
        let Some(obj) = state.owned.remove(&reference) else {
            panic!("reference {reference} released twice or never created");
        };
        if obj.kind == Kind::Dictionary {
            state.values.retain(|_, (dict, _)| *dict != reference);
            state.entries.retain(|(dict, _), _| *dict != reference);
        }
        state.released.push(obj.kind);
    }
}
