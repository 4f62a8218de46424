//! Process-wide string interning pool.
//!
//! Atom content is deduplicated into a single global pool: equal bytes map
//! to equal [`AtomId`]s for as long as the pool is alive. The pool consists
//! of a bump arena owning the string bytes, an open-addressed hash table
//! mapping content to ids, and an id-indexed side table for reverse lookup.
//!
//! Ownership is reference counted. Every tree retains the pool once on
//! creation and releases it on drop; when the count reaches zero the pool
//! frees all of its memory and may be re-initialised later. All public
//! operations lock a single mutex for their entire duration and never call
//! back into tree code while holding it.

use std::sync::Mutex;

use bumpalo::Bump;
use once_cell::sync::Lazy;

/// Initial hash table capacity allocated on first use.
const TABLE_INITIAL_CAPACITY: usize = 64;
/// Initial byte capacity of the pool's string arena.
const ARENA_DEFAULT_CAPACITY: usize = 4096;

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// Stable 32-bit identifier for an interned string.
///
/// Zero is reserved as the invalid/null id ([`AtomId::NULL`]). Ids are
/// assigned densely from 1 in interning order; equal content always yields
/// the same id while the pool is live.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomId(u32);

impl AtomId {
    /// The reserved invalid id.
    pub const NULL: AtomId = AtomId(0);

    /// Returns true for the reserved invalid id.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The raw 32-bit value, as carried across the C handle surface.
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    /// Reconstructs an id from its raw value. No validity check is
    /// performed; lookups on unknown ids simply miss.
    #[inline]
    pub fn from_raw(raw: u32) -> AtomId {
        AtomId(raw)
    }
}

/// Open-addressed content-to-id table.
///
/// Two parallel arrays with power-of-two capacity and linear probing. A
/// hash value of zero marks an empty slot; the hash function never produces
/// zero. Hash equality is necessary but not sufficient, a byte comparison
/// against the stored string confirms every match.
struct HashTable {
    hashes: Vec<u64>,
    atom_ids: Vec<AtomId>,
    count: usize,
}

impl HashTable {
    fn with_capacity(capacity: usize) -> HashTable {
        HashTable {
            hashes: vec![0; capacity],
            atom_ids: vec![AtomId::NULL; capacity],
            count: 0,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.hashes.len()
    }

    /// Inserts without growth. The caller guarantees a free slot exists.
    fn insert(&mut self, hash_value: u64, atom_id: AtomId) {
        let mask = self.capacity() - 1;
        let mut slot = (hash_value as usize) & mask;
        while self.hashes[slot] != 0 {
            slot = (slot + 1) & mask;
        }
        self.hashes[slot] = hash_value;
        self.atom_ids[slot] = atom_id;
        self.count += 1;
    }

    /// Doubles the capacity and rehashes every occupied slot.
    fn grow(&mut self) {
        let new_capacity = self.capacity() << 1;
        let mut grown = HashTable::with_capacity(new_capacity);
        for slot in 0..self.capacity() {
            if self.hashes[slot] != 0 {
                grown.insert(self.hashes[slot], self.atom_ids[slot]);
            }
        }
        *self = grown;
    }
}

/// The global intern pool. Lives behind [`POOL`]; `None` when uninitialised
/// or after the last reference has been released.
struct InternPool {
    /// Bump arena owning string content. Strings are stored with a trailing
    /// NUL for the C lookup surface; the recorded slice length is
    /// authoritative and excludes it.
    arena: Bump,
    table: HashTable,
    /// `strings[id - 1]` is the content for that id. The `'static` lifetime
    /// is a lie: each slice points into `arena` and is only handed out
    /// under the pool lock or across the C surface, whose contract bounds
    /// its validity by the pool's lifetime.
    strings: Vec<&'static [u8]>,
    reference_count: u32,
}

static POOL: Lazy<Mutex<Option<InternPool>>> = Lazy::new(|| Mutex::new(None));

/// FNV-1a over the string bytes, with a computed zero remapped to one so
/// that zero reliably marks an empty table slot.
#[inline]
fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hash_value = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash_value ^= byte as u64;
        hash_value = hash_value.wrapping_mul(FNV_PRIME);
    }
    if hash_value == 0 {
        1
    } else {
        hash_value
    }
}

impl InternPool {
    fn new() -> InternPool {
        InternPool {
            arena: Bump::with_capacity(ARENA_DEFAULT_CAPACITY),
            table: HashTable::with_capacity(TABLE_INITIAL_CAPACITY),
            strings: Vec::new(),
            reference_count: 0,
        }
    }

    /// Probes the table for existing content. Returns the id on a hit.
    fn find(&self, hash_value: u64, bytes: &[u8]) -> AtomId {
        let mask = self.table.capacity() - 1;
        let mut slot = (hash_value as usize) & mask;
        while self.table.hashes[slot] != 0 {
            if self.table.hashes[slot] == hash_value {
                let atom_id = self.table.atom_ids[slot];
                let stored = self.strings[(atom_id.to_raw() - 1) as usize];
                if stored == bytes {
                    return atom_id;
                }
            }
            slot = (slot + 1) & mask;
        }
        AtomId::NULL
    }

    /// Copies the bytes into the arena and assigns the next dense id. The
    /// caller has already established that the content is absent and that
    /// the table has room.
    fn assign(&mut self, bytes: &[u8], hash_value: u64) -> AtomId {
        let storage = self.arena.alloc_slice_fill_copy(bytes.len() + 1, 0u8);
        storage[..bytes.len()].copy_from_slice(bytes);
        // Tie the slice to the arena, not to this borrow of the pool. See
        // the field docs on `strings`.
        let stored: &'static [u8] =
            unsafe { std::slice::from_raw_parts(storage.as_ptr(), bytes.len()) };

        let atom_id = AtomId(self.table.count as u32 + 1);
        self.strings.push(stored);
        self.table.insert(hash_value, atom_id);
        atom_id
    }
}

/// Initialises the global pool if it is not already live.
///
/// Called automatically by [`parse`](crate::parse) and
/// [`Sexp::new`](crate::Sexp::new); explicit calls are no-ops while the
/// pool is active. A pool whose reference count has dropped to zero has
/// been torn down and may be initialised again.
pub fn init() {
    let mut pool = POOL.lock().unwrap();
    if pool.is_none() {
        *pool = Some(InternPool::new());
    }
}

/// Interns a byte string, returning its stable id.
///
/// Equal content returns equal ids for the lifetime of the pool. Returns
/// [`AtomId::NULL`] when the pool has not been initialised.
pub fn intern(bytes: &[u8]) -> AtomId {
    let mut guard = POOL.lock().unwrap();
    let pool = match guard.as_mut() {
        Some(pool) => pool,
        None => return AtomId::NULL,
    };

    let hash_value = hash_bytes(bytes);
    let existing = pool.find(hash_value, bytes);
    if !existing.is_null() {
        return existing;
    }

    // Grow at half load so linear probe chains stay short.
    if pool.table.count >= pool.table.capacity() / 2 {
        pool.table.grow();
    }
    pool.assign(bytes, hash_value)
}

/// Returns a copy of the interned content for `atom_id`, or `None` for
/// unknown ids or an uninitialised pool.
pub fn lookup(atom_id: AtomId) -> Option<Vec<u8>> {
    with_bytes(atom_id, |bytes| bytes.to_vec())
}

/// Byte length of the interned content for `atom_id`.
pub fn len(atom_id: AtomId) -> Option<usize> {
    with_bytes(atom_id, |bytes| bytes.len())
}

/// Runs `f` over the interned content under the pool lock. `f` must not
/// call back into the pool.
pub(crate) fn with_bytes<R>(atom_id: AtomId, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
    let guard = POOL.lock().unwrap();
    let pool = guard.as_ref()?;
    let index = atom_id.to_raw().checked_sub(1)? as usize;
    let stored = *pool.strings.get(index)?;
    Some(f(stored))
}

/// Raw pointer and length of the interned content, for the C lookup
/// surface. The pointer addresses NUL-terminated storage inside the pool
/// arena and stays valid until the pool's reference count reaches zero.
pub(crate) fn lookup_raw(atom_id: AtomId) -> Option<(*const u8, usize)> {
    let guard = POOL.lock().unwrap();
    let pool = guard.as_ref()?;
    let index = atom_id.to_raw().checked_sub(1)? as usize;
    let stored = *pool.strings.get(index)?;
    Some((stored.as_ptr(), stored.len()))
}

/// Retains a reference to the pool. Each retain must be paired with a
/// [`release`]. No-op while the pool is uninitialised.
pub fn retain() {
    let mut guard = POOL.lock().unwrap();
    if let Some(pool) = guard.as_mut() {
        pool.reference_count += 1;
    }
}

/// Releases a reference to the pool. When the count reaches zero every
/// allocation is freed and the pool returns to the uninitialised state.
pub fn release() {
    let mut guard = POOL.lock().unwrap();
    let Some(pool) = guard.as_mut() else {
        return;
    };
    if pool.reference_count > 0 {
        pool.reference_count -= 1;
    }
    if pool.reference_count == 0 {
        *guard = None;
    }
}
