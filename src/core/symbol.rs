//! Interned variable names.
//!
//! A [`Symbol`] is identified by its case-normalized name: `X` and `x` are the
//! same variable. Names are interned once in a global registry so equality and
//! hashing compare a single integer id instead of strings.
//!
//! # Example
//! ```
//! use symb_equiv::Symbol;
//!
//! let a = Symbol::new("Rate");
//! let b = Symbol::new("RATE");
//! assert_eq!(a, b);
//! assert_eq!(a.name(), "rate");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, RwLock};

use rustc_hash::FxHashMap;
use slotmap::{DefaultKey, Key, SlotMap};

/// Global name registry: normalized name → slot, slot → shared name.
struct SymbolRegistry {
    by_name: FxHashMap<Arc<str>, DefaultKey>,
    names: SlotMap<DefaultKey, Arc<str>>,
}

static REGISTRY: LazyLock<RwLock<SymbolRegistry>> = LazyLock::new(|| {
    RwLock::new(SymbolRegistry {
        by_name: FxHashMap::default(),
        names: SlotMap::with_key(),
    })
});

/// Lower-case a name the way variable identity requires.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// An interned, case-normalized variable name.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    name: Arc<str>,
}

impl Symbol {
    /// Intern `name` (case-insensitively) and return its symbol.
    ///
    /// # Panics
    ///
    /// Panics if the global registry lock is poisoned.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let normalized = normalize_name(name);

        {
            let registry = REGISTRY.read().expect("Global symbol registry poisoned");
            if let Some(&key) = registry.by_name.get(normalized.as_str()) {
                return Self {
                    id: key.data().as_ffi(),
                    name: Arc::clone(&registry.names[key]),
                };
            }
        }

        let mut registry = REGISTRY.write().expect("Global symbol registry poisoned");
        // Another thread may have inserted between the two locks.
        if let Some(&key) = registry.by_name.get(normalized.as_str()) {
            return Self {
                id: key.data().as_ffi(),
                name: Arc::clone(&registry.names[key]),
            };
        }
        let shared: Arc<str> = Arc::from(normalized);
        let key = registry.names.insert(Arc::clone(&shared));
        registry.by_name.insert(Arc::clone(&shared), key);
        Self {
            id: key.data().as_ffi(),
            name: shared,
        }
    }

    /// Stable numeric id of this symbol
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The normalized (lower-case) name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Symbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Alphabetical, so canonical ordering does not depend on interning order.
impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.id == other.id {
            return Ordering::Equal;
        }
        self.name.cmp(&other.name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
