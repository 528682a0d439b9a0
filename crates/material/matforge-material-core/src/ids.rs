//! Runtime identifiers.
//!
//! Every node and material receives an identifier from one process-wide
//! counter when it is created. Identifiers are never reused within a run and
//! are not persisted; decoding assigns fresh ones.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_RUNTIME_ID: AtomicU32 = AtomicU32::new(1);

#[inline]
fn next_raw() -> u32 {
    NEXT_RUNTIME_ID.fetch_add(1, Ordering::Relaxed)
}

macro_rules! runtime_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Allocate a new, never before seen identifier.
            #[inline]
            pub fn fresh() -> Self {
                $name(next_raw())
            }

            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

runtime_id!(
    /// Stable handle of a node inside its material.
    NodeId
);
runtime_id!(
    /// Stable handle of a material inside its library.
    MaterialId
);

/// Items that carry a runtime identifier.
pub trait Identified {
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    fn runtime_id(&self) -> Self::Id;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_across_kinds() {
        let a = NodeId::fresh();
        let b = MaterialId::fresh();
        let c = NodeId::fresh();
        assert_ne!(a, c);
        assert!(c.raw() > a.raw());
        assert_ne!(a.raw(), b.raw());
        assert_ne!(b.raw(), c.raw());
    }
}
