//! Macros.

/// Generates a zero-cost `usize` wrapper and a total-map type indexed by it.
///
/// The map is a thin `Vec` that can only be indexed by the wrapper, which
/// rules out mixing indices of different kinds.
#[macro_export]
macro_rules! wrap_usize {
    (
        $(#[$meta:meta])* $id:ident
        $(#[$map_meta:meta])* map: $map:ident
    ) => (
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $id {
            val: usize,
        }
        impl $id {
            /// Wrapped index.
            #[inline]
            pub fn get(self) -> usize {
                self.val
            }
        }
        impl From<usize> for $id {
            fn from(val: usize) -> Self {
                $id { val }
            }
        }
        impl ::std::ops::Deref for $id {
            type Target = usize;
            fn deref(&self) -> &usize {
                &self.val
            }
        }
        impl ::std::fmt::Display for $id {
            fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(fmt, "{}", self.val)
            }
        }

        $(#[$map_meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $map<T> {
            vec: Vec<T>,
        }
        impl<T> $map<T> {
            /// Empty map.
            pub fn new() -> Self {
                $map { vec: Vec::new() }
            }
            /// Map binding `len` keys to clones of `val`.
            pub fn of_elems(val: T, len: usize) -> Self
            where
                T: Clone,
            {
                $map { vec: vec![val; len] }
            }
            /// Number of elements.
            pub fn len(&self) -> usize {
                self.vec.len()
            }
            /// True if the map is empty.
            pub fn is_empty(&self) -> bool {
                self.vec.is_empty()
            }
            /// Pushes a new binding, returns its key.
            pub fn push(&mut self, val: T) -> $id {
                self.vec.push(val);
                (self.vec.len() - 1).into()
            }
            /// Iterator over the values.
            pub fn iter(&self) -> ::std::slice::Iter<T> {
                self.vec.iter()
            }
            /// Iterator over key/value pairs.
            pub fn index_iter(&self) -> impl Iterator<Item = ($id, &T)> {
                self.vec.iter().enumerate().map(
                    |(idx, val)| (idx.into(), val)
                )
            }
        }
        impl<T> Default for $map<T> {
            fn default() -> Self {
                Self::new()
            }
        }
        impl<T> From<Vec<T>> for $map<T> {
            fn from(vec: Vec<T>) -> Self {
                $map { vec }
            }
        }
        impl<T> ::std::ops::Index<$id> for $map<T> {
            type Output = T;
            fn index(&self, idx: $id) -> &T {
                &self.vec[idx.val]
            }
        }
        impl<T> ::std::ops::IndexMut<$id> for $map<T> {
            fn index_mut(&mut self, idx: $id) -> &mut T {
                &mut self.vec[idx.val]
            }
        }
    );
}
