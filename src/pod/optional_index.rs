use bytemuck::{Pod, Zeroable};
use std::fmt::{Debug, Display};

use crate::pod::Nullable;

/// Unsigned integer types that can be used as an index with a reserved
/// "absent" value.
pub trait IndexSentinel: Pod + Default + PartialEq + Debug {
    const NONE_VALUE: Self;

    /// Widens the index to `usize`.
    fn to_usize(self) -> usize;

    /// Narrows a `usize` index, returning `None` when it does not fit or
    /// collides with the sentinel.
    fn from_usize(index: usize) -> Option<Self>;
}

macro_rules! impl_index_sentinel {
    ($($t:ty),*) => {
        $(
            impl IndexSentinel for $t {
                const NONE_VALUE: Self = <$t>::MAX;

                #[inline(always)]
                fn to_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(index: usize) -> Option<Self> {
                    <$t>::try_from(index).ok().filter(|i| *i != Self::NONE_VALUE)
                }
            }
        )*
    };
}

impl_index_sentinel!(u16, u32, u64);

/// An optional index stored in the space of the index itself.
///
/// The maximum value of `T` marks the slot as empty, so a table of
/// `OptionalIndex<u32>` is a plain `[u32]` as far as the memory layout goes.
#[repr(transparent)]
#[derive(Copy, Clone, Pod, Zeroable, PartialEq, Eq, Hash)]
pub struct OptionalIndex<T> {
    value: T,
}

impl<T: IndexSentinel> Default for OptionalIndex<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: IndexSentinel> OptionalIndex<T> {
    #[inline]
    pub fn new(value: Option<T>) -> Self {
        Self {
            value: value.unwrap_or(T::NONE_VALUE),
        }
    }

    #[inline]
    pub fn some(value: T) -> Self {
        assert_ne!(value, T::NONE_VALUE, "Cannot use sentinel value as Some");
        Self { value }
    }

    #[inline]
    pub fn none() -> Self {
        Self {
            value: T::NONE_VALUE,
        }
    }

    /// Builds an index from a `usize`, panicking if it cannot be represented.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        match T::from_usize(index) {
            Some(value) => Self { value },
            None => panic!("index {index} cannot be represented"),
        }
    }

    #[inline]
    pub fn value(&self) -> Option<T> {
        if self.value != T::NONE_VALUE {
            Some(self.value)
        } else {
            None
        }
    }

    /// Returns the index widened to `usize`, if one is set.
    #[inline]
    pub fn get(&self) -> Option<usize> {
        self.value().map(T::to_usize)
    }

    #[inline]
    pub fn set(&mut self, value: Option<T>) {
        if let Some(v) = value {
            assert_ne!(v, T::NONE_VALUE, "Cannot use sentinel value as Some");
        }

        self.value = value.unwrap_or(T::NONE_VALUE);
    }

    #[inline]
    pub fn take(&mut self) -> Option<T> {
        let result = self.value();
        self.value = T::NONE_VALUE;
        result
    }
}

impl<T: IndexSentinel> Nullable for OptionalIndex<T> {
    #[inline]
    fn is_some(&self) -> bool {
        self.value != T::NONE_VALUE
    }

    #[inline]
    fn is_none(&self) -> bool {
        self.value == T::NONE_VALUE
    }
}

impl<T: IndexSentinel> From<Option<T>> for OptionalIndex<T> {
    fn from(value: Option<T>) -> Self {
        Self::new(value)
    }
}

impl<T: IndexSentinel> From<OptionalIndex<T>> for Option<T> {
    fn from(opt: OptionalIndex<T>) -> Self {
        opt.value()
    }
}

impl<T: IndexSentinel> Debug for OptionalIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            Some(v) => write!(f, "Some({:?})", v),
            None => write!(f, "None"),
        }
    }
}

impl<T: IndexSentinel + Display> Display for OptionalIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "None"),
        }
    }
}

pub type OptionalU16 = OptionalIndex<u16>;
pub type OptionalU32 = OptionalIndex<u32>;
pub type OptionalU64 = OptionalIndex<u64>;
