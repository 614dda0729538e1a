//! Lock-free numeric cells.
//!
//! Every cell stores its value as raw 64-bit words in an `AtomicU64`, so the
//! same compare-and-swap loop serves floats and integers. Readers never block
//! and writers retry only when another writer won the race.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicU64, Ordering};

/// A 64-bit value that round-trips through a `u64` bit pattern.
pub trait CellValue: Copy {
    fn into_bits(self) -> u64;
    fn from_bits(bits: u64) -> Self;
}

impl CellValue for f64 {
    #[inline]
    fn into_bits(self) -> u64 {
        self.to_bits()
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

impl CellValue for u64 {
    #[inline]
    fn into_bits(self) -> u64 {
        self
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits
    }
}

impl CellValue for i64 {
    #[inline]
    fn into_bits(self) -> u64 {
        self as u64
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits as i64
    }
}

/// Atomic cell with optimistic (CAS retry) updates.
pub struct AtomicCell<T: CellValue> {
    bits: AtomicU64,
    _value: PhantomData<T>,
}

/// Floating point cell used for counters, gauges and sums.
pub type AtomicF64 = AtomicCell<f64>;

/// Integer cell used for observation counts.
pub type AtomicCount = AtomicCell<u64>;

impl<T: CellValue> AtomicCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            bits: AtomicU64::new(value.into_bits()),
            _value: PhantomData,
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> T {
        T::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Unconditionally replace the value.
    #[inline]
    pub fn set(&self, value: T) {
        self.bits.store(value.into_bits(), Ordering::Release);
    }

    /// Atomically replace the value with `f(current, arg)` and return the
    /// value that was published.
    ///
    /// `f` may run more than once under contention, so it must be pure.
    pub fn modify<A: Copy>(&self, f: impl Fn(T, A) -> T, arg: A) -> T {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = f(T::from_bits(current), arg);
            match self.bits.compare_exchange_weak(
                current,
                next.into_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}

impl<T: CellValue + Add<Output = T>> AtomicCell<T> {
    /// Add `delta`, returning the new value.
    #[inline]
    pub fn increment(&self, delta: T) -> T {
        self.modify(|n, m| n + m, delta)
    }
}

impl<T: CellValue + Sub<Output = T>> AtomicCell<T> {
    /// Subtract `delta`, returning the new value.
    #[inline]
    pub fn decrement(&self, delta: T) -> T {
        self.modify(|n, m| n - m, delta)
    }
}

impl<T: CellValue + Default> Default for AtomicCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: CellValue + fmt::Debug> fmt::Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCell").field(&self.get()).finish()
    }
}
