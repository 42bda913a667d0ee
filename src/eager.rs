//! Finite, indexable, in-memory sequences.
//!
//! Two flavors, differing only in whether the four structural mutators
//! (`append`, `prepend`, `insert`, `concat`) edit in place or hand back a
//! fresh, structurally-shared copy:
//!
//! - [`EagerSequence`] mutates in place.
//! - [`ImmutableEagerSequence`] is copy-on-write: every mutator returns a
//!   new handle, and the underlying buffer is only actually duplicated once
//!   more than one handle observes it (`Rc::make_mut`).

use std::rc::Rc;

use crate::error::{Error, Result};

fn check_get(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::OutOfRange {
            index,
            length: len.to_string(),
        });
    }
    Ok(())
}

fn check_insert(index: usize, len: usize) -> Result<()> {
    if index > len {
        return Err(Error::OutOfRange {
            index,
            length: len.to_string(),
        });
    }
    Ok(())
}

/// Mutable, in-place-editing eager sequence.
#[derive(Debug, Clone, Default)]
pub struct EagerSequence<T> {
    buf: Vec<T>,
}

impl<T> EagerSequence<T> {
    pub fn new() -> Self {
        EagerSequence { buf: Vec::new() }
    }

    pub fn from_vec(buf: Vec<T>) -> Self {
        EagerSequence { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        check_get(index, self.buf.len())?;
        Ok(&self.buf[index])
    }

    pub fn first(&self) -> Result<&T> {
        self.buf.first().ok_or(Error::OutOfRange {
            index: 0,
            length: "0".into(),
        })
    }

    pub fn last(&self) -> Result<&T> {
        self.buf.last().ok_or(Error::OutOfRange {
            index: 0,
            length: "0".into(),
        })
    }

    /// Inclusive on both ends: `lo..=hi`. Fails when `hi >= len || lo > hi`.
    pub fn subrange(&self, lo: usize, hi: usize) -> Result<Self>
    where
        T: Clone,
    {
        if hi >= self.buf.len() || lo > hi {
            return Err(Error::OutOfRange {
                index: hi,
                length: self.buf.len().to_string(),
            });
        }
        Ok(EagerSequence {
            buf: self.buf[lo..=hi].to_vec(),
        })
    }

    pub fn append(&mut self, v: T) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn prepend(&mut self, v: T) -> &mut Self {
        self.buf.insert(0, v);
        self
    }

    pub fn insert(&mut self, v: T, index: usize) -> Result<&mut Self> {
        check_insert(index, self.buf.len())?;
        self.buf.insert(index, v);
        Ok(self)
    }

    pub fn resize(&mut self, new_len: usize, value: T) -> &mut Self
    where
        T: Clone,
    {
        self.buf.resize(new_len, value);
        self
    }

    pub fn concat(&mut self, other: &Self) -> &mut Self
    where
        T: Clone,
    {
        self.buf.extend_from_slice(&other.buf);
        self
    }

    pub fn into_vec(self) -> Vec<T> {
        self.buf
    }
}

impl<T: Clone> EagerSequence<T> {
    /// Preallocated, zero-initialized by cloning `fill` `size` times.
    pub fn with_size(size: usize, fill: T) -> Self {
        EagerSequence {
            buf: vec![fill; size],
        }
    }
}

/// Copy-on-write eager sequence: every structural mutator returns a new
/// handle. The backing buffer is shared via `Rc` until the first divergent
/// mutation, at which point `Rc::make_mut` clones it.
#[derive(Debug, Clone)]
pub struct ImmutableEagerSequence<T: Clone> {
    buf: Rc<Vec<T>>,
}

impl<T: Clone> Default for ImmutableEagerSequence<T> {
    fn default() -> Self {
        ImmutableEagerSequence { buf: Rc::new(Vec::new()) }
    }
}

impl<T: Clone> ImmutableEagerSequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(buf: Vec<T>) -> Self {
        ImmutableEagerSequence { buf: Rc::new(buf) }
    }

    pub fn with_size(size: usize, fill: T) -> Self {
        Self::from_vec(vec![fill; size])
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        check_get(index, self.buf.len())?;
        Ok(&self.buf[index])
    }

    pub fn first(&self) -> Result<&T> {
        self.buf.first().ok_or(Error::OutOfRange {
            index: 0,
            length: "0".into(),
        })
    }

    pub fn last(&self) -> Result<&T> {
        self.buf.last().ok_or(Error::OutOfRange {
            index: 0,
            length: "0".into(),
        })
    }

    pub fn subrange(&self, lo: usize, hi: usize) -> Result<Self> {
        if hi >= self.buf.len() || lo > hi {
            return Err(Error::OutOfRange {
                index: hi,
                length: self.buf.len().to_string(),
            });
        }
        Ok(Self::from_vec(self.buf[lo..=hi].to_vec()))
    }

    pub fn append(&self, v: T) -> Self {
        let mut out = (*self.buf).clone();
        out.push(v);
        Self::from_vec(out)
    }

    pub fn prepend(&self, v: T) -> Self {
        let mut out = Vec::with_capacity(self.buf.len() + 1);
        out.push(v);
        out.extend_from_slice(&self.buf);
        Self::from_vec(out)
    }

    pub fn insert(&self, v: T, index: usize) -> Result<Self> {
        check_insert(index, self.buf.len())?;
        let mut out = (*self.buf).clone();
        out.insert(index, v);
        Ok(Self::from_vec(out))
    }

    pub fn concat(&self, other: &Self) -> Self {
        let mut out = (*self.buf).clone();
        out.extend_from_slice(&other.buf);
        Self::from_vec(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutable_mutators_edit_in_place() {
        let mut s = EagerSequence::from_vec(vec![1, 2, 3]);
        s.append(4).prepend(0);
        assert_eq!(s.as_slice(), &[0, 1, 2, 3, 4]);
        s.insert(99, 2).unwrap();
        assert_eq!(s.as_slice(), &[0, 1, 99, 2, 3, 4]);
    }

    #[test]
    fn mutable_bounds_checks() {
        let s = EagerSequence::from_vec(vec![1, 2, 3]);
        assert!(s.get(3).is_err());
        assert!(s.subrange(1, 3).is_err());
        assert!(s.subrange(2, 1).is_err());
        assert_eq!(s.subrange(0, 1).unwrap().as_slice(), &[1, 2]);
    }

    #[test]
    fn immutable_mutators_return_new_handles() {
        let a = ImmutableEagerSequence::from_vec(vec![1, 2, 3]);
        let b = a.append(4);
        assert_eq!(a.as_slice(), &[1, 2, 3]);
        assert_eq!(b.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn immutable_concat_preserves_operands() {
        let a = ImmutableEagerSequence::from_vec(vec![1, 2]);
        let b = ImmutableEagerSequence::from_vec(vec![3, 4]);
        let c = a.concat(&b);
        assert_eq!(c.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(a.as_slice(), &[1, 2]);
    }
}
