use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// DeliveryTag is a reference-counted, sliceable view of delivery tag bytes.
///
/// It holds an `Arc<[u8]>` plus a (start, len) view so a tag can be cut out of
/// a larger buffer without copying. Equality and hashing only consider the
/// viewed bytes, so two tags built from different buffers compare equal when
/// their contents do.
#[derive(Clone)]
pub struct DeliveryTag {
    data: Arc<[u8]>,
    start: usize,
    len: usize,
}

impl DeliveryTag {
    /// Creates a new tag from a Vec by taking ownership.
    pub fn from_vec(vec: Vec<u8>) -> Self {
        let arc: Arc<[u8]> = Arc::from(vec.into_boxed_slice());
        let len = arc.len();
        Self { data: arc, start: 0, len }
    }

    /// Creates a tag covering the whole of an `Arc<[u8]>`.
    pub fn from_arc(data: Arc<[u8]>) -> Self {
        let len = data.len();
        Self { data, start: 0, len }
    }

    /// Creates a sub-slice view into the current tag without copying.
    /// Returns `None` if the requested range is out of bounds.
    pub fn slice(&self, start: usize, len: usize) -> Option<Self> {
        let end = start.checked_add(len)?;
        if end > self.len {
            return None;
        }
        Some(Self { data: self.data.clone(), start: self.start + start, len })
    }

    /// Returns the current view as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len]
    }

    /// Returns the length of the tag in octets.
    pub fn len(&self) -> usize { self.len }

    /// Returns true if the tag is empty.
    pub fn is_empty(&self) -> bool { self.len == 0 }
}

impl PartialEq for DeliveryTag {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for DeliveryTag {}

impl Hash for DeliveryTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl fmt::Debug for DeliveryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeliveryTag(")?;
        for byte in self.as_slice() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<u8>> for DeliveryTag {
    fn from(v: Vec<u8>) -> Self { Self::from_vec(v) }
}

impl From<&[u8]> for DeliveryTag {
    fn from(v: &[u8]) -> Self { Self::from_vec(v.to_vec()) }
}

impl<const N: usize> From<&[u8; N]> for DeliveryTag {
    fn from(v: &[u8; N]) -> Self { Self::from_vec(v.to_vec()) }
}

impl From<&str> for DeliveryTag {
    fn from(v: &str) -> Self { Self::from_vec(v.as_bytes().to_vec()) }
}

impl From<Arc<[u8]>> for DeliveryTag {
    fn from(a: Arc<[u8]>) -> Self { Self::from_arc(a) }
}

impl AsRef<[u8]> for DeliveryTag {
    fn as_ref(&self) -> &[u8] { self.as_slice() }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_slice_shares_bytes() {
        let tag = DeliveryTag::from(b"delivery-1");
        let sliced = tag.slice(9, 1).unwrap();
        assert_eq!(sliced.as_slice(), b"1");
        assert!(tag.slice(5, 10).is_none());
        assert!(tag.slice(usize::MAX, 2).is_none());
    }

    #[test]
    fn test_equality_ignores_backing_buffer() {
        let whole = DeliveryTag::from(b"xxtagxx");
        let view = whole.slice(2, 3).unwrap();
        let owned = DeliveryTag::from("tag");
        assert_eq!(view, owned);

        let mut set = HashSet::new();
        set.insert(view);
        assert!(set.contains(&owned));
    }

    #[test]
    fn test_debug_is_hex() {
        let tag = DeliveryTag::from(vec![0x01, 0xab]);
        assert_eq!(format!("{:?}", tag), "DeliveryTag(01ab)");
    }
}
