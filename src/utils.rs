use std::convert::AsRef;
use std::ops;
use std::ops::Deref;

/// A container for owned or borrowed packet data
///
/// Packets read sequentially borrow the reader buffer, packets read at a
/// given offset own their data. Comparisons only look at the bytes.
#[derive(Clone, Debug)]
pub enum Data<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl<'a> Data<'a> {
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Data::Owned(o) => o.deref(),
            Data::Borrowed(b) => b,
        }
    }
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Data::Owned(o) => o.len(),
            Data::Borrowed(b) => b.len(),
        }
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Copy borrowed data, so the result does not depend on the reader buffer
    pub fn into_owned(self) -> Data<'static> {
        match self {
            Data::Owned(o) => Data::Owned(o),
            Data::Borrowed(b) => Data::Owned(b.to_vec()),
        }
    }
}

impl<'a, 'b> PartialEq<Data<'b>> for Data<'a> {
    fn eq(&self, other: &Data<'b>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<'a> Eq for Data<'a> {}

impl<'a> AsRef<[u8]> for Data<'a> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

macro_rules! impl_index {
    ($t:ident, $index_t:ty, $output_t:ty) => {
        impl<'p> ops::Index<$index_t> for $t<'p> {
            type Output = $output_t;
            #[inline]
            fn index(&self, index: $index_t) -> &$output_t {
                &self.as_slice()[index]
            }
        }
    };
}

impl_index!(Data, usize, u8);
impl_index!(Data, ops::Range<usize>, [u8]);
impl_index!(Data, ops::RangeTo<usize>, [u8]);
impl_index!(Data, ops::RangeFrom<usize>, [u8]);
impl_index!(Data, ops::RangeFull, [u8]);

/// Read as many bytes as possible into `buf`
///
/// Unlike `read_exact`, this reports how many bytes were read before EOF, so
/// callers can tell a clean EOF (0 bytes) from a truncated read.
pub(crate) fn read_full<R: std::io::Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => (),
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
