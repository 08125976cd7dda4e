
#[derive(Clone)]
pub struct Reader<'buf> {
    pub buffer: &'buf [u8],
    pub cursor: usize,
}

impl<'rdr> Reader<'rdr> {
    pub fn new(buffer: &'rdr [u8]) -> Reader<'rdr> {
        Reader { buffer, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn has_some(&self) -> bool {
        self.cursor < self.buffer.len()
    }


    pub fn has_n(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    pub fn peek_n(&self, n: usize) -> Option<&'rdr [u8]> {
        if self.has_n(n) {
            return Some(&self.buffer[self.cursor .. self.cursor + n]);
        }
        None
    }

    pub fn next_n(&mut self, n: usize) -> Option<&'rdr [u8]> {
        self.peek_n(n).map(|result| {
            self.cursor += n;
            result
        })
    }

    pub fn next_bytes<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut bytes = [0; N];
        bytes.copy_from_slice(self.next_n(N)?);
        Some(bytes)
    }


    // the binary protocol is big-endian throughout.

    pub fn next_u8(&mut self)     -> Option<u8>  { self.next_bytes::<1>().map(u8::from_be_bytes) }
    pub fn next_i8(&mut self)     -> Option<i8>  { self.next_bytes::<1>().map(i8::from_be_bytes) }
    pub fn next_i16_be(&mut self) -> Option<i16> { self.next_bytes::<2>().map(i16::from_be_bytes) }
    pub fn next_i32_be(&mut self) -> Option<i32> { self.next_bytes::<4>().map(i32::from_be_bytes) }
    pub fn next_i64_be(&mut self) -> Option<i64> { self.next_bytes::<8>().map(i64::from_be_bytes) }
    pub fn next_f64_be(&mut self) -> Option<f64> { self.next_bytes::<8>().map(f64::from_be_bytes) }
}
