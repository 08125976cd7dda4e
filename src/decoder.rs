use crate::reader::Reader;
use crate::error::{Error, Result};
use crate::wire_type::*;


pub const DEFAULT_MAX_SKIP_DEPTH: usize = 64;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Set,
    Map,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::List => f.write_str("list"),
            ContainerKind::Set  => f.write_str("set"),
            ContainerKind::Map  => f.write_str("map"),
        }
    }
}


// type codes stay raw bytes: a header read off the wire may carry codes
// that are not valid `TypeTag`s.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub elem_type: u8,
    pub size: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeader {
    pub elem_type: u8,
    pub size: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub key_type: u8,
    pub value_type: u8,
    pub size: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    pub field_type: u8,
    pub id: i16,
}

impl ListHeader {
    pub fn kind(&self) -> ContainerKind { ContainerKind::List }
    pub fn elem_tag(&self) -> Option<TypeTag> { TypeTag::from_u8(self.elem_type) }
}

impl SetHeader {
    pub fn kind(&self) -> ContainerKind { ContainerKind::Set }
    pub fn elem_tag(&self) -> Option<TypeTag> { TypeTag::from_u8(self.elem_type) }
}

impl MapHeader {
    pub fn kind(&self) -> ContainerKind { ContainerKind::Map }
    pub fn key_tag(&self) -> Option<TypeTag> { TypeTag::from_u8(self.key_type) }
    pub fn value_tag(&self) -> Option<TypeTag> { TypeTag::from_u8(self.value_type) }
}

impl FieldHeader {
    pub fn is_stop(&self) -> bool { self.field_type == TYPE_STOP }
}



/// The primitive read operations of the binary protocol.
///
/// `'de` is the lifetime of the input, strings and binaries are borrowed
/// from it.
pub trait Protocol<'de> {
    fn read_struct_begin(&mut self) -> Result<()>;
    fn read_struct_end(&mut self) -> Result<()>;

    fn read_field_begin(&mut self) -> Result<FieldHeader>;
    fn read_field_end(&mut self) -> Result<()>;

    fn read_list_begin(&mut self) -> Result<ListHeader>;
    fn read_list_end(&mut self) -> Result<()>;

    fn read_set_begin(&mut self) -> Result<SetHeader>;
    fn read_set_end(&mut self) -> Result<()>;

    fn read_map_begin(&mut self) -> Result<MapHeader>;
    fn read_map_end(&mut self) -> Result<()>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_binary(&mut self) -> Result<&'de [u8]>;
    fn read_string(&mut self) -> Result<&'de str>;
}



/// Plain binary protocol decoder over an in-memory buffer.
///
/// Reads exactly what the header bytes say and checks nothing about
/// container headers. Wrap it in a `GuardedDecoder` before feeding it
/// untrusted input.
pub struct BinaryDecoder<'buf> {
    reader: Reader<'buf>,
}

impl<'buf> BinaryDecoder<'buf> {
    pub fn new(buffer: &'buf [u8]) -> BinaryDecoder<'buf> {
        BinaryDecoder { reader: Reader::new(buffer) }
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    pub fn position(&self) -> usize {
        self.reader.cursor
    }

    pub fn has_some(&self) -> bool {
        self.reader.has_some()
    }

    fn eof(&self, needed: usize) -> Error {
        Error::UnexpectedEof { needed, remaining: self.reader.remaining() }
    }

    fn read_tag(&mut self) -> Result<u8> {
        self.reader.next_u8().ok_or_else(|| self.eof(1))
    }
}

impl<'buf> Protocol<'buf> for BinaryDecoder<'buf> {
    fn read_struct_begin(&mut self) -> Result<()> { Ok(()) }
    fn read_struct_end(&mut self) -> Result<()> { Ok(()) }

    fn read_field_begin(&mut self) -> Result<FieldHeader> {
        let field_type = self.read_tag()?;
        if field_type == TYPE_STOP {
            return Ok(FieldHeader { field_type, id: 0 });
        }
        let id = self.read_i16()?;
        Ok(FieldHeader { field_type, id })
    }

    fn read_field_end(&mut self) -> Result<()> { Ok(()) }

    fn read_list_begin(&mut self) -> Result<ListHeader> {
        let elem_type = self.read_tag()?;
        let size = self.read_i32()?;
        Ok(ListHeader { elem_type, size })
    }

    fn read_list_end(&mut self) -> Result<()> { Ok(()) }

    fn read_set_begin(&mut self) -> Result<SetHeader> {
        let elem_type = self.read_tag()?;
        let size = self.read_i32()?;
        Ok(SetHeader { elem_type, size })
    }

    fn read_set_end(&mut self) -> Result<()> { Ok(()) }

    fn read_map_begin(&mut self) -> Result<MapHeader> {
        let key_type   = self.read_tag()?;
        let value_type = self.read_tag()?;
        let size = self.read_i32()?;
        Ok(MapHeader { key_type, value_type, size })
    }

    fn read_map_end(&mut self) -> Result<()> { Ok(()) }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    fn read_byte(&mut self) -> Result<i8> {
        self.reader.next_i8().ok_or_else(|| self.eof(1))
    }

    fn read_i16(&mut self) -> Result<i16> {
        self.reader.next_i16_be().ok_or_else(|| self.eof(2))
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.reader.next_i32_be().ok_or_else(|| self.eof(4))
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.reader.next_i64_be().ok_or_else(|| self.eof(8))
    }

    fn read_double(&mut self) -> Result<f64> {
        self.reader.next_f64_be().ok_or_else(|| self.eof(8))
    }

    fn read_binary(&mut self) -> Result<&'buf [u8]> {
        let length = self.read_i32()?;
        let size: usize = length.try_into().map_err(|_| Error::NegativeLength(length))?;
        self.reader.next_n(size).ok_or_else(|| self.eof(size))
    }

    fn read_string(&mut self) -> Result<&'buf str> {
        let bytes = self.read_binary()?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }
}



/// Consumes one value of wire type `ty` without materializing it.
pub fn skip<'de, P: Protocol<'de> + ?Sized>(protocol: &mut P, ty: u8) -> Result<()> {
    skip_with_depth(protocol, ty, DEFAULT_MAX_SKIP_DEPTH)
}

pub fn skip_with_depth<'de, P: Protocol<'de> + ?Sized>(protocol: &mut P, ty: u8, max_depth: usize) -> Result<()> {
    _skip(protocol, ty, 0, max_depth)
}

fn _skip<'de, P: Protocol<'de> + ?Sized>(protocol: &mut P, ty: u8, depth: usize, max_depth: usize) -> Result<()> {
    if depth >= max_depth {
        tracing::debug!(depth, max_depth, "skip depth limit exceeded");
        return Err(Error::DepthLimitExceeded(max_depth));
    }

    let tag = TypeTag::from_u8(ty).ok_or(Error::UnknownType(ty))?;

    use TypeTag::*;
    match tag {
        Bool   => { protocol.read_bool()?; },
        Byte   => { protocol.read_byte()?; },
        I16    => { protocol.read_i16()?; },
        I32    => { protocol.read_i32()?; },
        I64    => { protocol.read_i64()?; },
        Double => { protocol.read_double()?; },
        String => { protocol.read_binary()?; },

        Struct => {
            protocol.read_struct_begin()?;
            loop {
                let field = protocol.read_field_begin()?;
                if field.is_stop() {
                    break;
                }
                _skip(protocol, field.field_type, depth + 1, max_depth)?;
                protocol.read_field_end()?;
            }
            protocol.read_struct_end()?;
        },

        Map => {
            let header = protocol.read_map_begin()?;
            for _ in 0..header.size {
                _skip(protocol, header.key_type,   depth + 1, max_depth)?;
                _skip(protocol, header.value_type, depth + 1, max_depth)?;
            }
            protocol.read_map_end()?;
        },

        Set => {
            let header = protocol.read_set_begin()?;
            for _ in 0..header.size {
                _skip(protocol, header.elem_type, depth + 1, max_depth)?;
            }
            protocol.read_set_end()?;
        },

        List => {
            let header = protocol.read_list_begin()?;
            for _ in 0..header.size {
                _skip(protocol, header.elem_type, depth + 1, max_depth)?;
            }
            protocol.read_list_end()?;
        },

        Stop | Void | Enum => { return Err(Error::UnknownType(ty)); },
    }

    Ok(())
}
