
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Stop    =  0,
    Void    =  1,
    Bool    =  2,
    Byte    =  3,
    Double  =  4,
    I16     =  6,
    I32     =  8,
    I64     = 10,
    String  = 11,
    Struct  = 12,
    Map     = 13,
    Set     = 14,
    List    = 15,
    // enum values travel as I32, this code is never valid on the wire.
    Enum    = 16,
}

pub const TYPE_STOP:   u8 =  0;
pub const TYPE_VOID:   u8 =  1;
pub const TYPE_BOOL:   u8 =  2;
pub const TYPE_BYTE:   u8 =  3;
pub const TYPE_DOUBLE: u8 =  4;
pub const TYPE_I16:    u8 =  6;
pub const TYPE_I32:    u8 =  8;
pub const TYPE_I64:    u8 = 10;
pub const TYPE_STRING: u8 = 11;
pub const TYPE_STRUCT: u8 = 12;
pub const TYPE_MAP:    u8 = 13;
pub const TYPE_SET:    u8 = 14;
pub const TYPE_LIST:   u8 = 15;
pub const TYPE_ENUM:   u8 = 16;


impl TypeTag {
    pub fn from_u8(code: u8) -> Option<TypeTag> {
        use TypeTag::*;
        Some(match code {
            TYPE_STOP   => Stop,
            TYPE_VOID   => Void,
            TYPE_BOOL   => Bool,
            TYPE_BYTE   => Byte,
            TYPE_DOUBLE => Double,
            TYPE_I16    => I16,
            TYPE_I32    => I32,
            TYPE_I64    => I64,
            TYPE_STRING => String,
            TYPE_STRUCT => Struct,
            TYPE_MAP    => Map,
            TYPE_SET    => Set,
            TYPE_LIST   => List,
            TYPE_ENUM   => Enum,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether a value of this type can be decoded (or skipped) as the
    /// element of a list, set or map.
    pub fn is_decodable(self) -> bool {
        use TypeTag::*;
        match self {
            Bool | Byte | I16 | I32 | I64 | Double
            | String | Struct | Map | Set | List => true,

            Stop | Void | Enum => false,
        }
    }

    /// Smallest number of bytes a value of this type occupies on the wire.
    ///
    /// Strings and containers count their length prefix/header only, a
    /// struct counts its terminating stop byte. Sentinels take no bytes.
    pub fn min_encoded_size(self) -> usize {
        use TypeTag::*;
        match self {
            Bool | Byte     => 1,
            I16             => 2,
            I32             => 4,
            I64 | Double    => 8,
            String          => 4,
            Struct          => 1,
            Set | List      => 5,
            Map             => 6,
            Stop | Void | Enum => 0,
        }
    }
}

/// Raw wire code check, accepts unknown codes and answers `false`.
pub fn is_decodable_code(code: u8) -> bool {
    TypeTag::from_u8(code).map_or(false, TypeTag::is_decodable)
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TypeTag::*;
        let name = match self {
            Stop   => "STOP",
            Void   => "VOID",
            Bool   => "BOOL",
            Byte   => "BYTE",
            Double => "DOUBLE",
            I16    => "I16",
            I32    => "I32",
            I64    => "I64",
            String => "STRING",
            Struct => "STRUCT",
            Map    => "MAP",
            Set    => "SET",
            List   => "LIST",
            Enum   => "ENUM",
        };
        f.write_str(name)
    }
}
