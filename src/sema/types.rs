/// Canonical semantic type, the closed enumeration from the data model.
/// `Custom` covers every user-defined shape (array, record, enum, set,
/// bounded string, alias) by name; the analyzer's [`super::registry::TypeRegistry`]
/// holds the shape behind that name. `Pointer` and `FileType` carry their
/// pointee/element recursively since pointer-to-pointer and file-of-file
/// show up in real declarations and the emitter needs the full chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    Integer,
    Real,
    Boolean,
    Char,
    Byte,
    Str,
    Void,
    Custom(String),
    Pointer(Box<DataType>),
    FileType(Box<Option<DataType>>),
    Unknown,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Real)
    }

    pub fn is_ordinal(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Char | DataType::Boolean)
            || matches!(self, DataType::Custom(_))
    }

    /// Structural compatibility used for `=`/`<>` and parameter matching:
    /// identical types are compatible, and integer widens to real.
    pub fn is_compatible_with(&self, other: &DataType) -> bool {
        self == other
            || (self == &DataType::Integer && other == &DataType::Real)
            || (self == &DataType::Real && other == &DataType::Integer)
    }

    /// Arithmetic result type per §4.3: real if either operand is real,
    /// else integer. Caller has already checked both operands are numeric.
    pub fn arithmetic_result(lhs: &DataType, rhs: &DataType) -> DataType {
        if *lhs == DataType::Real || *rhs == DataType::Real {
            DataType::Real
        } else {
            DataType::Integer
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Integer => write!(f, "integer"),
            DataType::Real => write!(f, "real"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Char => write!(f, "char"),
            DataType::Byte => write!(f, "byte"),
            DataType::Str => write!(f, "string"),
            DataType::Void => write!(f, "void"),
            DataType::Custom(name) => write!(f, "{name}"),
            DataType::Pointer(inner) => write!(f, "^{inner}"),
            DataType::FileType(inner) => match inner.as_ref() {
                Some(t) => write!(f, "file of {t}"),
                None => write!(f, "file"),
            },
            DataType::Unknown => write!(f, "<unknown>"),
        }
    }
}
