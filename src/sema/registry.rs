use std::collections::HashMap;

use super::types::DataType;

/// The structural detail behind a [`DataType::Custom`] name. `DataType`
/// itself stays a closed, shallow enum; a type's actual shape — fields,
/// dimensions, members — lives here, keyed by the name under which the
/// type was declared.
#[derive(Debug, Clone)]
pub enum TypeShape {
    Alias(DataType),
    Array {
        /// One `(lower, upper)` per dimension, in declaration order.
        bounds: Vec<(i64, i64)>,
        element: DataType,
    },
    Record {
        fields: Vec<(String, DataType)>,
        /// Variant-case fields, flattened: every field from every case
        /// coexists (no discriminant enforcement), matching §4.4's note
        /// that variant records aren't given a runtime tag.
        variant_fields: Vec<(String, DataType)>,
    },
    Enum {
        members: Vec<String>,
    },
    Set {
        element: DataType,
    },
    BoundedString {
        size: Option<u32>,
    },
    Pointer {
        pointee: DataType,
    },
}

/// Maps a declared type name to its shape. Populated during the
/// declaration pass and consulted for the rest of analysis and by the
/// emitter.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    shapes: HashMap<String, TypeShape>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    pub fn define(&mut self, name: impl Into<String>, shape: TypeShape) {
        self.shapes.insert(name.into(), shape);
    }

    pub fn shape(&self, name: &str) -> Option<&TypeShape> {
        self.shapes.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// Iterates every registered shape in insertion-independent (hash map)
    /// order. The emitter is responsible for ordering declarations so a
    /// type that refers to another by name comes after it; see
    /// `emit::types::emit_type_declarations`.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeShape)> {
        self.shapes.iter()
    }

    /// Enum ordinal of a member, searching every registered enum type.
    /// Used to resolve bare enum-member identifiers in expression and
    /// range-bound position.
    pub fn enum_ordinal(&self, member: &str) -> Option<(String, i64)> {
        for (name, shape) in &self.shapes {
            if let TypeShape::Enum { members } = shape {
                if let Some(pos) = members.iter().position(|m| m == member) {
                    return Some((name.clone(), pos as i64));
                }
            }
        }
        None
    }

    /// Fully resolves a `Custom` type down to a built-in `DataType`,
    /// following alias chains, for contexts that need a concrete shape
    /// rather than a name (e.g. arithmetic result typing).
    pub fn resolve(&self, data_type: &DataType) -> DataType {
        let mut current = data_type.clone();
        let mut hops = 0;
        while let DataType::Custom(name) = &current {
            hops += 1;
            if hops > 64 {
                break; // defensive: a cyclic alias chain shouldn't hang analysis
            }
            match self.shapes.get(name) {
                Some(TypeShape::Alias(inner)) => current = inner.clone(),
                Some(TypeShape::Enum { .. }) => break,
                _ => break,
            }
        }
        current
    }
}
