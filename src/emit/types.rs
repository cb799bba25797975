use std::collections::HashSet;
use std::fmt::Write as _;

use crate::sema::registry::{TypeRegistry, TypeShape};
use crate::sema::types::DataType;

/// Maps a checked [`DataType`] to the C++ spelling used everywhere a type
/// is written: declarations, casts, parameter lists. `Custom` names are
/// passed through verbatim — they already name a struct/enum/alias the
/// declaration pass below emits.
pub fn cpp_type_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Integer => "int".to_string(),
        DataType::Real => "double".to_string(),
        DataType::Boolean => "bool".to_string(),
        DataType::Char => "char".to_string(),
        DataType::Byte => "unsigned char".to_string(),
        DataType::Str => "std::string".to_string(),
        DataType::Void => "void".to_string(),
        DataType::Custom(name) => name.clone(),
        DataType::Pointer(inner) => format!("{}*", cpp_type_name(inner)),
        DataType::FileType(inner) => match inner.as_ref() {
            Some(t) => format!("pasrt::File<{}>", cpp_type_name(t)),
            None => "pasrt::File<void>".to_string(),
        },
        DataType::Unknown => "/* unresolved */ auto".to_string(),
    }
}

/// Emits a `struct`/`enum class`/`using` declaration for every registered
/// shape, in dependency order (a type is only emitted once every
/// `Custom` name it mentions has already been emitted), so a record
/// field or array element referring to another declared type compiles.
pub fn emit_type_declarations(out: &mut String, types: &TypeRegistry) {
    let mut emitted: HashSet<String> = HashSet::new();
    let mut remaining: Vec<(String, TypeShape)> =
        types.iter().map(|(n, s)| (n.clone(), s.clone())).collect();

    // Bounded rounds rather than a real topological sort: each round
    // emits everything whose dependencies are satisfied; a type that
    // never becomes satisfied (a genuine cycle) is flushed at the end as
    // a best-effort forward-referenced declaration.
    for _ in 0..remaining.len() + 1 {
        if remaining.is_empty() {
            break;
        }
        let mut next_round = Vec::new();
        for (name, shape) in remaining {
            if dependencies(&shape).iter().all(|d| emitted.contains(d)) {
                emit_one(out, &name, &shape);
                emitted.insert(name);
            } else {
                next_round.push((name, shape));
            }
        }
        remaining = next_round;
    }
    for (name, shape) in remaining {
        emit_one(out, &name, &shape);
    }
}

fn dependencies(shape: &TypeShape) -> Vec<String> {
    let mut deps = Vec::new();
    let mut note = |dt: &DataType| {
        if let DataType::Custom(n) = dt {
            deps.push(n.clone());
        }
    };
    match shape {
        TypeShape::Alias(dt) => note(dt),
        TypeShape::Array { element, .. } => note(element),
        TypeShape::Record { fields, variant_fields } => {
            fields.iter().for_each(|(_, t)| note(t));
            variant_fields.iter().for_each(|(_, t)| note(t));
        }
        TypeShape::Enum { .. } => {}
        TypeShape::Set { element } => note(element),
        TypeShape::BoundedString { .. } => {}
        TypeShape::Pointer { .. } => {} // pointer-to-incomplete-type is fine in C++
    }
    deps
}

fn emit_one(out: &mut String, name: &str, shape: &TypeShape) {
    match shape {
        TypeShape::Alias(dt) => {
            let _ = writeln!(out, "using {name} = {};", cpp_type_name(dt));
        }
        TypeShape::Enum { members } => {
            let _ = writeln!(out, "enum class {name} {{ {} }};", members.join(", "));
        }
        TypeShape::Record {
            fields,
            variant_fields,
        } => {
            let _ = writeln!(out, "struct {name} {{");
            for (field_name, field_type) in fields.iter().chain(variant_fields.iter()) {
                let _ = writeln!(out, "    {} {field_name};", cpp_type_name(field_type));
            }
            let _ = writeln!(out, "}};");
        }
        TypeShape::Array { bounds, element } => {
            // Row-major linearization: one flat std::array sized to the
            // product of per-dimension extents, indexed via the offset
            // helper the expression emitter generates at each access.
            let total: i64 = bounds.iter().map(|(lo, hi)| (hi - lo + 1).max(0)).product();
            let _ = writeln!(
                out,
                "using {name} = std::array<{}, {}>;",
                cpp_type_name(element),
                total.max(1)
            );
        }
        TypeShape::Set { element } => {
            let _ = writeln!(out, "using {name} = pasrt::Set<{}>;", cpp_type_name(element));
        }
        TypeShape::BoundedString { size } => {
            let n = size.unwrap_or(255);
            let _ = writeln!(out, "using {name} = pasrt::BoundedString<{n}>;");
        }
        TypeShape::Pointer { pointee } => {
            let _ = writeln!(out, "using {name} = {}*;", cpp_type_name(pointee));
        }
    }
}
