use crate::typeck::types::{Method, MicaType, TypeTable};

/// Whether a value of type `x` could plausibly be confused with one of type
/// `y`. This is deliberately looser than identity and not symmetric: an
/// interface with methods counts as similar to any type whose method set
/// covers it, so a narrower interface is similar to a wider one but not the
/// reverse.
pub fn similar(table: &TypeTable, x: &MicaType, y: &MicaType) -> bool {
    match x {
        MicaType::Pointer(xi) => match y {
            MicaType::Pointer(yi) => similar(table, xi, yi),
            _ => false,
        },
        MicaType::Named(xn) => {
            if let MicaType::Named(yn) = y {
                if xn == yn {
                    return true;
                }
            }
            let Some(ux) = table.lookup_underlying(xn) else { return false };
            let uy = match y {
                MicaType::Named(yn) => match table.lookup_underlying(yn) {
                    Some(u) => u,
                    None => return false,
                },
                other => other,
            };
            similar(table, ux, uy)
        }
        MicaType::Interface(methods) => {
            // An empty interface says nothing about the value, so it never
            // counts as similar, not even to another empty interface.
            if methods.is_empty() {
                return false;
            }
            let ys = method_set(table, y);
            methods
                .iter()
                .all(|m| ys.iter().any(|ym| ym.name == m.name && ym.sig == m.sig))
        }
        // Structs match only structurally, and only against a bare struct
        // type, not a named one.
        MicaType::Struct(_) => x == y,
        _ => false,
    }
}

/// The callable method set of `t`: one pointer level is stripped, named
/// types contribute only their receiver methods, interfaces contribute
/// their declared (flattened) methods.
pub fn method_set(table: &TypeTable, t: &MicaType) -> Vec<Method> {
    let t = match t {
        MicaType::Pointer(inner) => inner,
        other => other,
    };
    match t {
        MicaType::Named(name) => table.receiver_methods(name).to_vec(),
        MicaType::Interface(methods) => methods.clone(),
        _ => Vec::new(),
    }
}
