/// Knobs the emitter reads while lowering a checked AST to C++ text.
/// Kept tiny and `Copy`-free (the runtime header path is caller-owned)
/// since the driver constructs one per compilation and nothing downstream
/// needs to mutate it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of spaces per indent level in emitted C++.
    pub indent_width: usize,
    /// Path written into the `#include` directive for the runtime support
    /// header (§6); never compiled by this crate, only referenced.
    pub runtime_header: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent_width: 4,
            runtime_header: "runtime/pasrt.hpp".to_string(),
        }
    }
}
