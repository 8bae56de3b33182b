// rdgen sample languages
//
// Each module includes the parser generated by `build.rs` from the grammar
// model of the same name under `grammars/`.

/// `hello world`, nothing else.
pub mod greeting {
    include!(concat!(env!("OUT_DIR"), "/greeting.rs"));
}

/// Optionally negative digit strings.
pub mod number {
    include!(concat!(env!("OUT_DIR"), "/number.rs"));
}

/// Integer and string literals behind the `Value` capability.
pub mod literals {
    include!(concat!(env!("OUT_DIR"), "/literals.rs"));
}

/// `key = digits` pairs.
pub mod pairs {
    include!(concat!(env!("OUT_DIR"), "/pairs.rs"));
}

/// Flags and assignments with `#` comments.
pub mod settings {
    include!(concat!(env!("OUT_DIR"), "/settings.rs"));
}

/// `key = digits` or `key : digits` bindings.
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}
