//! String-backed proto enums
//!
//! Proto enums arrive as their symbolic names. Values outside the known set are
//! preserved in an `Unrecognized` variant instead of failing deserialization, so
//! that validators can report them like any other violation.

/// Generate a proto enum wrapper with `Unrecognized` fallback.
///
/// The first listed variant is the proto default (wire value 0).
macro_rules! proto_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $first:ident => $first_wire:literal
            $(, $variant:ident => $wire:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Deserialize)]
        #[serde(from = "String")]
        $vis enum $name {
            #[default]
            $first,
            $($variant,)*
            /// A value outside the known set, kept verbatim.
            Unrecognized(String),
        }

        impl $name {
            /// Symbolic wire name of the value
            pub fn as_str(&self) -> &str {
                match self {
                    Self::$first => $first_wire,
                    $(Self::$variant => $wire,)*
                    Self::Unrecognized(value) => value.as_str(),
                }
            }

            /// Whether the value is one of the known variants
            pub fn is_recognized(&self) -> bool {
                !matches!(self, Self::Unrecognized(_))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $first_wire => Self::$first,
                    $($wire => Self::$variant,)*
                    _ => Self::Unrecognized(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
