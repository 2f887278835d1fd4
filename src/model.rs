/// Closed keyword enum read from loosely-typed client JSON.
///
/// Matching is case-insensitive and unknown keywords resolve to the default variant.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $tag:literal),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl $name {
            pub fn tag(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),+
                }
            }

            pub fn parse(tag: &str) -> Self {
                match tag.trim().to_ascii_lowercase().as_str() {
                    $($tag => Self::$variant,)+
                    other => {
                        tracing::debug!(
                            value = other,
                            kind = stringify!($name),
                            "unknown keyword, using default"
                        );
                        Self::default()
                    }
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.tag().to_string()
            }
        }
    };
}

pub mod brand;
pub mod job;
pub mod outline;
pub mod slide;
