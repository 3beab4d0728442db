//! Macro for implementing Display and FromStr for enums carried in headers
//!
//! Header values use the API's own casing on output and are parsed
//! case-insensitively on input. Unknown values surface as
//! [`HalError::UnexpectedResponse`](crate::errors::HalError::UnexpectedResponse).
//!
//! # Example
//!
//! ```rust
//! use adpost_domain::impl_header_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ReviewState {
//!     Open,
//!     Closed,
//! }
//!
//! impl_header_enum_conversions!(ReviewState {
//!     Open => "Open",
//!     Closed => "Closed",
//! });
//!
//! assert_eq!("closed".parse::<ReviewState>().unwrap(), ReviewState::Closed);
//! assert_eq!(ReviewState::Open.to_string(), "Open");
//! ```

/// Implements Display and FromStr for a fieldless enum
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of variants to their wire representation
#[macro_export]
macro_rules! impl_header_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::errors::HalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::errors::HalError::UnexpectedResponse(format!(
                    "invalid {}: '{}'",
                    stringify!($enum_name),
                    s
                )))
            }
        }
    };
}
