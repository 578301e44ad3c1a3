//! Fixed string names for enums that travel as plain text: SQLite columns,
//! query strings and command-line arguments.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownName {
  pub kind:  &'static str,
  pub value: String,
}

/// Implement `as_str`, `Display` and `FromStr` for a field-less enum from a
/// table of variant names. The names must match the serde spelling.
macro_rules! wire_names {
  ($ty:ty, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
    impl $ty {
      pub fn as_str(self) -> &'static str {
        match self {
          $(Self::$variant => $name,)+
        }
      }
    }

    impl std::fmt::Display for $ty {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
      }
    }

    impl std::str::FromStr for $ty {
      type Err = $crate::wire::UnknownName;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
          $($name => Ok(Self::$variant),)+
          other => Err($crate::wire::UnknownName { kind: $kind, value: other.to_owned() }),
        }
      }
    }
  };
}

pub(crate) use wire_names;
