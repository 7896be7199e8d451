//! Naming conventions for external serialization keys.
//!
//! Field names are declared in snake_case. A field's convention only affects
//! the key it is rendered under in a primitive mapping; leading underscores
//! (private fields) are preserved verbatim.

use convert_case::{Case, Casing};
use fgr_config::NamingStyle;
use serde::Serialize;

///
/// NamingConvention
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    #[default]
    Snake,
    Camel,
}

impl NamingConvention {
    /// Render a declared (snake_case) field name as an external key.
    #[must_use]
    pub fn render(self, name: &str) -> String {
        match self {
            Self::Snake => name.to_string(),
            Self::Camel => {
                let (prefix, rest) = split_underscores(name);
                if rest.is_empty() {
                    return name.to_string();
                }

                format!(
                    "{prefix}{}",
                    rest.from_case(Case::Snake).to_case(Case::Camel)
                )
            }
        }
    }

    #[must_use]
    pub(crate) const fn tag(self) -> u8 {
        match self {
            Self::Snake => 0x01,
            Self::Camel => 0x02,
        }
    }
}

impl From<NamingStyle> for NamingConvention {
    fn from(style: NamingStyle) -> Self {
        match style {
            NamingStyle::Snake => Self::Snake,
            NamingStyle::Camel => Self::Camel,
        }
    }
}

/// Normalize an external key of any supported style into snake_case.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let (prefix, rest) = split_underscores(key);
    if rest.is_empty() {
        return key.to_string();
    }

    format!("{prefix}{}", rest.to_case(Case::Snake))
}

// leading underscores mark private fields and must survive case conversion
fn split_underscores(name: &str) -> (&str, &str) {
    let split = name.len() - name.trim_start_matches('_').len();

    name.split_at(split)
}
