//! Conventions: registry-wide policy applied while models are built.
//!
//! A convention pack decides which types are mappable at all, how in-memory
//! field identifiers become wire names, and whether a field's values pass
//! through a converter on their way to and from the wire.

use std::any::Any;
use std::sync::Arc;

// ================================================================
// TRAITS
// ================================================================

/// Rewrites field values at the codec boundary.
///
/// `to_wire` runs on every encode, `from_wire` on every decode; both must
/// return a value of the type the field's shape declares.
pub trait ValueConverter: Send + Sync {
    fn to_wire(&self, value: &dyn Any) -> Box<dyn Any>;
    fn from_wire(&self, value: Box<dyn Any>) -> Box<dyn Any>;
}

/// Registry-wide mapping policy, consulted once per type when its model
/// is built.
pub trait Convention: Send + Sync {
    /// Whether the named type may be mapped at all. Declining makes the
    /// registry report the type as having no codec.
    fn is_mappable(&self, type_name: &str) -> bool {
        let _ = type_name;
        true
    }

    /// Derives the wire name for an in-memory field identifier.
    fn wire_name(&self, field_name: &str) -> String;

    /// Supplies a converter for the given field, if the pack has one.
    fn converter(&self, type_name: &str, field_name: &str) -> Option<Arc<dyn ValueConverter>> {
        let _ = (type_name, field_name);
        None
    }
}

// ================================================================
// DEFAULT PACK
// ================================================================

/// The default convention pack: snake_case field identifiers become
/// camelCase wire names, every type is mappable, no converters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCaseConventions;

impl Convention for CamelCaseConventions {
    fn wire_name(&self, field_name: &str) -> String {
        let mut out = String::with_capacity(field_name.len());
        let mut segments = field_name.split('_').filter(|s| !s.is_empty());
        if let Some(first) = segments.next() {
            out.push_str(first);
        }
        for segment in segments {
            let mut chars = segment.chars();
            if let Some(head) = chars.next() {
                out.extend(head.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_names() {
        let conv = CamelCaseConventions;
        assert_eq!(conv.wire_name("first_name"), "firstName");
        assert_eq!(conv.wire_name("zip"), "zip");
        assert_eq!(conv.wire_name("street_address_line"), "streetAddressLine");
        assert_eq!(conv.wire_name("already"), "already");
    }

    #[test]
    fn test_camel_case_edge_cases() {
        let conv = CamelCaseConventions;
        assert_eq!(conv.wire_name(""), "");
        assert_eq!(conv.wire_name("_leading"), "leading");
        assert_eq!(conv.wire_name("double__gap"), "doubleGap");
    }

    #[test]
    fn test_defaults_accept_everything() {
        let conv = CamelCaseConventions;
        assert!(conv.is_mappable("anything.At.All"));
        assert!(conv.converter("anything.At.All", "field").is_none());
    }
}
