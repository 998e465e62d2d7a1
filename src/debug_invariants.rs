//! Self-checks of immutable descriptors.
//!
//! Descriptors are validated once, when they are built. With
//! `debug_assertions` or the `strict-invariants` feature a violation panics
//! with the descriptor's name; otherwise the check only runs through an
//! explicit [`DebugInvariants::validate_invariants`] call.

use crate::mesh_error::MeshStructureError;

/// A descriptor that can check its own structural invariants.
pub trait DebugInvariants {
    /// Name reported when a check fails.
    const DESCRIPTOR: &'static str;

    /// The first violated invariant, if any.
    fn validate_invariants(&self) -> Result<(), MeshStructureError>;

    /// Panic on a violated invariant when checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "{}", Self::DESCRIPTOR);
    }
}

/// Validate every descriptor of `items`, stopping at the first violation.
pub fn validate_each<'a, T>(items: impl IntoIterator<Item = &'a T>) -> Result<(), MeshStructureError>
where
    T: DebugInvariants + 'a,
{
    for (k, item) in items.into_iter().enumerate() {
        if let Err(e) = item.validate_invariants() {
            log::debug!("{} #{k} violates its invariants: {e}", T::DESCRIPTOR);
            return Err(e);
        }
    }
    Ok(())
}

/// Run a fallible check and panic with the given context on error, when
/// invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants"))]
        if let Err(e) = $expr {
            panic!("[mesh-structure] {}: {}", format_args!($($ctx)*), e);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::polyhedral::PolyhedralSet;
    use crate::topology::refine::hypercube;

    #[test]
    fn every_item_is_checked() {
        let sets = [PolyhedralSet::interval(3), PolyhedralSet::simplex(2, 4)];
        assert!(validate_each(&sets).is_ok());
        assert_eq!(PolyhedralSet::DESCRIPTOR, "PolyhedralSet");
    }

    #[test]
    fn built_topologies_are_consistent() {
        let t = hypercube(&[2, 3]).unwrap();
        assert!(t.validate_invariants().is_ok());
        t.debug_assert_invariants();
    }
}
