//! Static capability table.
//!
//! The capability set a generic wallet-adapter host can consume is
//! fixed at compile time: it never depends on connection state or any
//! particular invocation, so it is declared once and exposed read-only.

// ============================================================================
// Capability
// ============================================================================

/// One named, versioned capability of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Capability identifier, `namespace:operation`.
    pub name: &'static str,
    /// Capability version.
    pub version: &'static str,
}

// ============================================================================
// Table
// ============================================================================

/// Every capability the bridge exposes to an adapter host.
pub const CAPABILITIES: &[Capability] = &[
    Capability {
        name: "standard:connect",
        version: "1.0.0",
    },
    Capability {
        name: "standard:disconnect",
        version: "1.0.0",
    },
    Capability {
        name: "standard:events",
        version: "1.0.0",
    },
    Capability {
        name: "wallet:signPersonalMessage",
        version: "1.0.0",
    },
    Capability {
        name: "wallet:signMessage",
        version: "1.0.0",
    },
    Capability {
        name: "wallet:signTransaction",
        version: "1.0.0",
    },
    Capability {
        name: "wallet:signAndExecuteTransaction",
        version: "1.0.0",
    },
];

/// Returns the full capability table.
#[inline]
#[must_use]
pub const fn capabilities() -> &'static [Capability] {
    CAPABILITIES
}

/// Returns `true` if the bridge exposes the named capability.
#[must_use]
pub fn supports(name: &str) -> bool {
    CAPABILITIES.iter().any(|c| c.name == name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_all_operations() {
        for name in [
            "standard:connect",
            "standard:disconnect",
            "wallet:signPersonalMessage",
            "wallet:signMessage",
            "wallet:signTransaction",
            "wallet:signAndExecuteTransaction",
        ] {
            assert!(supports(name), "missing capability {name}");
        }
    }

    #[test]
    fn test_unknown_capability_not_supported() {
        assert!(!supports("wallet:teleport"));
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in CAPABILITIES.iter().enumerate() {
            for b in &CAPABILITIES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
