//! Copy, group, and identifier builders.

use rpda_core::{
    ClusterId, Copy, CopyAddress, CopyId, CopyRole, GroupId, IdentifierRule, Identifiers,
    ImageMode,
};

/// Cluster hosting production copies in fixtures.
pub const PRODUCTION_CLUSTER: ClusterId = ClusterId(1);
/// Cluster hosting replica copies in fixtures.
pub const REPLICA_CLUSTER: ClusterId = ClusterId(2);

/// Identifier rules shipped as configuration defaults (`_PN$`, `_CN$`, `^TC_`).
#[must_use]
pub fn default_identifiers() -> Identifiers {
    let rule = |pattern: &str| {
        IdentifierRule::pattern(pattern).unwrap_or_else(|_| IdentifierRule::substring(pattern))
    };
    Identifiers::new(rule("_PN$"), rule("_CN$"), rule("^TC_"))
}

/// Copy with image access disabled.
#[must_use]
pub fn copy(group: GroupId, cluster: ClusterId, id: u64, name: &str, role: CopyRole) -> Copy {
    Copy {
        name: name.to_string(),
        role,
        image_access_enabled: false,
        image_mode: None,
        address: CopyAddress {
            group,
            cluster,
            copy: CopyId(id),
        },
    }
}

/// Copy that already has logged image access enabled.
#[must_use]
pub fn accessed_copy(group: GroupId, id: u64, name: &str) -> Copy {
    Copy {
        image_access_enabled: true,
        image_mode: Some(ImageMode::LoggedAccess),
        ..copy(group, REPLICA_CLUSTER, id, name, CopyRole::Active)
    }
}

/// The usual three-copy layout: `{base}_PN` (active), `{base}_CN` and `TC_{base}` (replicas).
#[must_use]
pub fn standard_copies(group: GroupId, base: &str) -> Vec<Copy> {
    vec![
        copy(group, PRODUCTION_CLUSTER, 0, &format!("{base}_PN"), CopyRole::Active),
        copy(group, REPLICA_CLUSTER, 1, &format!("{base}_CN"), CopyRole::Replica),
        copy(group, REPLICA_CLUSTER, 2, &format!("TC_{base}"), CopyRole::Replica),
    ]
}
