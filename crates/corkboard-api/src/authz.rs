//! The authorization gate: a pure decision function over identity, admin
//! credential, and recorded ownership. No I/O — callers resolve the target's
//! owner (and not-found) before asking for a decision.

/// What the caller wants to do. Update and Delete carry the owner recorded
/// on the target message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    Read,
    Create,
    Update { owner: &'a str },
    Delete { owner: &'a str },
}

/// Why a request was denied. The two kinds map to distinct HTTP statuses
/// and are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No identity where one was required.
    Unauthenticated,
    /// Identity present but neither owner nor admin.
    Unauthorized,
}

/// Deployment-level knobs for the gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy {
    /// When set, Update additionally requires the identity to match the
    /// message owner. Off by default.
    pub owner_update: bool,
}

/// Decide whether `identity` (with or without the admin credential) may
/// perform `op`.
///
/// Reads are public. Create and Update require an identity. Delete requires
/// the admin credential or ownership. The admin credential bypasses
/// ownership on Delete only; it grants nothing on Create or Update.
pub fn authorize(
    policy: Policy,
    identity: Option<&str>,
    admin: bool,
    op: Operation<'_>,
) -> Result<(), Denial> {
    match op {
        Operation::Read => Ok(()),
        Operation::Create => identity.map(|_| ()).ok_or(Denial::Unauthenticated),
        Operation::Update { owner } => {
            let who = identity.ok_or(Denial::Unauthenticated)?;
            if policy.owner_update && who != owner {
                return Err(Denial::Unauthorized);
            }
            Ok(())
        }
        Operation::Delete { owner } => {
            if admin {
                return Ok(());
            }
            let who = identity.ok_or(Denial::Unauthenticated)?;
            if who == owner {
                Ok(())
            } else {
                Err(Denial::Unauthorized)
            }
        }
    }
}

/// Run the gate for an operation performed *as* the caller, handing back
/// the identity it admitted. Keeps handlers to a single decision point when
/// they need the acting user id afterwards.
pub fn authorize_as<'a>(
    policy: Policy,
    identity: Option<&'a str>,
    admin: bool,
    op: Operation<'_>,
) -> Result<&'a str, Denial> {
    authorize(policy, identity, admin, op)?;
    identity.ok_or(Denial::Unauthenticated)
}
