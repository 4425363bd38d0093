use super::domain::{Actor, ActorRole, UserId};

/// Authorization failures raised by the capability checks.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("action requires the {required} role")]
    Forbidden { required: &'static str },
    #[error("actor does not own the target entity")]
    NotOwner,
}

/// Single place deciding who may act on what.
///
/// Every service injects this instead of re-checking roles at call sites, so
/// the role/ownership rules stay in one table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn require_admin(&self, actor: Actor) -> Result<(), AccessError> {
        match actor.role {
            ActorRole::Admin => Ok(()),
            _ => Err(AccessError::Forbidden { required: "admin" }),
        }
    }

    pub fn require_professor(&self, actor: Actor) -> Result<(), AccessError> {
        match actor.role {
            ActorRole::Professor => Ok(()),
            _ => Err(AccessError::Forbidden {
                required: "professor",
            }),
        }
    }

    pub fn require_student(&self, actor: Actor) -> Result<(), AccessError> {
        match actor.role {
            ActorRole::Student => Ok(()),
            _ => Err(AccessError::Forbidden { required: "student" }),
        }
    }

    /// Professors may touch only what they own; admins never pass ownership checks here.
    pub fn require_owning_professor(&self, actor: Actor, owner: UserId) -> Result<(), AccessError> {
        self.require_professor(actor)?;
        if actor.id == owner {
            Ok(())
        } else {
            Err(AccessError::NotOwner)
        }
    }

    /// The applicant themself; used for offer responses.
    pub fn require_applicant(&self, actor: Actor, applicant: UserId) -> Result<(), AccessError> {
        self.require_student(actor)?;
        if actor.id == applicant {
            Ok(())
        } else {
            Err(AccessError::NotOwner)
        }
    }

    /// Finalization is open to admins and to the professor owning the project.
    pub fn require_selector(&self, actor: Actor, owner: UserId) -> Result<(), AccessError> {
        match actor.role {
            ActorRole::Admin => Ok(()),
            ActorRole::Professor if actor.id == owner => Ok(()),
            ActorRole::Professor => Err(AccessError::NotOwner),
            ActorRole::Student => Err(AccessError::Forbidden {
                required: "admin or owning professor",
            }),
        }
    }

    /// Volunteer adjustments: admins freely, professors only on their own projects.
    pub fn require_adjuster(&self, actor: Actor, owner: UserId) -> Result<(), AccessError> {
        self.require_selector(actor, owner)
    }
}
