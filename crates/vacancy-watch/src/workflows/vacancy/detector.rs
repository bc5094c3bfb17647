//! Turns one pass of availability readings into canonical state plus new-vacancy events.
//!
//! Reconciliation is a pure function: it never touches the network or the filesystem, so
//! every rule here is exercised directly by unit tests.

use super::domain::{Observations, Property, PropertyId, Status, StatusRecord, TransitionEvent};

/// How first observations of a property are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionPolicy {
    /// Alert when a property with no prior reading is first seen `available`.
    pub notify_on_first_observation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub updated: StatusRecord,
    pub events: Vec<TransitionEvent>,
    /// Properties observed for the first time in this pass, in catalog order.
    pub first_registrations: Vec<PropertyId>,
}

/// Reconciles `observations` against `prior`.
///
/// An event is emitted when a property that was not `available` on record is observed
/// `available`. A stored `unknown` arms detection the same way `not_available` does, so a
/// vacancy that appears across a failed fetch is still reported. Every observed status
/// replaces the stored one, including `unknown`. Entries for properties outside
/// `observations` are carried over untouched.
pub fn reconcile(
    prior: &StatusRecord,
    observations: &Observations,
    policy: DetectionPolicy,
) -> Reconciliation {
    let mut updated = prior.clone();
    let mut events = Vec::new();
    let mut first_registrations = Vec::new();

    for (property, observed) in observations.iter() {
        let first_seen = prior.is_first_registration(&property.id);
        let previous = prior.get(&property.id);

        if first_seen {
            first_registrations.push(property.id.clone());
        }

        let transitioned = previous != Status::Available && observed == Status::Available;
        if transitioned && (!first_seen || policy.notify_on_first_observation) {
            events.push(TransitionEvent {
                property: property.clone(),
                status: observed,
            });
        }

        updated.set(property.id.clone(), observed);
    }

    Reconciliation {
        updated,
        events,
        first_registrations,
    }
}

/// Every property observed `available` in this pass, in catalog order.
pub fn currently_available(observations: &Observations) -> Vec<Property> {
    observations
        .iter()
        .filter(|(_, status)| *status == Status::Available)
        .map(|(property, _)| property.clone())
        .collect()
}
