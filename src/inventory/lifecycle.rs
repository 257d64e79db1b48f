//! Asset lifecycle state machine.
//!
//! [`plan`] is a pure function of the current [`AssetState`], the requested
//! [`Action`] and today's date. It either rejects the action, reports that
//! nothing needs to change, or returns a [`Transition`]: the field changes
//! to apply and the audit event to append. Persisting both atomically is the
//! caller's job (see `services::assets`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::enums::{AssetEventType, AssetStatus, RepairOutcome};

/// The part of an asset the state machine reasons about
#[derive(Debug, Clone, PartialEq)]
pub struct AssetState {
    pub status: AssetStatus,
    pub location_id: Option<i32>,
    pub assigned_to: Option<String>,
    pub assigned_at: Option<NaiveDate>,
}

impl AssetState {
    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some() || self.assigned_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assignee {
    pub name: String,
    pub department: Option<String>,
    pub email: Option<String>,
}

/// Repair vendor details after vendor resolution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepairTicket {
    pub vendor: Option<String>,
    pub vendor_phone: Option<String>,
    pub vendor_address: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairClosure {
    pub outcome: RepairOutcome,
    /// Raw user input; must parse as a decimal when present
    pub cost: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    pub to_location_id: i32,
    pub reason: Option<String>,
    pub reference: Option<String>,
}

/// A requested lifecycle action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Assign(Assignee),
    Unassign,
    StartRepair(RepairTicket),
    CompleteRepair(RepairClosure),
    Dispose,
    MarkDamaged,
    MarkMissing,
    Move(Relocation),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Assign(_) => "assign",
            Action::Unassign => "unassign",
            Action::StartRepair(_) => "start_repair",
            Action::CompleteRepair(_) => "complete_repair",
            Action::Dispose => "dispose",
            Action::MarkDamaged => "mark_damaged",
            Action::MarkMissing => "mark_missing",
            Action::Move(_) => "move",
        }
    }
}

/// Field-level change produced by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetStatus(AssetStatus),
    SetLocation(i32),
    Assign {
        to: Assignee,
        at: NaiveDate,
    },
    ClearAssignment,
    OpenRepair {
        opened_at: NaiveDate,
        ticket: RepairTicket,
    },
    CloseRepair {
        closed_at: NaiveDate,
        cost: Option<Decimal>,
        notes: Option<String>,
    },
}

/// Audit entry to append alongside the effects
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub event_type: AssetEventType,
    pub note: String,
    pub from_status: Option<AssetStatus>,
    pub to_status: AssetStatus,
    pub from_location_id: Option<i32>,
    pub to_location_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub event: EventRecord,
}

/// Result of planning an action
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Apply(Transition),
    /// The asset is already in the requested state; nothing is written
    Unchanged(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("{0}")]
    Illegal(String),
    #[error("{0}")]
    Invalid(String),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Illegal(msg) => AppError::BusinessRule(msg),
            LifecycleError::Invalid(msg) => AppError::Validation(msg),
        }
    }
}

fn illegal(action: &Action, status: AssetStatus) -> LifecycleError {
    let verb = match action {
        Action::Assign(_) => "assign",
        Action::Unassign => "unassign",
        Action::StartRepair(_) => "send to repair",
        Action::CompleteRepair(_) => "complete repair",
        Action::Dispose => "dispose",
        Action::MarkDamaged => "mark as damaged",
        Action::MarkMissing => "mark as missing",
        Action::Move(_) => "move",
    };
    LifecycleError::Illegal(format!(
        "Cannot {}: asset is {}",
        verb,
        status.label().to_lowercase()
    ))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Initial event written when an asset is created
pub fn creation_event(tag: &str, status: AssetStatus, location_id: Option<i32>) -> EventRecord {
    EventRecord {
        event_type: AssetEventType::Created,
        note: format!("Asset created ({})", tag),
        from_status: None,
        to_status: status,
        from_location_id: None,
        to_location_id: location_id,
    }
}

/// Decide what `action` does to an asset in `state`
pub fn plan(state: &AssetState, action: &Action, today: NaiveDate) -> Result<Plan, LifecycleError> {
    let from = state.status;
    let mut effects = Vec::new();

    let (event_type, to, note, to_location_id) = match action {
        Action::Assign(assignee) => {
            if !matches!(from, AssetStatus::InStock | AssetStatus::Assigned) {
                return Err(illegal(action, from));
            }
            let name = assignee.name.trim();
            if name.is_empty() {
                return Err(LifecycleError::Invalid(
                    "Assignee name is required to assign an asset".to_string(),
                ));
            }
            let to_assignee = Assignee {
                name: name.to_string(),
                department: non_empty(&assignee.department).map(str::to_string),
                email: non_empty(&assignee.email).map(str::to_string),
            };

            let mut note = format!("Assigned to {}", to_assignee.name);
            if let Some(department) = &to_assignee.department {
                note.push_str(&format!(" ({})", department));
            }
            if let Some(email) = &to_assignee.email {
                note.push_str(&format!(" <{}>", email));
            }

            effects.push(Effect::Assign {
                to: to_assignee,
                at: today,
            });
            (AssetEventType::Assign, AssetStatus::Assigned, note, state.location_id)
        }

        Action::Unassign => {
            if !state.is_assigned() {
                return Err(LifecycleError::Illegal(
                    "This asset is not currently assigned".to_string(),
                ));
            }
            let to = if from == AssetStatus::Assigned {
                AssetStatus::InStock
            } else {
                from
            };
            let note = match non_empty(&state.assigned_to) {
                Some(previous) => format!("Unassigned from {}", previous),
                None => "Unassigned".to_string(),
            };
            effects.push(Effect::ClearAssignment);
            (AssetEventType::Unassign, to, note, state.location_id)
        }

        Action::StartRepair(ticket) => {
            if matches!(
                from,
                AssetStatus::Disposed | AssetStatus::Missing | AssetStatus::Repair
            ) {
                return Err(illegal(action, from));
            }

            let mut parts = vec!["Sent to repair".to_string()];
            if let Some(vendor) = non_empty(&ticket.vendor) {
                parts.push(format!("Vendor: {}", vendor));
            }
            if let Some(reference) = non_empty(&ticket.reference) {
                parts.push(format!("Ref: {}", reference));
            }
            if let Some(notes) = non_empty(&ticket.notes) {
                parts.push(format!("Notes: {}", notes));
            }
            if let Some(previous) = non_empty(&state.assigned_to) {
                parts.push(format!("Released from {}", previous));
            }

            if state.is_assigned() {
                effects.push(Effect::ClearAssignment);
            }
            effects.push(Effect::OpenRepair {
                opened_at: today,
                ticket: RepairTicket {
                    vendor: non_empty(&ticket.vendor).map(str::to_string),
                    vendor_phone: non_empty(&ticket.vendor_phone).map(str::to_string),
                    vendor_address: non_empty(&ticket.vendor_address).map(str::to_string),
                    reference: non_empty(&ticket.reference).map(str::to_string),
                    notes: non_empty(&ticket.notes).map(str::to_string),
                },
            });
            (
                AssetEventType::RepairStart,
                AssetStatus::Repair,
                parts.join(" | "),
                state.location_id,
            )
        }

        Action::CompleteRepair(closure) => {
            if from != AssetStatus::Repair {
                return Err(LifecycleError::Illegal(
                    "This asset is not currently under repair".to_string(),
                ));
            }

            let raw_cost = non_empty(&closure.cost);
            let cost = match raw_cost {
                Some(raw) => {
                    let value = Decimal::from_str(raw).map_err(|_| {
                        LifecycleError::Invalid("Repair cost must be a number".to_string())
                    })?;
                    if value.is_sign_negative() {
                        return Err(LifecycleError::Invalid(
                            "Repair cost must not be negative".to_string(),
                        ));
                    }
                    Some(value)
                }
                None => None,
            };
            let notes = non_empty(&closure.notes).map(str::to_string);

            let (to, outcome_note) = match closure.outcome {
                RepairOutcome::Disposed => {
                    (AssetStatus::Disposed, "Outcome: Asset disposed after repair")
                }
                RepairOutcome::BackToStock => (AssetStatus::InStock, "Outcome: Returned to stock"),
            };

            let mut parts = vec!["Repair completed".to_string(), outcome_note.to_string()];
            if let Some(raw) = raw_cost {
                parts.push(format!("Cost: {}", raw));
            }
            if let Some(notes) = &notes {
                parts.push(format!("Notes: {}", notes));
            }

            effects.push(Effect::CloseRepair {
                closed_at: today,
                cost,
                notes,
            });
            (AssetEventType::RepairEnd, to, parts.join(" | "), state.location_id)
        }

        Action::Dispose => {
            if from == AssetStatus::Disposed {
                return Ok(Plan::Unchanged("Asset is already disposed".to_string()));
            }
            let note = release_note("Asset marked as disposed", state);
            if state.is_assigned() {
                effects.push(Effect::ClearAssignment);
            }
            (AssetEventType::Dispose, AssetStatus::Disposed, note, state.location_id)
        }

        Action::MarkDamaged | Action::MarkMissing => {
            let (target, event_type, label) = match action {
                Action::MarkDamaged => (AssetStatus::Damaged, AssetEventType::Damaged, "damaged"),
                _ => (AssetStatus::Missing, AssetEventType::Missing, "missing"),
            };
            if from == AssetStatus::Disposed {
                return Err(illegal(action, from));
            }
            if from == target {
                return Ok(Plan::Unchanged(format!("Asset is already marked as {}", label)));
            }
            let note = release_note(&format!("Asset marked as {}", label), state);
            if state.is_assigned() {
                effects.push(Effect::ClearAssignment);
            }
            (event_type, target, note, state.location_id)
        }

        Action::Move(relocation) => {
            if state.location_id == Some(relocation.to_location_id) {
                return Err(LifecycleError::Invalid(
                    "Asset is already in this location".to_string(),
                ));
            }
            let from_label = state
                .location_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "none".to_string());
            let mut parts = vec![format!(
                "Moved from location {} to {}",
                from_label, relocation.to_location_id
            )];
            if let Some(reason) = non_empty(&relocation.reason) {
                parts.push(format!("Reason: {}", reason));
            }
            if let Some(reference) = non_empty(&relocation.reference) {
                parts.push(format!("Ref: {}", reference));
            }
            effects.push(Effect::SetLocation(relocation.to_location_id));
            (
                AssetEventType::Move,
                from,
                parts.join(" | "),
                Some(relocation.to_location_id),
            )
        }
    };

    if to != from {
        effects.insert(0, Effect::SetStatus(to));
    }

    Ok(Plan::Apply(Transition {
        effects,
        event: EventRecord {
            event_type,
            note,
            from_status: Some(from),
            to_status: to,
            from_location_id: state.location_id,
            to_location_id,
        },
    }))
}

fn release_note(base: &str, state: &AssetState) -> String {
    match non_empty(&state.assigned_to) {
        Some(previous) => format!("{} | Released from {}", base, previous),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn state(status: AssetStatus) -> AssetState {
        AssetState {
            status,
            location_id: Some(1),
            assigned_to: None,
            assigned_at: None,
        }
    }

    fn assigned_to(name: &str) -> AssetState {
        AssetState {
            status: AssetStatus::Assigned,
            location_id: Some(1),
            assigned_to: Some(name.to_string()),
            assigned_at: Some(today()),
        }
    }

    fn assign(name: &str) -> Action {
        Action::Assign(Assignee {
            name: name.to_string(),
            department: Some("IT".to_string()),
            email: Some("jane@example.com".to_string()),
        })
    }

    fn applied(plan: Result<Plan, LifecycleError>) -> Transition {
        match plan {
            Ok(Plan::Apply(transition)) => transition,
            other => panic!("expected a transition, got {:?}", other),
        }
    }

    #[test]
    fn test_assign_from_stock() {
        let transition = applied(plan(&state(AssetStatus::InStock), &assign("Jane Doe"), today()));

        assert_eq!(transition.event.event_type, AssetEventType::Assign);
        assert_eq!(transition.event.from_status, Some(AssetStatus::InStock));
        assert_eq!(transition.event.to_status, AssetStatus::Assigned);
        assert_eq!(transition.event.note, "Assigned to Jane Doe (IT) <jane@example.com>");
        assert_eq!(transition.effects[0], Effect::SetStatus(AssetStatus::Assigned));
        assert!(matches!(
            &transition.effects[1],
            Effect::Assign { to, at } if to.name == "Jane Doe" && *at == today()
        ));
    }

    #[test]
    fn test_reassign_keeps_status() {
        let transition = applied(plan(&assigned_to("Jane Doe"), &assign("John Roe"), today()));
        assert_eq!(transition.event.from_status, Some(AssetStatus::Assigned));
        assert_eq!(transition.event.to_status, AssetStatus::Assigned);
        assert!(!transition
            .effects
            .iter()
            .any(|e| matches!(e, Effect::SetStatus(_))));
    }

    #[test]
    fn test_assign_rejected_outside_stock() {
        for status in [
            AssetStatus::Disposed,
            AssetStatus::Repair,
            AssetStatus::Missing,
            AssetStatus::Damaged,
        ] {
            let err = plan(&state(status), &assign("Jane Doe"), today()).unwrap_err();
            assert!(matches!(err, LifecycleError::Illegal(_)), "{:?}", status);
        }
    }

    #[test]
    fn test_assign_requires_name() {
        let err = plan(&state(AssetStatus::InStock), &assign("   "), today()).unwrap_err();
        assert!(matches!(err, LifecycleError::Invalid(_)));
    }

    #[test]
    fn test_unassign_returns_to_stock() {
        let transition = applied(plan(&assigned_to("Jane Doe"), &Action::Unassign, today()));
        assert_eq!(transition.event.to_status, AssetStatus::InStock);
        assert_eq!(transition.event.note, "Unassigned from Jane Doe");
        assert!(transition.effects.contains(&Effect::ClearAssignment));
    }

    #[test]
    fn test_unassign_requires_assignment() {
        let err = plan(&state(AssetStatus::InStock), &Action::Unassign, today()).unwrap_err();
        assert!(matches!(err, LifecycleError::Illegal(_)));
    }

    #[test]
    fn test_start_repair_clears_assignment() {
        let ticket = RepairTicket {
            vendor: Some("Dell".to_string()),
            reference: Some("RMA-1".to_string()),
            ..Default::default()
        };
        let transition = applied(plan(
            &assigned_to("Jane Doe"),
            &Action::StartRepair(ticket),
            today(),
        ));

        assert_eq!(transition.event.to_status, AssetStatus::Repair);
        assert!(transition.effects.contains(&Effect::ClearAssignment));
        assert_eq!(
            transition.event.note,
            "Sent to repair | Vendor: Dell | Ref: RMA-1 | Released from Jane Doe"
        );
    }

    #[test]
    fn test_start_repair_guards() {
        for status in [AssetStatus::Disposed, AssetStatus::Missing, AssetStatus::Repair] {
            let err = plan(
                &state(status),
                &Action::StartRepair(RepairTicket::default()),
                today(),
            )
            .unwrap_err();
            assert!(matches!(err, LifecycleError::Illegal(_)));
        }
        assert!(plan(
            &state(AssetStatus::Damaged),
            &Action::StartRepair(RepairTicket::default()),
            today()
        )
        .is_ok());
    }

    #[test]
    fn test_complete_repair_disposed_with_cost() {
        let closure = RepairClosure {
            outcome: RepairOutcome::Disposed,
            cost: Some("150.00".to_string()),
            notes: None,
        };
        let transition = applied(plan(
            &state(AssetStatus::Repair),
            &Action::CompleteRepair(closure),
            today(),
        ));

        assert_eq!(transition.event.event_type, AssetEventType::RepairEnd);
        assert_eq!(transition.event.to_status, AssetStatus::Disposed);
        assert!(transition.effects.contains(&Effect::CloseRepair {
            closed_at: today(),
            cost: Some(Decimal::new(15000, 2)),
            notes: None,
        }));
    }

    #[test]
    fn test_complete_repair_only_from_repair() {
        let closure = RepairClosure {
            outcome: RepairOutcome::BackToStock,
            cost: None,
            notes: None,
        };
        for status in AssetStatus::ALL {
            let result = plan(&state(status), &Action::CompleteRepair(closure.clone()), today());
            if status == AssetStatus::Repair {
                assert_eq!(applied(result).event.to_status, AssetStatus::InStock);
            } else {
                assert!(matches!(result, Err(LifecycleError::Illegal(_))));
            }
        }
    }

    #[test]
    fn test_complete_repair_rejects_bad_cost() {
        let closure = RepairClosure {
            outcome: RepairOutcome::BackToStock,
            cost: Some("a lot".to_string()),
            notes: None,
        };
        let err = plan(&state(AssetStatus::Repair), &Action::CompleteRepair(closure), today())
            .unwrap_err();
        assert_eq!(err, LifecycleError::Invalid("Repair cost must be a number".to_string()));
    }

    #[test]
    fn test_dispose_twice_is_noop() {
        let first = applied(plan(&state(AssetStatus::InStock), &Action::Dispose, today()));
        assert_eq!(first.event.to_status, AssetStatus::Disposed);

        let second = plan(&state(AssetStatus::Disposed), &Action::Dispose, today()).unwrap();
        assert_eq!(second, Plan::Unchanged("Asset is already disposed".to_string()));
    }

    #[test]
    fn test_disposed_is_terminal() {
        let disposed = state(AssetStatus::Disposed);
        for action in [
            assign("Jane Doe"),
            Action::StartRepair(RepairTicket::default()),
            Action::MarkDamaged,
            Action::MarkMissing,
        ] {
            assert!(matches!(
                plan(&disposed, &action, today()),
                Err(LifecycleError::Illegal(_))
            ));
        }
    }

    #[test]
    fn test_mark_missing_releases_assignee() {
        let transition = applied(plan(&assigned_to("Jane Doe"), &Action::MarkMissing, today()));
        assert_eq!(transition.event.to_status, AssetStatus::Missing);
        assert_eq!(transition.event.note, "Asset marked as missing | Released from Jane Doe");
        assert!(transition.effects.contains(&Effect::ClearAssignment));
    }

    #[test]
    fn test_mark_damaged_twice_is_noop() {
        let result = plan(&state(AssetStatus::Damaged), &Action::MarkDamaged, today()).unwrap();
        assert!(matches!(result, Plan::Unchanged(_)));
    }

    #[test]
    fn test_move_keeps_status() {
        let relocation = Relocation {
            to_location_id: 2,
            reason: Some("Office closed".to_string()),
            reference: None,
        };
        let transition = applied(plan(
            &state(AssetStatus::Damaged),
            &Action::Move(relocation),
            today(),
        ));

        assert_eq!(transition.event.event_type, AssetEventType::Move);
        assert_eq!(transition.event.from_status, Some(AssetStatus::Damaged));
        assert_eq!(transition.event.to_status, AssetStatus::Damaged);
        assert_eq!(transition.event.from_location_id, Some(1));
        assert_eq!(transition.event.to_location_id, Some(2));
        assert_eq!(transition.effects, vec![Effect::SetLocation(2)]);
    }

    #[test]
    fn test_move_to_same_location_rejected() {
        let relocation = Relocation {
            to_location_id: 1,
            reason: None,
            reference: None,
        };
        let err = plan(&state(AssetStatus::InStock), &Action::Move(relocation), today()).unwrap_err();
        assert!(matches!(err, LifecycleError::Invalid(_)));
    }

    #[test]
    fn test_event_status_matches_effects() {
        let actions = [
            assign("Jane Doe"),
            Action::StartRepair(RepairTicket::default()),
            Action::Dispose,
            Action::MarkDamaged,
            Action::MarkMissing,
        ];
        for status in AssetStatus::ALL {
            for action in &actions {
                if let Ok(Plan::Apply(transition)) = plan(&state(status), action, today()) {
                    assert_eq!(transition.event.from_status, Some(status));
                    let new_status = transition
                        .effects
                        .iter()
                        .find_map(|e| match e {
                            Effect::SetStatus(s) => Some(*s),
                            _ => None,
                        })
                        .unwrap_or(status);
                    assert_eq!(new_status, transition.event.to_status);
                }
            }
        }
    }
}
