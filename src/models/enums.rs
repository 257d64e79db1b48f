//! Shared domain enums

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    InStock,
    #[serde(alias = "in_use")]
    Assigned,
    #[serde(alias = "under_repair")]
    Repair,
    Damaged,
    Missing,
    #[serde(alias = "retired")]
    Disposed,
}

/// Status values written by earlier releases and what they mean today
pub const LEGACY_STATUS_ALIASES: &[(&str, AssetStatus)] = &[
    ("in_use", AssetStatus::Assigned),
    ("under_repair", AssetStatus::Repair),
    ("retired", AssetStatus::Disposed),
];

impl AssetStatus {
    pub const ALL: [AssetStatus; 6] = [
        AssetStatus::InStock,
        AssetStatus::Assigned,
        AssetStatus::Repair,
        AssetStatus::Damaged,
        AssetStatus::Missing,
        AssetStatus::Disposed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::InStock => "in_stock",
            AssetStatus::Assigned => "assigned",
            AssetStatus::Repair => "repair",
            AssetStatus::Damaged => "damaged",
            AssetStatus::Missing => "missing",
            AssetStatus::Disposed => "disposed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetStatus::InStock => "In Stock",
            AssetStatus::Assigned => "Assigned",
            AssetStatus::Repair => "In Repair",
            AssetStatus::Damaged => "Damaged",
            AssetStatus::Missing => "Missing",
            AssetStatus::Disposed => "Disposed",
        }
    }

    /// No lifecycle action leaves this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssetStatus::Disposed)
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if let Some(status) = AssetStatus::ALL
            .iter()
            .find(|status| status.as_str() == normalized)
        {
            return Ok(*status);
        }
        LEGACY_STATUS_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, status)| *status)
            .ok_or_else(|| format!("Invalid asset status: {}", s))
    }
}

// SQLx conversion for AssetStatus (stored as text)
impl sqlx::Type<Postgres> for AssetStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for AssetStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AssetStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

// ---------------------------------------------------------------------------
// AssetEventType
// ---------------------------------------------------------------------------

/// Kind of entry in an asset's audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetEventType {
    Created,
    Assign,
    Unassign,
    RepairStart,
    RepairEnd,
    Move,
    #[serde(alias = "retire")]
    Dispose,
    Damaged,
    Missing,
}

impl AssetEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetEventType::Created => "created",
            AssetEventType::Assign => "assign",
            AssetEventType::Unassign => "unassign",
            AssetEventType::RepairStart => "repair_start",
            AssetEventType::RepairEnd => "repair_end",
            AssetEventType::Move => "move",
            AssetEventType::Dispose => "dispose",
            AssetEventType::Damaged => "damaged",
            AssetEventType::Missing => "missing",
        }
    }
}

impl std::fmt::Display for AssetEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssetEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(AssetEventType::Created),
            "assign" => Ok(AssetEventType::Assign),
            "unassign" => Ok(AssetEventType::Unassign),
            "repair_start" => Ok(AssetEventType::RepairStart),
            "repair_end" => Ok(AssetEventType::RepairEnd),
            "move" => Ok(AssetEventType::Move),
            // legacy "retire" events were status changes to what is now disposed
            "dispose" | "retire" => Ok(AssetEventType::Dispose),
            "damaged" => Ok(AssetEventType::Damaged),
            "missing" => Ok(AssetEventType::Missing),
            _ => Err(format!("Invalid asset event type: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for AssetEventType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for AssetEventType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AssetEventType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

// ---------------------------------------------------------------------------
// RepairOutcome
// ---------------------------------------------------------------------------

/// What happens to an asset when its repair is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RepairOutcome {
    BackToStock,
    Disposed,
}

impl From<&str> for RepairOutcome {
    /// Anything other than "disposed" sends the asset back to stock
    fn from(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("disposed") {
            RepairOutcome::Disposed
        } else {
            RepairOutcome::BackToStock
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in AssetStatus::ALL {
            assert_eq!(status.as_str().parse::<AssetStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_legacy_status_aliases() {
        assert_eq!("in_use".parse::<AssetStatus>(), Ok(AssetStatus::Assigned));
        assert_eq!("under_repair".parse::<AssetStatus>(), Ok(AssetStatus::Repair));
        assert_eq!("retired".parse::<AssetStatus>(), Ok(AssetStatus::Disposed));
        assert_eq!(" IN_STOCK ".parse::<AssetStatus>(), Ok(AssetStatus::InStock));
        assert!("lost".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn test_status_serde_accepts_aliases() {
        let status: AssetStatus = serde_json::from_str("\"in_use\"").unwrap();
        assert_eq!(status, AssetStatus::Assigned);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"assigned\"");
    }

    #[test]
    fn test_only_disposed_is_terminal() {
        let terminal: Vec<_> = AssetStatus::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&AssetStatus::Disposed]);
    }

    #[test]
    fn test_event_type_legacy_retire() {
        assert_eq!("retire".parse::<AssetEventType>(), Ok(AssetEventType::Dispose));
        assert_eq!("repair_end".parse::<AssetEventType>(), Ok(AssetEventType::RepairEnd));
    }

    #[test]
    fn test_repair_outcome_is_lenient() {
        assert_eq!(RepairOutcome::from("disposed"), RepairOutcome::Disposed);
        assert_eq!(RepairOutcome::from("Disposed "), RepairOutcome::Disposed);
        assert_eq!(RepairOutcome::from("back_to_stock"), RepairOutcome::BackToStock);
        assert_eq!(RepairOutcome::from(""), RepairOutcome::BackToStock);
    }
}
