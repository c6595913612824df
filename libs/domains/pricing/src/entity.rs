use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};
use crate::models::{LocationResult, LockRecord, PriceSchedule, PricingZone};

/// Sea-ORM entity for the `pricing_locks` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pricing_locks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,
    pub zone: PricingZone,
    /// Schedule snapshot taken at lock time
    #[sea_orm(column_type = "JsonBinary")]
    pub schedule: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub zone_message: Option<String>,
    pub location_change_allowed: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub source_location: Json,
    pub provisional: bool,
    pub reevaluate_until: Option<DateTimeWithTimeZone>,
    pub locked_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LockRecord {
    type Error = PricingError;

    fn try_from(model: Model) -> PricingResult<Self> {
        let schedule: PriceSchedule = serde_json::from_value(model.schedule).map_err(|e| {
            PricingError::Internal(format!(
                "corrupt schedule for account {}: {}",
                model.account_id, e
            ))
        })?;
        let source_location: LocationResult = serde_json::from_value(model.source_location)
            .map_err(|e| {
                PricingError::Internal(format!(
                    "corrupt source location for account {}: {}",
                    model.account_id, e
                ))
            })?;

        Ok(LockRecord {
            account_id: model.account_id,
            zone: model.zone,
            schedule,
            zone_message: model.zone_message,
            location_change_allowed: model.location_change_allowed,
            source_location,
            provisional: model.provisional,
            reevaluate_until: model.reevaluate_until.map(|t| t.to_utc()),
            locked_at: model.locked_at.to_utc(),
        })
    }
}

impl TryFrom<&LockRecord> for Model {
    type Error = PricingError;

    fn try_from(record: &LockRecord) -> PricingResult<Self> {
        let to_json = |value: serde_json::Result<Json>| {
            value.map_err(|e| PricingError::Internal(format!("cannot encode lock record: {}", e)))
        };

        Ok(Model {
            account_id: record.account_id,
            zone: record.zone,
            schedule: to_json(serde_json::to_value(&record.schedule))?,
            zone_message: record.zone_message.clone(),
            location_change_allowed: record.location_change_allowed,
            source_location: to_json(serde_json::to_value(&record.source_location))?,
            provisional: record.provisional,
            reevaluate_until: record.reevaluate_until.map(Into::into),
            locked_at: record.locked_at.into(),
        })
    }
}
