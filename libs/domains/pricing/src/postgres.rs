use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, Statement, Value};
use tracing::debug;
use uuid::Uuid;

use crate::entity::{Entity, Model};
use crate::error::{PricingError, PricingResult};
use crate::models::{LockOutcome, LockRecord};
use crate::repository::LockRepository;

const INSERT_IF_ABSENT: &str = r#"
    INSERT INTO pricing_locks (
        account_id, zone, schedule, zone_message, location_change_allowed,
        source_location, provisional, reevaluate_until, locked_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (account_id) DO NOTHING
    RETURNING *
"#;

const REPLACE_PROVISIONAL: &str = r#"
    UPDATE pricing_locks
    SET zone = $2,
        schedule = $3,
        zone_message = $4,
        location_change_allowed = $5,
        source_location = $6,
        provisional = $7,
        reevaluate_until = $8,
        locked_at = $9
    WHERE account_id = $1
      AND provisional
      AND reevaluate_until > $10
    RETURNING *
"#;

/// PostgreSQL lock store backed by the `account_id` primary key
#[derive(Clone)]
pub struct PgLockRepository {
    db: DatabaseConnection,
}

impl PgLockRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn record_values(record: &LockRecord) -> PricingResult<Vec<Value>> {
        let model = Model::try_from(record)?;
        Ok(vec![
            model.account_id.into(),
            model.zone.to_string().into(),
            model.schedule.into(),
            model.zone_message.into(),
            model.location_change_allowed.into(),
            model.source_location.into(),
            model.provisional.into(),
            model.reevaluate_until.into(),
            model.locked_at.into(),
        ])
    }
}

#[async_trait]
impl LockRepository for PgLockRepository {
    async fn insert_if_absent(&self, record: LockRecord) -> PricingResult<LockOutcome> {
        let account_id = record.account_id;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            INSERT_IF_ABSENT,
            Self::record_values(&record)?,
        );

        if let Some(inserted) = Model::find_by_statement(stmt).one(&self.db).await? {
            return Ok(LockOutcome::Created(inserted.try_into()?));
        }

        debug!(%account_id, "Lock already present, returning stored record");
        let existing = self.find_by_account(account_id).await?.ok_or_else(|| {
            PricingError::Internal(format!(
                "lock for account {} conflicted but could not be read back",
                account_id
            ))
        })?;
        Ok(LockOutcome::AlreadyLocked(existing))
    }

    async fn find_by_account(&self, account_id: Uuid) -> PricingResult<Option<LockRecord>> {
        Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .map(LockRecord::try_from)
            .transpose()
    }

    async fn replace_provisional(
        &self,
        record: LockRecord,
        now: DateTime<Utc>,
    ) -> PricingResult<Option<LockRecord>> {
        let mut values = Self::record_values(&record)?;
        values.push(now.into());
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, REPLACE_PROVISIONAL, values);

        Model::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(LockRecord::try_from)
            .transpose()
    }
}
