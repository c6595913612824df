use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // account_id is the primary key: at most one lock per account
        manager
            .create_table(
                Table::create()
                    .table(PricingLocks::Table)
                    .if_not_exists()
                    .col(uuid(PricingLocks::AccountId).primary_key())
                    .col(string_len(PricingLocks::Zone, 32).not_null())
                    .col(json_binary(PricingLocks::Schedule).not_null())
                    .col(text_null(PricingLocks::ZoneMessage))
                    .col(boolean(PricingLocks::LocationChangeAllowed).not_null())
                    .col(json_binary(PricingLocks::SourceLocation).not_null())
                    .col(boolean(PricingLocks::Provisional).not_null().default(false))
                    .col(timestamp_with_time_zone_null(PricingLocks::ReevaluateUntil))
                    .col(
                        timestamp_with_time_zone(PricingLocks::LockedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE pricing_locks
                    ADD CONSTRAINT pricing_locks_zone_check
                    CHECK (zone IN ('special_region', 'regional_bloc', 'global'))
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE INDEX IF NOT EXISTS idx_pricing_locks_provisional
                    ON pricing_locks (reevaluate_until)
                    WHERE provisional
                "#,
            )
            .await?;

        // Only provisional rows may be rewritten, and only into a final lock
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE OR REPLACE FUNCTION pricing_locks_guard_update()
                RETURNS TRIGGER AS $$
                BEGIN
                    IF NOT OLD.provisional THEN
                        RAISE EXCEPTION 'pricing lock for account % is final', OLD.account_id;
                    END IF;
                    IF NEW.account_id <> OLD.account_id THEN
                        RAISE EXCEPTION 'pricing lock account_id is immutable';
                    END IF;
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER pricing_locks_guard_update
                    BEFORE UPDATE ON pricing_locks
                    FOR EACH ROW
                    EXECUTE FUNCTION pricing_locks_guard_update()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS pricing_locks_guard_update ON pricing_locks")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS pricing_locks_guard_update()")
            .await?;

        manager
            .drop_table(Table::drop().table(PricingLocks::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum PricingLocks {
    Table,
    AccountId,
    Zone,
    Schedule,
    ZoneMessage,
    LocationChangeAllowed,
    SourceLocation,
    Provisional,
    ReevaluateUntil,
    LockedAt,
}
