use crate::DbError;
use core_types::enums::{FundEventType, MeetingStatus};
use core_types::slug::{slug_base, slug_candidate};
use core_types::{
    FundHistoryRecord, Listener, Meeting, NewListener, NewMeeting, NewPitcher, Pitcher,
    ProfileUpdate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgPool;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// The result of a successful ledger credit: the audit row's identity plus
/// the balance after the atomic increment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundCredit {
    pub history_id: Uuid,
    pub pitcher_id: Uuid,
    pub amount: Decimal,
    pub new_balance: Decimal,
}

/// One row of the balance/ledger consistency report: a pitcher's stored
/// balance next to the sum of their fund history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BalanceAudit {
    pub pitcher_id: Uuid,
    pub full_name: String,
    pub credit_balance: Decimal,
    pub ledger_total: Decimal,
}

impl BalanceAudit {
    pub fn drift(&self) -> Decimal {
        self.credit_balance - self.ledger_total
    }
}

/// Returns true when `err` is a violation of the named unique constraint.
fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some(constraint);
    }
    false
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --------------------------------------------------------------------
    // Pitchers
    // --------------------------------------------------------------------

    /// Creates a pitcher profile with a zero balance and a unique slug
    /// derived from the full name.
    pub async fn create_pitcher(&self, new: &NewPitcher) -> Result<Pitcher, DbError> {
        let slug = self
            .unique_slug("SELECT EXISTS(SELECT 1 FROM pitchers WHERE slug = $1)", &new.full_name)
            .await?;

        let pitcher = sqlx::query_as::<_, Pitcher>(
            r#"
            INSERT INTO pitchers (pitcher_id, full_name, email, pitch, donation, credit_balance, slug, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6, NOW())
            RETURNING pitcher_id, full_name, email, pitch, donation, credit_balance, slug, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.pitch)
        .bind(new.donation)
        .bind(&slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "pitchers_email_key") {
                DbError::DuplicateProfile
            } else {
                e.into()
            }
        })?;

        Ok(pitcher)
    }

    /// Fetches a pitcher by their ID.
    pub async fn get_pitcher(&self, pitcher_id: Uuid) -> Result<Pitcher, DbError> {
        sqlx::query_as::<_, Pitcher>(
            "SELECT pitcher_id, full_name, email, pitch, donation, credit_balance, slug, created_at FROM pitchers WHERE pitcher_id = $1",
        )
        .bind(pitcher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Fetches a pitcher by the slug on their public profile page.
    pub async fn get_pitcher_by_slug(&self, slug: &str) -> Result<Pitcher, DbError> {
        sqlx::query_as::<_, Pitcher>(
            "SELECT pitcher_id, full_name, email, pitch, donation, credit_balance, slug, created_at FROM pitchers WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Applies a partial profile update. Absent fields keep their current
    /// values. The balance and slug are never touched here.
    pub async fn update_pitcher(
        &self,
        pitcher_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Pitcher, DbError> {
        sqlx::query_as::<_, Pitcher>(
            r#"
            UPDATE pitchers SET
                full_name = COALESCE($2, full_name),
                pitch = COALESCE($3, pitch),
                donation = COALESCE($4, donation)
            WHERE pitcher_id = $1
            RETURNING pitcher_id, full_name, email, pitch, donation, credit_balance, slug, created_at
            "#,
        )
        .bind(pitcher_id)
        .bind(update.full_name.as_deref())
        .bind(update.about.as_deref())
        .bind(update.donation)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    // --------------------------------------------------------------------
    // Listeners
    // --------------------------------------------------------------------

    /// Creates a listener profile with a unique slug derived from the full name.
    pub async fn create_listener(&self, new: &NewListener) -> Result<Listener, DbError> {
        let slug = self
            .unique_slug("SELECT EXISTS(SELECT 1 FROM listeners WHERE slug = $1)", &new.full_name)
            .await?;

        let listener = sqlx::query_as::<_, Listener>(
            r#"
            INSERT INTO listeners (listener_id, full_name, email, intro, donation, slug, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING listener_id, full_name, email, intro, donation, slug, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.intro)
        .bind(new.donation)
        .bind(&slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "listeners_email_key") {
                DbError::DuplicateProfile
            } else {
                e.into()
            }
        })?;

        Ok(listener)
    }

    /// Fetches a listener by their ID.
    pub async fn get_listener(&self, listener_id: Uuid) -> Result<Listener, DbError> {
        sqlx::query_as::<_, Listener>(
            "SELECT listener_id, full_name, email, intro, donation, slug, created_at FROM listeners WHERE listener_id = $1",
        )
        .bind(listener_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Fetches a listener by the slug on their public profile page.
    pub async fn get_listener_by_slug(&self, slug: &str) -> Result<Listener, DbError> {
        sqlx::query_as::<_, Listener>(
            "SELECT listener_id, full_name, email, intro, donation, slug, created_at FROM listeners WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Applies a partial profile update to a listener.
    pub async fn update_listener(
        &self,
        listener_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Listener, DbError> {
        sqlx::query_as::<_, Listener>(
            r#"
            UPDATE listeners SET
                full_name = COALESCE($2, full_name),
                intro = COALESCE($3, intro),
                donation = COALESCE($4, donation)
            WHERE listener_id = $1
            RETURNING listener_id, full_name, email, intro, donation, slug, created_at
            "#,
        )
        .bind(listener_id)
        .bind(update.full_name.as_deref())
        .bind(update.about.as_deref())
        .bind(update.donation)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    // --------------------------------------------------------------------
    // Fund ledger
    // --------------------------------------------------------------------

    /// Credits a pitcher's balance and appends the matching fund history row
    /// in a single transaction.
    ///
    /// The increment happens in-place (`credit_balance = credit_balance + $1`),
    /// so concurrent captures for the same pitcher serialize on the row lock
    /// and can never lose an update. The unique `payment_ref_id` column makes
    /// replaying the same processor capture a `DuplicatePaymentRef` error
    /// instead of a double credit.
    pub async fn credit_pitcher(
        &self,
        pitcher_id: Uuid,
        amount: Decimal,
        event_type: FundEventType,
        payment_ref_id: &str,
    ) -> Result<FundCredit, DbError> {
        let mut tx = self.pool.begin().await?;

        let new_balance: Option<Decimal> = sqlx::query_scalar(
            "UPDATE pitchers SET credit_balance = credit_balance + $1 WHERE pitcher_id = $2 RETURNING credit_balance",
        )
        .bind(amount)
        .bind(pitcher_id)
        .fetch_optional(&mut *tx)
        .await?;
        let new_balance = new_balance.ok_or(DbError::NotFound)?;

        let history_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO fund_history (history_id, pitcher_id, amount, event_type, payment_ref_id, recorded_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(history_id)
        .bind(pitcher_id)
        .bind(amount)
        .bind(event_type.as_str())
        .bind(payment_ref_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "fund_history_payment_ref_id_key") {
                DbError::DuplicatePaymentRef(payment_ref_id.to_string())
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        Ok(FundCredit {
            history_id,
            pitcher_id,
            amount,
            new_balance,
        })
    }

    /// Fetches a pitcher's full fund history, newest first.
    pub async fn get_fund_history(
        &self,
        pitcher_id: Uuid,
    ) -> Result<Vec<FundHistoryRecord>, DbError> {
        let records = sqlx::query_as::<_, FundHistoryRecord>(
            r#"
            SELECT history_id, pitcher_id, amount, event_type, payment_ref_id, recorded_at
            FROM fund_history
            WHERE pitcher_id = $1
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(pitcher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Compares every pitcher's stored balance against the sum of their fund
    /// history rows. Any nonzero drift means the ledger invariant was broken
    /// outside `credit_pitcher`.
    pub async fn audit_balances(&self) -> Result<Vec<BalanceAudit>, DbError> {
        let rows = sqlx::query_as::<_, BalanceAudit>(
            r#"
            SELECT
                p.pitcher_id,
                p.full_name,
                p.credit_balance,
                COALESCE(SUM(f.amount), 0) AS ledger_total
            FROM pitchers AS p
            LEFT JOIN fund_history AS f ON f.pitcher_id = p.pitcher_id
            GROUP BY p.pitcher_id, p.full_name, p.credit_balance
            ORDER BY p.full_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // --------------------------------------------------------------------
    // Meetings
    // --------------------------------------------------------------------

    /// Stores a new meeting request in the `pending` state.
    pub async fn create_meeting(&self, new: &NewMeeting) -> Result<Meeting, DbError> {
        let meeting = sqlx::query_as::<_, Meeting>(
            r#"
            INSERT INTO meetings (meeting_id, source, listener_id, pitcher_id, pitcher_name, pitcher_email, message, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING meeting_id, source, listener_id, pitcher_id, pitcher_name, pitcher_email, message, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.source.as_str())
        .bind(new.listener_id)
        .bind(new.pitcher_id)
        .bind(&new.pitcher_name)
        .bind(&new.pitcher_email)
        .bind(&new.message)
        .bind(MeetingStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(meeting)
    }

    /// Fetches a meeting by its ID.
    pub async fn get_meeting(&self, meeting_id: Uuid) -> Result<Meeting, DbError> {
        sqlx::query_as::<_, Meeting>(
            "SELECT meeting_id, source, listener_id, pitcher_id, pitcher_name, pitcher_email, message, status, created_at FROM meetings WHERE meeting_id = $1",
        )
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Probes slug candidates until one is free in the given table.
    async fn unique_slug(&self, exists_sql: &str, full_name: &str) -> Result<String, DbError> {
        let base = slug_base(full_name);
        let mut attempt = 0u32;
        loop {
            let candidate = slug_candidate(&base, attempt);
            let taken: bool = sqlx::query_scalar(exists_sql)
                .bind(&candidate)
                .fetch_one(&self.pool)
                .await?;
            if !taken {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}
