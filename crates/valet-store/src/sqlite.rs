//! SQLite implementation of the Store trait.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use valet_core::{format_date, BookingId, RotaId, ValetId};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::rows::{parse_day, parse_time, to_u32, BookingRow, RotaRow, SettingsRow, ValetRow};
use crate::schema::{MIGRATIONS, VALET_CHILD_TABLES};
use crate::types::{
    Booking, BookingCounts, BookingFilter, HealthCounts, Rota, RotaSummary, SlotSettings, Valet,
    WeekSchedule,
};
use crate::Store;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

macro_rules! rota_columns {
    () => {
        "r.rota_id, r.valet_id, \
         r.sunday_available, r.sunday_capacity, \
         r.monday_available, r.monday_capacity, \
         r.tuesday_available, r.tuesday_capacity, \
         r.wednesday_available, r.wednesday_capacity, \
         r.thursday_available, r.thursday_capacity, \
         r.friday_available, r.friday_capacity, \
         r.saturday_available, r.saturday_capacity, \
         r.is_active, r.updated_by, r.updated_at"
    };
}

macro_rules! booking_columns {
    () => {
        "booking_id, booking_code, vehicle_make, vehicle_model, vehicle_registration, \
         vehicle_colour, vehicle_condition, customer_name, customer_email, customer_phone, \
         booking_date, booking_time, valet_id, valet_name, status, paint_protection, \
         special_requirements, notes, key_number, sales_executive_name, source, \
         prep_tracker_id, created_at, updated_at"
    };
}

macro_rules! valet_columns {
    () => {
        "valet_id, name, email, phone, status, created_at, updated_at"
    };
}

/// Bookings that still occupy capacity: neither completed nor cancelled.
macro_rules! open_status_clause {
    () => {
        "status NOT IN ('completed', 'cancelled')"
    };
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// SQLite-backed storage over a bounded connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect using the given pool configuration and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the database cannot be opened,
    /// or the schema cannot be applied.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?;
        let store = Self::with_options(options, config).await?;
        tracing::info!(
            url = %config.database_url,
            max_connections = config.max_connections,
            "Database opened"
        );
        Ok(store)
    }

    /// Open (or create) a database file with the default pool limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot
    /// be applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path.as_ref());
        Self::with_options(options, &StoreConfig::default()).await
    }

    async fn with_options(options: SqliteConnectOptions, config: &StoreConfig) -> Result<Self> {
        let options = options
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        tracing::debug!(statements = MIGRATIONS.len(), "Schema applied");
        Ok(())
    }

    async fn count(&self, sql: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        u64::try_from(count).map_err(|_| StoreError::Corrupt(format!("count: {count}")))
    }
}

#[async_trait]
impl Store for SqliteStore {
    // =========================================================================
    // Health
    // =========================================================================

    async fn health_counts(&self) -> Result<HealthCounts> {
        Ok(HealthCounts {
            slot_settings: self.count("SELECT COUNT(*) FROM booking_slot_settings").await?,
            active_valets: self
                .count("SELECT COUNT(*) FROM valets WHERE status = 'active'")
                .await?,
            active_rotas: self
                .count("SELECT COUNT(*) FROM valet_rota WHERE is_active = 1")
                .await?,
        })
    }

    // =========================================================================
    // Slot Settings
    // =========================================================================

    async fn get_slot_settings(&self) -> Result<Option<SlotSettings>> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT slot_start_time, slot_end_time, slot_duration_minutes, \
             break_start_time, break_end_time, lead_time_hours \
             FROM booking_slot_settings ORDER BY setting_id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(SlotSettings::try_from).transpose()
    }

    async fn put_slot_settings(&self, settings: &SlotSettings, updated_by: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO booking_slot_settings (setting_id, slot_start_time, slot_end_time, \
             slot_duration_minutes, break_start_time, break_end_time, lead_time_hours, \
             updated_by, updated_at) \
             VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(setting_id) DO UPDATE SET \
             slot_start_time = excluded.slot_start_time, \
             slot_end_time = excluded.slot_end_time, \
             slot_duration_minutes = excluded.slot_duration_minutes, \
             break_start_time = excluded.break_start_time, \
             break_end_time = excluded.break_end_time, \
             lead_time_hours = excluded.lead_time_hours, \
             updated_by = excluded.updated_by, \
             updated_at = excluded.updated_at",
        )
        .bind(settings.slot_start_time.to_string())
        .bind(settings.slot_end_time.to_string())
        .bind(i64::from(settings.slot_duration_minutes))
        .bind(settings.break_start_time.to_string())
        .bind(settings.break_end_time.to_string())
        .bind(i64::from(settings.lead_time_hours))
        .bind(updated_by)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        tracing::debug!(updated_by, "Slot settings saved");
        Ok(())
    }

    // =========================================================================
    // Valet Operations
    // =========================================================================

    async fn create_valet(&self, valet: &Valet, rota: &Rota) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(concat!(
            "INSERT INTO valets (",
            valet_columns!(),
            ") VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(valet.valet_id.to_string())
        .bind(valet.name.as_str())
        .bind(valet.email.as_deref())
        .bind(valet.phone.as_deref())
        .bind(valet.status.as_str())
        .bind(timestamp(valet.created_at))
        .bind(timestamp(valet.updated_at))
        .execute(&mut *tx)
        .await?;

        let mut insert_rota = sqlx::query(
            "INSERT INTO valet_rota (rota_id, valet_id, \
             sunday_available, sunday_capacity, monday_available, monday_capacity, \
             tuesday_available, tuesday_capacity, wednesday_available, wednesday_capacity, \
             thursday_available, thursday_capacity, friday_available, friday_capacity, \
             saturday_available, saturday_capacity, is_active, updated_by, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rota.rota_id.to_string())
        .bind(rota.valet_id.to_string());
        for (_, day) in rota.days.iter() {
            insert_rota = insert_rota
                .bind(day.available)
                .bind(day.capacity.map(i64::from));
        }
        insert_rota
            .bind(rota.is_active)
            .bind(rota.updated_by.as_deref())
            .bind(timestamp(rota.updated_at))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(valet_id = %valet.valet_id, rota_id = %rota.rota_id, "Valet created");
        Ok(())
    }

    async fn get_valet(&self, valet_id: &ValetId) -> Result<Option<Valet>> {
        let row: Option<ValetRow> = sqlx::query_as(concat!(
            "SELECT ",
            valet_columns!(),
            " FROM valets WHERE valet_id = ?"
        ))
        .bind(valet_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Valet::try_from).transpose()
    }

    async fn list_valets(&self) -> Result<Vec<Valet>> {
        let rows: Vec<ValetRow> = sqlx::query_as(concat!(
            "SELECT ",
            valet_columns!(),
            " FROM valets ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Valet::try_from).collect()
    }

    async fn update_valet(&self, valet: &Valet) -> Result<()> {
        let result = sqlx::query(
            "UPDATE valets SET name = ?, email = ?, phone = ?, status = ?, updated_at = ? \
             WHERE valet_id = ?",
        )
        .bind(valet.name.as_str())
        .bind(valet.email.as_deref())
        .bind(valet.phone.as_deref())
        .bind(valet.status.as_str())
        .bind(timestamp(valet.updated_at))
        .bind(valet.valet_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_valet(&self, valet_id: &ValetId) -> Result<()> {
        let id = valet_id.to_string();
        let mut tx = self.pool.begin().await?;

        for table in VALET_CHILD_TABLES {
            let sql = format!("DELETE FROM {table} WHERE valet_id = ?");
            let result = sqlx::query(&sql).bind(id.as_str()).execute(&mut *tx).await?;
            tracing::trace!(table, rows = result.rows_affected(), "Cascade delete");
        }

        let result = sqlx::query("DELETE FROM valets WHERE valet_id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        // Dropping the transaction rolls the child deletes back.
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;

        tracing::debug!(valet_id = %valet_id, "Valet deleted");
        Ok(())
    }

    // =========================================================================
    // Rota Operations
    // =========================================================================

    async fn get_active_rota(&self, valet_id: &ValetId) -> Result<Option<Rota>> {
        let row: Option<RotaRow> = sqlx::query_as(concat!(
            "SELECT ",
            rota_columns!(),
            ", NULL AS valet_name FROM valet_rota r \
             WHERE r.valet_id = ? AND r.is_active = 1 LIMIT 1"
        ))
        .bind(valet_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Rota::try_from).transpose()
    }

    async fn list_active_rotas(&self) -> Result<Vec<RotaSummary>> {
        let rows: Vec<RotaRow> = sqlx::query_as(concat!(
            "SELECT ",
            rota_columns!(),
            ", v.name AS valet_name FROM valet_rota r \
             LEFT JOIN valets v ON v.valet_id = r.valet_id \
             WHERE r.is_active = 1 ORDER BY v.name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|mut row| {
                let valet_name = row.valet_name.take();
                Ok(RotaSummary {
                    rota: Rota::try_from(row)?,
                    valet_name,
                })
            })
            .collect()
    }

    async fn update_rota_schedule(
        &self,
        rota_id: &RotaId,
        days: &WeekSchedule,
        updated_by: &str,
    ) -> Result<()> {
        let mut query = sqlx::query(
            "UPDATE valet_rota SET \
             sunday_available = ?, sunday_capacity = ?, \
             monday_available = ?, monday_capacity = ?, \
             tuesday_available = ?, tuesday_capacity = ?, \
             wednesday_available = ?, wednesday_capacity = ?, \
             thursday_available = ?, thursday_capacity = ?, \
             friday_available = ?, friday_capacity = ?, \
             saturday_available = ?, saturday_capacity = ?, \
             updated_by = ?, updated_at = ? \
             WHERE rota_id = ?",
        );
        for (_, day) in days.iter() {
            query = query.bind(day.available).bind(day.capacity.map(i64::from));
        }
        let result = query
            .bind(updated_by)
            .bind(timestamp(Utc::now()))
            .bind(rota_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(rota_id = %rota_id, updated_by, "Rota updated");
        Ok(())
    }

    // =========================================================================
    // Holiday Operations
    // =========================================================================

    async fn add_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO valet_holidays (valet_id, holiday_date) VALUES (?, ?)")
            .bind(valet_id.to_string())
            .bind(format_date(date))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()> {
        let result = sqlx::query("DELETE FROM valet_holidays WHERE valet_id = ? AND holiday_date = ?")
            .bind(valet_id.to_string())
            .bind(format_date(date))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_holidays(&self, valet_id: &ValetId) -> Result<Vec<NaiveDate>> {
        let dates: Vec<String> = sqlx::query_scalar(
            "SELECT holiday_date FROM valet_holidays WHERE valet_id = ? ORDER BY holiday_date",
        )
        .bind(valet_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        dates.iter().map(|d| parse_day("holiday_date", d)).collect()
    }

    async fn holidays_among(
        &self,
        valet_id: &ValetId,
        dates: &[NaiveDate],
    ) -> Result<HashSet<NaiveDate>> {
        if dates.is_empty() {
            return Ok(HashSet::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT holiday_date FROM valet_holidays WHERE valet_id = ",
        );
        query.push_bind(valet_id.to_string());
        query.push(" AND holiday_date IN (");
        let mut separated = query.separated(", ");
        for date in dates {
            separated.push_bind(format_date(*date));
        }
        separated.push_unseparated(")");

        let rows: Vec<(String,)> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|(d,)| parse_day("holiday_date", d))
            .collect()
    }

    // =========================================================================
    // Booking Operations
    // =========================================================================

    async fn booking_counts(
        &self,
        valet_id: &ValetId,
        dates: &[NaiveDate],
    ) -> Result<BookingCounts> {
        if dates.is_empty() {
            return Ok(BookingCounts::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT booking_date, booking_time, COUNT(*) FROM valet_bookings WHERE valet_id = ",
        );
        query.push_bind(valet_id.to_string());
        query.push(" AND booking_time IS NOT NULL AND ");
        query.push(open_status_clause!());
        query.push(" AND booking_date IN (");
        let mut separated = query.separated(", ");
        for date in dates {
            separated.push_bind(format_date(*date));
        }
        separated.push_unseparated(")");
        query.push(" GROUP BY booking_date, booking_time");

        let rows: Vec<(String, String, i64)> =
            query.build_query_as().fetch_all(&self.pool).await?;

        let mut counts = BookingCounts::new();
        for (date, time, count) in rows {
            counts.record(
                parse_day("booking_date", &date)?,
                parse_time("booking_time", &time)?,
                to_u32("count", count)?,
            );
        }
        Ok(counts)
    }

    async fn count_open_bookings(&self, valet_id: &ValetId, date: NaiveDate) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(concat!(
            "SELECT COUNT(*) FROM valet_bookings \
             WHERE valet_id = ? AND booking_date = ? AND ",
            open_status_clause!()
        ))
        .bind(valet_id.to_string())
        .bind(format_date(date))
        .fetch_one(&self.pool)
        .await?;

        to_u32("count", count)
    }

    async fn insert_booking_within_capacity(
        &self,
        booking: &Booking,
        max_capacity: u32,
    ) -> Result<bool> {
        let result = sqlx::query(concat!(
            "INSERT INTO valet_bookings (",
            booking_columns!(),
            ") SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ? \
             WHERE (SELECT COUNT(*) FROM valet_bookings \
             WHERE valet_id = ? AND booking_date = ? AND ",
            open_status_clause!(),
            ") < ?"
        ))
        .bind(booking.booking_id.to_string())
        .bind(booking.booking_code.as_str())
        .bind(booking.vehicle_make.as_str())
        .bind(booking.vehicle_model.as_str())
        .bind(booking.vehicle_registration.as_deref())
        .bind(booking.vehicle_colour.as_deref())
        .bind(booking.vehicle_condition.as_str())
        .bind(booking.customer_name.as_deref())
        .bind(booking.customer_email.as_deref())
        .bind(booking.customer_phone.as_deref())
        .bind(format_date(booking.booking_date))
        .bind(booking.booking_time.map(|t| t.to_string()))
        .bind(booking.valet_id.to_string())
        .bind(booking.valet_name.as_deref())
        .bind(booking.status.as_str())
        .bind(booking.paint_protection.as_str())
        .bind(booking.special_requirements.as_deref())
        .bind(booking.notes.as_deref())
        .bind(booking.key_number.as_deref())
        .bind(booking.sales_executive_name.as_deref())
        .bind(booking.source.as_str())
        .bind(booking.prep_tracker_id.as_deref())
        .bind(timestamp(booking.created_at))
        .bind(timestamp(booking.updated_at))
        .bind(booking.valet_id.to_string())
        .bind(format_date(booking.booking_date))
        .bind(i64::from(max_capacity))
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() == 1;
        tracing::debug!(
            booking_id = %booking.booking_id,
            valet_id = %booking.valet_id,
            date = %booking.booking_date,
            inserted,
            "Conditional booking insert"
        );
        Ok(inserted)
    }

    async fn get_booking(&self, booking_id: &BookingId) -> Result<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM valet_bookings WHERE booking_id = ?"
        ))
        .bind(booking_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let mut query = QueryBuilder::<Sqlite>::new(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM valet_bookings WHERE 1 = 1"
        ));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(source) = &filter.source {
            query.push(" AND source = ").push_bind(source.clone());
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query
                .push(" AND (booking_code LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query
            .push(" ORDER BY booking_date DESC, booking_time DESC LIMIT ")
            .push_bind(i64::from(filter.limit));

        let rows: Vec<BookingRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_uncompleted_bookings(&self) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM valet_bookings WHERE status != 'completed' \
             ORDER BY booking_date, booking_time"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn complete_booking(&self, booking_id: &BookingId) -> Result<Booking> {
        let result = sqlx::query(
            "UPDATE valet_bookings SET status = 'completed', updated_at = ? WHERE booking_id = ?",
        )
        .bind(timestamp(Utc::now()))
        .bind(booking_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.get_booking(booking_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_booking(&self, booking_id: &BookingId) -> Result<()> {
        let result = sqlx::query("DELETE FROM valet_bookings WHERE booking_id = ?")
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookingStatus, DaySchedule, ValetStatus};
    use tempfile::TempDir;
    use valet_core::{SlotTime, Weekday};

    async fn create_test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("valet.db")).await.unwrap();
        (store, dir)
    }

    fn date(s: &str) -> NaiveDate {
        valet_core::parse_date(s).unwrap()
    }

    fn time(s: &str) -> SlotTime {
        SlotTime::parse(s).unwrap()
    }

    fn sample_valet(name: &str) -> (Valet, Rota) {
        let now = Utc::now();
        let valet = Valet {
            valet_id: ValetId::generate(),
            name: name.to_string(),
            email: None,
            phone: Some("07700 900000".to_string()),
            status: ValetStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let rota = Rota {
            rota_id: RotaId::generate(),
            valet_id: valet.valet_id,
            days: WeekSchedule::weekdays_only(),
            is_active: true,
            updated_by: Some("system".to_string()),
            updated_at: now,
        };
        (valet, rota)
    }

    fn sample_booking(valet_id: ValetId, on: &str, at: Option<&str>) -> Booking {
        let now = Utc::now();
        Booking {
            booking_id: BookingId::generate(),
            booking_code: format!("VB-{}", now.timestamp_millis()),
            vehicle_make: "Ford".to_string(),
            vehicle_model: "Focus".to_string(),
            vehicle_registration: None,
            vehicle_colour: None,
            vehicle_condition: "used".to_string(),
            customer_name: Some("Alex Smith".to_string()),
            customer_email: None,
            customer_phone: None,
            booking_date: date(on),
            booking_time: at.map(time),
            valet_id,
            valet_name: None,
            status: BookingStatus::Pending,
            paint_protection: "no".to_string(),
            special_requirements: None,
            notes: None,
            key_number: None,
            sales_executive_name: None,
            source: "manual".to_string(),
            prep_tracker_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_settings() -> SlotSettings {
        SlotSettings {
            slot_start_time: time("09:00"),
            slot_end_time: time("17:00"),
            slot_duration_minutes: 60,
            break_start_time: time("12:00"),
            break_end_time: time("13:00"),
            lead_time_hours: 2,
        }
    }

    #[tokio::test]
    async fn slot_settings_upsert() {
        let (store, _dir) = create_test_store().await;
        assert!(store.get_slot_settings().await.unwrap().is_none());

        let mut settings = sample_settings();
        store.put_slot_settings(&settings, "admin").await.unwrap();
        assert_eq!(store.get_slot_settings().await.unwrap(), Some(settings.clone()));

        settings.slot_duration_minutes = 30;
        store.put_slot_settings(&settings, "admin").await.unwrap();
        assert_eq!(store.get_slot_settings().await.unwrap(), Some(settings));
        assert_eq!(store.health_counts().await.unwrap().slot_settings, 1);
    }

    #[tokio::test]
    async fn create_valet_with_rota() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        let loaded = store.get_valet(&valet.valet_id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Jordan");

        let active = store.get_active_rota(&valet.valet_id).await.unwrap().unwrap();
        assert_eq!(active.rota_id, rota.rota_id);
        assert_eq!(active.days, WeekSchedule::weekdays_only());

        let summaries = store.list_active_rotas().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].valet_name.as_deref(), Some("Jordan"));

        let counts = store.health_counts().await.unwrap();
        assert_eq!(counts.active_valets, 1);
        assert_eq!(counts.active_rotas, 1);
    }

    #[tokio::test]
    async fn list_valets_ordered_by_name() {
        let (store, _dir) = create_test_store().await;
        for name in ["Sam", "Alex", "Morgan"] {
            let (valet, rota) = sample_valet(name);
            store.create_valet(&valet, &rota).await.unwrap();
        }

        let names: Vec<_> = store
            .list_valets()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, ["Alex", "Morgan", "Sam"]);
    }

    #[tokio::test]
    async fn update_valet_missing_is_not_found() {
        let (store, _dir) = create_test_store().await;
        let (valet, _) = sample_valet("Ghost");
        assert!(matches!(
            store.update_valet(&valet).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_rota_schedule() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        let mut days = rota.days;
        days.set(
            Weekday::Saturday,
            DaySchedule {
                available: true,
                capacity: Some(5),
            },
        );
        store
            .update_rota_schedule(&rota.rota_id, &days, "manager")
            .await
            .unwrap();

        let active = store.get_active_rota(&valet.valet_id).await.unwrap().unwrap();
        assert_eq!(active.days.day(Weekday::Saturday).capacity, Some(5));
        assert_eq!(active.updated_by.as_deref(), Some("manager"));

        let missing = store
            .update_rota_schedule(&RotaId::generate(), &days, "manager")
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn delete_valet_cascades() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();
        store.add_holiday(&valet.valet_id, date("2030-01-07")).await.unwrap();
        let booking = sample_booking(valet.valet_id, "2030-01-08", Some("09:00"));
        assert!(store.insert_booking_within_capacity(&booking, 3).await.unwrap());

        store.delete_valet(&valet.valet_id).await.unwrap();

        assert!(store.get_valet(&valet.valet_id).await.unwrap().is_none());
        assert!(store.get_active_rota(&valet.valet_id).await.unwrap().is_none());
        assert!(store.get_booking(&booking.booking_id).await.unwrap().is_none());
        assert!(store.list_holidays(&valet.valet_id).await.unwrap().is_empty());

        assert!(matches!(
            store.delete_valet(&valet.valet_id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn holidays() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        store.add_holiday(&valet.valet_id, date("2030-01-09")).await.unwrap();
        store.add_holiday(&valet.valet_id, date("2030-01-07")).await.unwrap();
        store.add_holiday(&valet.valet_id, date("2030-01-07")).await.unwrap();

        assert_eq!(
            store.list_holidays(&valet.valet_id).await.unwrap(),
            vec![date("2030-01-07"), date("2030-01-09")]
        );

        let among = store
            .holidays_among(&valet.valet_id, &[date("2030-01-07"), date("2030-01-08")])
            .await
            .unwrap();
        assert_eq!(among, HashSet::from([date("2030-01-07")]));
        assert!(store
            .holidays_among(&valet.valet_id, &[])
            .await
            .unwrap()
            .is_empty());

        store.remove_holiday(&valet.valet_id, date("2030-01-07")).await.unwrap();
        assert!(matches!(
            store.remove_holiday(&valet.valet_id, date("2030-01-07")).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn booking_counts_skip_terminal_and_untimed() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        let open = sample_booking(valet.valet_id, "2030-01-07", Some("09:00"));
        let untimed = sample_booking(valet.valet_id, "2030-01-07", None);
        let completed = sample_booking(valet.valet_id, "2030-01-07", Some("09:00"));
        for booking in [&open, &untimed, &completed] {
            assert!(store.insert_booking_within_capacity(booking, 10).await.unwrap());
        }
        store.complete_booking(&completed.booking_id).await.unwrap();

        let counts = store
            .booking_counts(&valet.valet_id, &[date("2030-01-07"), date("2030-01-08")])
            .await
            .unwrap();
        assert_eq!(counts.get(date("2030-01-07"), time("09:00")), 1);
        assert_eq!(counts.get(date("2030-01-08"), time("09:00")), 0);

        // The untimed booking still occupies day capacity.
        assert_eq!(
            store
                .count_open_bookings(&valet.valet_id, date("2030-01-07"))
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn conditional_insert_stops_at_capacity() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        for _ in 0..2 {
            let booking = sample_booking(valet.valet_id, "2030-01-07", Some("10:00"));
            assert!(store.insert_booking_within_capacity(&booking, 2).await.unwrap());
        }

        let third = sample_booking(valet.valet_id, "2030-01-07", Some("11:00"));
        assert!(!store.insert_booking_within_capacity(&third, 2).await.unwrap());
        assert!(store.get_booking(&third.booking_id).await.unwrap().is_none());

        let other_day = sample_booking(valet.valet_id, "2030-01-08", Some("11:00"));
        assert!(store.insert_booking_within_capacity(&other_day, 2).await.unwrap());
    }

    #[tokio::test]
    async fn list_bookings_with_filters() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        let mut early = sample_booking(valet.valet_id, "2030-01-07", Some("09:00"));
        early.customer_name = Some("Pat Jones".to_string());
        let mut late = sample_booking(valet.valet_id, "2030-01-09", Some("09:00"));
        late.source = "prep_tracker".to_string();
        for booking in [&early, &late] {
            assert!(store.insert_booking_within_capacity(booking, 3).await.unwrap());
        }

        let all = store
            .list_bookings(&BookingFilter {
                limit: 100,
                ..BookingFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].booking_id, late.booking_id);

        let by_source = store
            .list_bookings(&BookingFilter {
                source: Some("prep_tracker".to_string()),
                limit: 100,
                ..BookingFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_source.len(), 1);

        let by_search = store
            .list_bookings(&BookingFilter {
                search: Some("jones".to_string()),
                limit: 100,
                ..BookingFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].booking_id, early.booking_id);

        let limited = store
            .list_bookings(&BookingFilter {
                limit: 1,
                ..BookingFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn complete_and_delete_booking() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        let booking = sample_booking(valet.valet_id, "2030-01-07", Some("09:00"));
        assert!(store.insert_booking_within_capacity(&booking, 3).await.unwrap());
        assert_eq!(store.list_uncompleted_bookings().await.unwrap().len(), 1);

        let completed = store.complete_booking(&booking.booking_id).await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(store.list_uncompleted_bookings().await.unwrap().is_empty());

        store.delete_booking(&booking.booking_id).await.unwrap();
        assert!(matches!(
            store.delete_booking(&booking.booking_id).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.complete_booking(&booking.booking_id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn cancelled_and_completed_free_capacity() {
        let (store, _dir) = create_test_store().await;
        let (valet, rota) = sample_valet("Jordan");
        store.create_valet(&valet, &rota).await.unwrap();

        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            let mut booking = sample_booking(valet.valet_id, "2030-01-07", Some("09:00"));
            booking.status = status;
            assert!(store.insert_booking_within_capacity(&booking, 10).await.unwrap());
        }

        let day = date("2030-01-07");
        assert_eq!(store.count_open_bookings(&valet.valet_id, day).await.unwrap(), 2);
        let counts = store.booking_counts(&valet.valet_id, &[day]).await.unwrap();
        assert_eq!(counts.get(day, time("09:00")), 2);

        let third = sample_booking(valet.valet_id, "2030-01-07", Some("10:00"));
        assert!(store.insert_booking_within_capacity(&third, 3).await.unwrap());
        let fourth = sample_booking(valet.valet_id, "2030-01-07", Some("10:00"));
        assert!(!store.insert_booking_within_capacity(&fourth, 3).await.unwrap());
    }
}
