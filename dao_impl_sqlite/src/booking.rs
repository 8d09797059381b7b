use std::str::FromStr;
use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    booking::{BookingDao, BookingEntity, BookingStatus},
    DaoError,
};
use fleetly_utils::DateRange;
use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub(crate) fn format_date(date: &Date) -> Result<String, DaoError> {
    Ok(date.format(&DATE_FORMAT)?)
}

pub(crate) fn parse_date(value: &str) -> Result<Date, DaoError> {
    Ok(Date::parse(value, &DATE_FORMAT)?)
}

#[derive(Debug, sqlx::FromRow)]
struct BookingDb {
    id: Vec<u8>,
    vehicle_id: Vec<u8>,
    renter: String,
    start_date: String,
    end_date: String,
    status: String,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}

impl TryFrom<&BookingDb> for BookingEntity {
    type Error = DaoError;
    fn try_from(booking: &BookingDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(booking.id.as_ref())?,
            vehicle_id: Uuid::from_slice(booking.vehicle_id.as_ref())?,
            renter: booking.renter.as_str().into(),
            start_date: parse_date(&booking.start_date)?,
            end_date: parse_date(&booking.end_date)?,
            status: BookingStatus::from_str(&booking.status)?,
            created: PrimitiveDateTime::parse(&booking.created, &Iso8601::DATE_TIME)?,
            deleted: booking
                .deleted
                .as_ref()
                .map(|deleted| PrimitiveDateTime::parse(deleted, &Iso8601::DATE_TIME))
                .transpose()?,
            version: Uuid::from_slice(&booking.update_version)?,
        })
    }
}

const SELECT_BOOKING: &str = r"SELECT id, vehicle_id, renter, start_date, end_date, status, created, deleted, update_version FROM booking";

pub struct BookingDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl BookingDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl BookingDao for BookingDaoImpl {
    type Transaction = TransactionImpl;

    async fn all(&self, tx: Self::Transaction) -> Result<Arc<[BookingEntity]>, DaoError> {
        sqlx::query_as::<_, BookingDb>(&format!("{SELECT_BOOKING} WHERE deleted IS NULL"))
            .fetch_all(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .iter()
            .map(BookingEntity::try_from)
            .collect::<Result<Arc<[BookingEntity]>, DaoError>>()
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError> {
        sqlx::query_as::<_, BookingDb>(&format!("{SELECT_BOOKING} WHERE id = ?"))
            .bind(id.as_bytes().to_vec())
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(BookingEntity::try_from)
            .transpose()
    }

    async fn find_by_vehicle_id(
        &self,
        vehicle_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        sqlx::query_as::<_, BookingDb>(&format!(
            "{SELECT_BOOKING} WHERE vehicle_id = ? AND deleted IS NULL"
        ))
        .bind(vehicle_id.as_bytes().to_vec())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(BookingEntity::try_from)
        .collect::<Result<Arc<[BookingEntity]>, DaoError>>()
    }

    async fn find_in_span(
        &self,
        span: DateRange,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        // ISO dates compare lexicographically, so the half-open intersection
        // test works directly on the TEXT columns.
        sqlx::query_as::<_, BookingDb>(&format!(
            "{SELECT_BOOKING} WHERE deleted IS NULL AND start_date < ? AND end_date > ?"
        ))
        .bind(format_date(&span.end())?)
        .bind(format_date(&span.start())?)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(BookingEntity::try_from)
        .collect::<Result<Arc<[BookingEntity]>, DaoError>>()
    }

    async fn create_unless_blocked(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<bool, DaoError> {
        let created = entity.created.format(&Iso8601::DATE_TIME)?;
        let deleted = entity
            .deleted
            .as_ref()
            .map(|deleted| deleted.format(&Iso8601::DATE_TIME))
            .transpose()?;
        let start_date = format_date(&entity.start_date)?;
        let end_date = format_date(&entity.end_date)?;
        let result = sqlx::query(
            r"INSERT INTO booking (id, vehicle_id, renter, start_date, end_date, status, created, deleted, update_version, update_process)
                SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
                WHERE NOT EXISTS (
                    SELECT 1 FROM booking
                    WHERE vehicle_id = ?
                      AND deleted IS NULL
                      AND status IN ('confirmed', 'active')
                      AND start_date < ?
                      AND end_date > ?
                )",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.vehicle_id.as_bytes().to_vec())
        .bind(entity.renter.as_ref())
        .bind(&start_date)
        .bind(&end_date)
        .bind(entity.status.as_str())
        .bind(&created)
        .bind(&deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.vehicle_id.as_bytes().to_vec())
        .bind(&end_date)
        .bind(&start_date)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_unless_blocked(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<bool, DaoError> {
        let deleted = entity
            .deleted
            .as_ref()
            .map(|deleted| deleted.format(&Iso8601::DATE_TIME))
            .transpose()?;
        let start_date = format_date(&entity.start_date)?;
        let end_date = format_date(&entity.end_date)?;
        let result = sqlx::query(
            r"UPDATE booking
                SET start_date = ?, end_date = ?, status = ?, deleted = ?, update_version = ?, update_process = ?
                WHERE id = ?
                  AND NOT EXISTS (
                    SELECT 1 FROM booking other
                    WHERE other.vehicle_id = booking.vehicle_id
                      AND other.id != booking.id
                      AND other.deleted IS NULL
                      AND other.status IN ('confirmed', 'active')
                      AND other.start_date < ?
                      AND other.end_date > ?
                )",
        )
        .bind(&start_date)
        .bind(&end_date)
        .bind(entity.status.as_str())
        .bind(&deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.id.as_bytes().to_vec())
        .bind(&end_date)
        .bind(&start_date)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(result.rows_affected() > 0)
    }

    async fn update(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity
            .deleted
            .as_ref()
            .map(|deleted| deleted.format(&Iso8601::DATE_TIME))
            .transpose()?;
        sqlx::query(
            r"UPDATE booking
                SET start_date = ?, end_date = ?, status = ?, deleted = ?, update_version = ?, update_process = ?
                WHERE id = ?",
        )
        .bind(format_date(&entity.start_date)?)
        .bind(format_date(&entity.end_date)?)
        .bind(entity.status.as_str())
        .bind(&deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.id.as_bytes().to_vec())
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
