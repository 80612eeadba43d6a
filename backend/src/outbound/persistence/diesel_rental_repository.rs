//! PostgreSQL-backed `RentalRepository` implementation using Diesel ORM.
//!
//! Forward references are the foreign-key columns; back-collections are the
//! reverse lookups over those columns plus the `bike_orders` join table. Every
//! command runs inside one transaction and resolves all references before its
//! first write, so a rejected command leaves no partial rows behind. Unique
//! constraints back up the natural-key checks against concurrent writers.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{RentalRepository, RentalRepositoryError};
use crate::domain::rental::{
    Address, AddressDraft, AddressId, AddressKey, Bike, BikeDraft, BikeId, Client, ClientDraft,
    ClientId, Comment, CommentDraft, CommentId, EntityKind, Order, OrderDraft, OrderId,
    RentalError, Relink, Storage, StorageId, UnknownVariant, WriteIntent, ensure_address_free,
    ensure_email_free, ensure_storage_free,
};

use super::models::{
    AddressRow, AddressValues, BikeOrderRow, BikeRow, BikeUpdate, ClientRow, ClientValues,
    CommentRow, NewBikeRow, NewCommentRow, NewStorageRow, OrderRow, OrderValues,
};
use super::pool::{DbPool, PoolError};
use super::schema::{addresses, bike_orders, bikes, clients, comments, orders, storages};

/// Diesel-backed implementation of the `RentalRepository` port.
#[derive(Clone)]
pub struct DieselRentalRepository {
    pool: DbPool,
}

impl DieselRentalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to rental repository errors.
fn map_pool_error(error: PoolError) -> RentalRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RentalRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to rental repository errors.
fn map_diesel_error(error: diesel::result::Error) -> RentalRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RentalRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RentalRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RentalRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => RentalRepositoryError::query(info.message()),
        _ => RentalRepositoryError::query("database error"),
    }
}

/// Stored catalogue names that no longer parse indicate schema drift.
fn map_decode_error(error: UnknownVariant) -> RentalRepositoryError {
    RentalRepositoryError::query(format!("corrupt row: {error}"))
}

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, RentalRepositoryError>
where
    T: TryFrom<R, Error = UnknownVariant>,
{
    rows.into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_decode_error)
}

/// Failure inside a write transaction.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Decode(UnknownVariant),
    Rejected(RentalError),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<UnknownVariant> for TxError {
    fn from(value: UnknownVariant) -> Self {
        Self::Decode(value)
    }
}

impl From<RentalError> for TxError {
    fn from(value: RentalError) -> Self {
        Self::Rejected(value)
    }
}

impl TxError {
    /// Convert to the port error, turning unique violations raised by a
    /// concurrent writer into the same rejection the pre-check would give.
    fn into_port_error(self, entity: EntityKind, intent: WriteIntent) -> RentalRepositoryError {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match self {
            Self::Diesel(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
                debug!(constraint = info.constraint_name(), "unique constraint rejected write");
                RentalRepositoryError::rejected(
                    intent.reject(entity, "conflicts with an existing record"),
                )
            }
            Self::Diesel(error) => map_diesel_error(error),
            Self::Decode(error) => map_decode_error(error),
            Self::Rejected(error) => RentalRepositoryError::rejected(error),
        }
    }
}

/// `LIKE` pattern matching `fragment` literally anywhere in the value.
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// Query helpers shared by reads and transactional writes
// ---------------------------------------------------------------------------

async fn find_address(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> QueryResult<Option<AddressRow>> {
    addresses::table
        .find(id)
        .select(AddressRow::as_select())
        .first(conn)
        .await
        .optional()
}

async fn find_address_by_key(
    conn: &mut AsyncPgConnection,
    values: &AddressValues<'_>,
) -> QueryResult<Option<AddressRow>> {
    addresses::table
        .filter(addresses::city.eq(values.city))
        .filter(addresses::street.eq(values.street))
        .filter(addresses::house.eq(values.house))
        .select(AddressRow::as_select())
        .first(conn)
        .await
        .optional()
}

async fn find_storage(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<Option<AddressRow>> {
    storages::table
        .inner_join(addresses::table)
        .filter(storages::id.eq(id))
        .select(AddressRow::as_select())
        .first(conn)
        .await
        .optional()
}

async fn find_client(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<Option<ClientRow>> {
    clients::table
        .find(id)
        .select(ClientRow::as_select())
        .first(conn)
        .await
        .optional()
}

async fn find_client_by_email(
    conn: &mut AsyncPgConnection,
    email: &str,
) -> QueryResult<Option<ClientRow>> {
    clients::table
        .filter(clients::email.eq(email))
        .select(ClientRow::as_select())
        .first(conn)
        .await
        .optional()
}

async fn storage_exists(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(storages::table.find(id)))
        .get_result(conn)
        .await
}

async fn client_exists(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(clients::table.find(id)))
        .get_result(conn)
        .await
}

async fn bike_exists(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(bikes::table.find(id)))
        .get_result(conn)
        .await
}

async fn require_storage(conn: &mut AsyncPgConnection, id: StorageId) -> Result<(), TxError> {
    if storage_exists(conn, id.get()).await? {
        Ok(())
    } else {
        Err(RentalError::not_found(EntityKind::Storage, id).into())
    }
}

async fn require_client(conn: &mut AsyncPgConnection, id: ClientId) -> Result<(), TxError> {
    if client_exists(conn, id.get()).await? {
        Ok(())
    } else {
        Err(RentalError::not_found(EntityKind::Client, id).into())
    }
}

/// Fail with the lowest missing bike id, if any.
async fn require_bikes(
    conn: &mut AsyncPgConnection,
    ids: &BTreeSet<BikeId>,
) -> Result<(), TxError> {
    let wanted: Vec<i64> = ids.iter().map(|id| id.get()).collect();
    let present: BTreeSet<i64> = bikes::table
        .filter(bikes::id.eq_any(wanted.clone()))
        .select(bikes::id)
        .load::<i64>(conn)
        .await?
        .into_iter()
        .collect();
    match wanted.into_iter().find(|id| !present.contains(id)) {
        Some(missing) => Err(RentalError::not_found(EntityKind::Bike, missing).into()),
        None => Ok(()),
    }
}

/// Attach bike ids to order rows.
async fn assemble_orders(
    conn: &mut AsyncPgConnection,
    rows: Vec<OrderRow>,
) -> QueryResult<Vec<Order>> {
    let order_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let links = bike_orders::table
        .filter(bike_orders::order_id.eq_any(order_ids))
        .select(BikeOrderRow::as_select())
        .load(conn)
        .await?;

    let mut bikes_by_order: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for link in links {
        bikes_by_order.entry(link.order_id).or_default().push(link.bike_id);
    }
    Ok(rows
        .into_iter()
        .map(|row| {
            let bike_ids = bikes_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(bike_ids)
        })
        .collect())
}

/// Link an order to bikes and mark them unavailable.
async fn attach_bikes(
    conn: &mut AsyncPgConnection,
    order_id: i64,
    bike_ids: &BTreeSet<BikeId>,
) -> QueryResult<()> {
    if bike_ids.is_empty() {
        return Ok(());
    }
    let links: Vec<BikeOrderRow> = bike_ids
        .iter()
        .map(|bike| BikeOrderRow {
            bike_id: bike.get(),
            order_id,
        })
        .collect();
    diesel::insert_into(bike_orders::table)
        .values(&links)
        .execute(conn)
        .await?;

    let ids: Vec<i64> = bike_ids.iter().map(|bike| bike.get()).collect();
    diesel::update(bikes::table.filter(bikes::id.eq_any(ids)))
        .set(bikes::available.eq(false))
        .execute(conn)
        .await?;
    Ok(())
}

/// Move an order's `bike_orders` rows from the detached bikes to the attached
/// ones.
async fn relink_bikes(
    conn: &mut AsyncPgConnection,
    order_id: i64,
    change: &Relink<BikeId>,
) -> QueryResult<()> {
    if change.is_noop() {
        debug!(order_id, "order keeps its bikes");
        return Ok(());
    }
    let detached: Vec<i64> = change.detach.iter().map(|bike| bike.get()).collect();
    if !detached.is_empty() {
        diesel::delete(
            bike_orders::table
                .filter(bike_orders::order_id.eq(order_id))
                .filter(bike_orders::bike_id.eq_any(detached)),
        )
        .execute(conn)
        .await?;
    }
    attach_bikes(conn, order_id, &change.attach).await
}

/// Which forward reference an order listing is keyed on.
#[derive(Debug, Clone, Copy)]
enum OrderOwner {
    Client(ClientId),
    Storage(StorageId),
    Bike(BikeId),
}

impl DieselRentalRepository {
    /// Orders referencing `owner`, or `NotFound` when the owner is missing.
    async fn owner_orders(&self, owner: OrderOwner) -> Result<Vec<Order>, RentalRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let (exists, missing) = match owner {
            OrderOwner::Client(id) => (
                client_exists(conn, id.get()).await,
                RentalError::not_found(EntityKind::Client, id),
            ),
            OrderOwner::Storage(id) => (
                storage_exists(conn, id.get()).await,
                RentalError::not_found(EntityKind::Storage, id),
            ),
            OrderOwner::Bike(id) => (
                bike_exists(conn, id.get()).await,
                RentalError::not_found(EntityKind::Bike, id),
            ),
        };
        if !exists.map_err(map_diesel_error)? {
            return Err(missing.into());
        }

        let rows = match owner {
            OrderOwner::Client(id) => {
                orders::table
                    .filter(orders::client_id.eq(id.get()))
                    .order(orders::id)
                    .select(OrderRow::as_select())
                    .load(conn)
                    .await
            }
            OrderOwner::Storage(id) => {
                orders::table
                    .filter(orders::storage_id.eq(id.get()))
                    .order(orders::id)
                    .select(OrderRow::as_select())
                    .load(conn)
                    .await
            }
            OrderOwner::Bike(id) => {
                orders::table
                    .inner_join(bike_orders::table)
                    .filter(bike_orders::bike_id.eq(id.get()))
                    .order(orders::id)
                    .select(OrderRow::as_select())
                    .load(conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        assemble_orders(conn, rows).await.map_err(map_diesel_error)
    }
}

#[async_trait]
impl RentalRepository for DieselRentalRepository {
    async fn address(&self, id: AddressId) -> Result<Option<Address>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        find_address(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)?
            .map(Address::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn address_by_key(
        &self,
        key: &AddressKey,
    ) -> Result<Option<Address>, RentalRepositoryError> {
        let values = AddressValues {
            city: key.city.as_str(),
            street: &key.street,
            house: key.house,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        find_address_by_key(&mut conn, &values)
            .await
            .map_err(map_diesel_error)?
            .map(Address::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn addresses(&self) -> Result<Vec<Address>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = addresses::table
            .order(addresses::id)
            .select(AddressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }

    async fn create_address(&self, draft: AddressDraft) -> Result<Storage, RentalRepositoryError> {
        let values = AddressValues::from(&draft);
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let holder = find_address_by_key(conn, &values)
                    .await?
                    .map(Address::try_from)
                    .transpose()?;
                ensure_address_free(holder.as_ref(), None)
                    .map_err(|violation| RentalError::not_created(EntityKind::Address, violation))?;

                let row = diesel::insert_into(addresses::table)
                    .values(&values)
                    .returning(AddressRow::as_returning())
                    .get_result(conn)
                    .await?;
                diesel::insert_into(storages::table)
                    .values(NewStorageRow { id: row.id })
                    .execute(conn)
                    .await?;
                Ok(Storage::try_from(row)?)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Address, WriteIntent::Create))
    }

    async fn update_address(
        &self,
        id: AddressId,
        draft: AddressDraft,
    ) -> Result<Address, RentalRepositoryError> {
        let values = AddressValues::from(&draft);
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                if find_address(conn, id.get()).await?.is_none() {
                    return Err(RentalError::not_found(EntityKind::Address, id).into());
                }
                let holder = find_address_by_key(conn, &values)
                    .await?
                    .map(Address::try_from)
                    .transpose()?;
                ensure_address_free(holder.as_ref(), Some(id))
                    .map_err(|violation| RentalError::not_updated(EntityKind::Address, violation))?;

                let row = diesel::update(addresses::table.find(id.get()))
                    .set(&values)
                    .returning(AddressRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(Address::try_from(row)?)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Address, WriteIntent::Update))
    }

    async fn storage(&self, id: StorageId) -> Result<Option<Storage>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        find_storage(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)?
            .map(Storage::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn storages(&self) -> Result<Vec<Storage>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = storages::table
            .inner_join(addresses::table)
            .order(storages::id)
            .select(AddressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }

    async fn create_storage(
        &self,
        address_id: AddressId,
    ) -> Result<Storage, RentalRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let Some(row) = find_address(conn, address_id.get()).await? else {
                    return Err(RentalError::not_found(EntityKind::Address, address_id).into());
                };
                let existing = find_storage(conn, address_id.get())
                    .await?
                    .map(Storage::try_from)
                    .transpose()?;
                ensure_storage_free(existing.as_ref())
                    .map_err(|violation| RentalError::not_created(EntityKind::Storage, violation))?;

                diesel::insert_into(storages::table)
                    .values(NewStorageRow { id: row.id })
                    .execute(conn)
                    .await?;
                Ok(Storage::try_from(row)?)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Storage, WriteIntent::Create))
    }

    async fn storage_bikes(&self, id: StorageId) -> Result<Vec<Bike>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if !storage_exists(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)?
        {
            return Err(RentalError::not_found(EntityKind::Storage, id).into());
        }
        let rows = bikes::table
            .filter(bikes::storage_id.eq(id.get()))
            .order(bikes::id)
            .select(BikeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }

    async fn storage_orders(&self, id: StorageId) -> Result<Vec<Order>, RentalRepositoryError> {
        self.owner_orders(OrderOwner::Storage(id)).await
    }

    async fn bike(&self, id: BikeId) -> Result<Option<Bike>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        bikes::table
            .find(id.get())
            .select(BikeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Bike::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn bikes(&self) -> Result<Vec<Bike>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = bikes::table
            .order(bikes::id)
            .select(BikeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }

    async fn create_bike(&self, draft: BikeDraft) -> Result<Bike, RentalRepositoryError> {
        let values = NewBikeRow::from(&draft);
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_storage(conn, draft.storage_id).await?;
                let row = diesel::insert_into(bikes::table)
                    .values(&values)
                    .returning(BikeRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(Bike::try_from(row)?)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Bike, WriteIntent::Create))
    }

    async fn reassign_bike(
        &self,
        id: BikeId,
        draft: BikeDraft,
    ) -> Result<Bike, RentalRepositoryError> {
        let changes = BikeUpdate::from(&draft);
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                if !bike_exists(conn, id.get()).await? {
                    return Err(RentalError::not_found(EntityKind::Bike, id).into());
                }
                require_storage(conn, draft.storage_id).await?;
                let row = diesel::update(bikes::table.find(id.get()))
                    .set(&changes)
                    .returning(BikeRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(Bike::try_from(row)?)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Bike, WriteIntent::Update))
    }

    async fn bike_orders(&self, id: BikeId) -> Result<Vec<Order>, RentalRepositoryError> {
        self.owner_orders(OrderOwner::Bike(id)).await
    }

    async fn client(&self, id: ClientId) -> Result<Option<Client>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = find_client(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(Client::from))
    }

    async fn client_by_email(&self, email: &str) -> Result<Option<Client>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = find_client_by_email(&mut conn, email)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(Client::from))
    }

    async fn clients(&self) -> Result<Vec<Client>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = clients::table
            .order(clients::id)
            .select(ClientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn clients_named(&self, fragment: &str) -> Result<Vec<Client>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = clients::table
            .filter(clients::name.like(contains_pattern(fragment)).escape('\\'))
            .order(clients::id)
            .select(ClientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn create_client(&self, draft: ClientDraft) -> Result<Client, RentalRepositoryError> {
        let values = ClientValues::from(&draft);
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let holder = find_client_by_email(conn, values.email)
                    .await?
                    .map(Client::from);
                ensure_email_free(holder.as_ref(), None)
                    .map_err(|violation| RentalError::not_created(EntityKind::Client, violation))?;

                let row = diesel::insert_into(clients::table)
                    .values(&values)
                    .returning(ClientRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(Client::from(row))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Client, WriteIntent::Create))
    }

    async fn update_client(
        &self,
        id: ClientId,
        draft: ClientDraft,
    ) -> Result<Client, RentalRepositoryError> {
        let values = ClientValues::from(&draft);
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_client(conn, id).await?;
                let holder = find_client_by_email(conn, values.email)
                    .await?
                    .map(Client::from);
                ensure_email_free(holder.as_ref(), Some(id))
                    .map_err(|violation| RentalError::not_updated(EntityKind::Client, violation))?;

                let row = diesel::update(clients::table.find(id.get()))
                    .set(&values)
                    .returning(ClientRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(Client::from(row))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Client, WriteIntent::Update))
    }

    async fn client_comments(&self, id: ClientId) -> Result<Vec<Comment>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if !client_exists(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)?
        {
            return Err(RentalError::not_found(EntityKind::Client, id).into());
        }
        let rows = comments::table
            .filter(comments::client_id.eq(id.get()))
            .order(comments::id)
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn client_orders(&self, id: ClientId) -> Result<Vec<Order>, RentalRepositoryError> {
        self.owner_orders(OrderOwner::Client(id)).await
    }

    async fn comment(&self, id: CommentId) -> Result<Option<Comment>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = comments::table
            .find(id.get())
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Comment::from))
    }

    async fn comments(&self) -> Result<Vec<Comment>, RentalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = comments::table
            .order(comments::id)
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, RentalRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_client(conn, draft.client_id).await?;
                let row = diesel::insert_into(comments::table)
                    .values(NewCommentRow {
                        client_id: draft.client_id.get(),
                        description: &draft.description,
                    })
                    .returning(CommentRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(Comment::from(row))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Comment, WriteIntent::Create))
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, RentalRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let rows = orders::table
            .find(id.get())
            .select(OrderRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let orders = assemble_orders(conn, rows)
            .await
            .map_err(map_diesel_error)?;
        Ok(orders.into_iter().next())
    }

    async fn orders(&self) -> Result<Vec<Order>, RentalRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let rows = orders::table
            .order(orders::id)
            .select(OrderRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        assemble_orders(conn, rows).await.map_err(map_diesel_error)
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RentalRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_client(conn, draft.client_id).await?;
                require_storage(conn, draft.storage_id).await?;
                require_bikes(conn, &draft.bike_ids).await?;

                let row = diesel::insert_into(orders::table)
                    .values(OrderValues {
                        client_id: draft.client_id.get(),
                        storage_id: draft.storage_id.get(),
                    })
                    .returning(OrderRow::as_returning())
                    .get_result(conn)
                    .await?;
                attach_bikes(conn, row.id, &draft.bike_ids).await?;
                Ok(row.into_order(draft.bike_ids.iter().map(|bike| bike.get())))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Order, WriteIntent::Create))
    }

    async fn reassign_order(
        &self,
        id: OrderId,
        draft: OrderDraft,
    ) -> Result<Order, RentalRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let exists = orders::table
                    .find(id.get())
                    .select(orders::id)
                    .first::<i64>(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Err(RentalError::not_found(EntityKind::Order, id).into());
                }
                require_client(conn, draft.client_id).await?;
                require_storage(conn, draft.storage_id).await?;
                require_bikes(conn, &draft.bike_ids).await?;

                let current: BTreeSet<BikeId> = bike_orders::table
                    .filter(bike_orders::order_id.eq(id.get()))
                    .select(bike_orders::bike_id)
                    .load::<i64>(conn)
                    .await?
                    .into_iter()
                    .map(BikeId::new)
                    .collect();
                let change = Relink::between(&current, &draft.bike_ids);
                relink_bikes(conn, id.get(), &change).await?;

                let row = diesel::update(orders::table.find(id.get()))
                    .set(OrderValues {
                        client_id: draft.client_id.get(),
                        storage_id: draft.storage_id.get(),
                    })
                    .returning(OrderRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(row.into_order(draft.bike_ids.iter().map(|bike| bike.get())))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(EntityKind::Order, WriteIntent::Update))
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage. Query behaviour is covered against embedded
    //! PostgreSQL in `tests/diesel_rental_repository.rs`.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, RentalRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn missing_row_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(repo_err, RentalRepositoryError::Query { .. }));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let repo_err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));
        assert!(matches!(repo_err, RentalRepositoryError::Connection { .. }));
    }

    #[rstest]
    #[case(WriteIntent::Create, "client not created: conflicts with an existing record")]
    #[case(WriteIntent::Update, "client not updated: conflicts with an existing record")]
    fn unique_violation_becomes_rejection(#[case] intent: WriteIntent, #[case] expected: &str) {
        let err = TxError::Diesel(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        ));
        let repo_err = err.into_port_error(EntityKind::Client, intent);

        assert!(matches!(repo_err, RentalRepositoryError::Rejected { .. }));
        assert_eq!(repo_err.to_string(), expected);
    }

    #[rstest]
    fn rejection_passes_through_unchanged() {
        let rejection = RentalError::not_found(EntityKind::Bike, 8_i64);
        let repo_err = TxError::from(rejection.clone())
            .into_port_error(EntityKind::Order, WriteIntent::Create);
        assert_eq!(repo_err, RentalRepositoryError::rejected(rejection));
    }

    #[rstest]
    #[case("van", "%van%")]
    #[case("50%_off", "%50\\%\\_off%")]
    fn like_pattern_escapes_wildcards(#[case] fragment: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(fragment), expected);
    }

    #[rstest]
    fn corrupt_catalogue_value_is_a_query_error() {
        let err = "PINK".parse::<crate::domain::rental::Color>().expect_err("unknown");
        let repo_err = TxError::from(err).into_port_error(EntityKind::Bike, WriteIntent::Create);
        assert!(repo_err.to_string().contains("corrupt row"));
    }
}
