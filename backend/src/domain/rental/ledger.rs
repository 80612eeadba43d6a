//! In-memory relationship engine.
//!
//! [`RentalLedger`] keeps every entity in an id-keyed arena and mirrors each
//! bidirectional association in an explicit back index (storage → bikes,
//! client → orders, bike → orders, ...). Entities only hold forward
//! references, so the graph has no ownership cycles.
//!
//! Every write runs in two phases: resolve and validate everything the
//! operation touches, then mutate. A failing write therefore leaves the
//! ledger exactly as it was.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{
    Address, AddressDraft, AddressId, AddressKey, Bike, BikeDraft, BikeId, Client, ClientDraft,
    ClientId, Comment, CommentDraft, CommentId, EntityKind, Order, OrderDraft, OrderId,
    RentalError, Relink, Storage, StorageId, WriteIntent, ensure_address_free, ensure_email_free,
    ensure_storage_free,
};

/// Monotonic id source; the first id handed out is 1.
#[derive(Debug, Clone, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

/// Reverse side of a one-to-many or many-to-many association.
#[derive(Debug, Clone)]
struct BackIndex<K, V> {
    members: BTreeMap<K, BTreeSet<V>>,
}

impl<K, V> Default for BackIndex<K, V> {
    fn default() -> Self {
        Self {
            members: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy, V: Ord + Copy> BackIndex<K, V> {
    fn link(&mut self, owner: K, member: V) {
        self.members.entry(owner).or_default().insert(member);
    }

    fn unlink(&mut self, owner: K, member: V) {
        if let Some(set) = self.members.get_mut(&owner) {
            set.remove(&member);
            if set.is_empty() {
                self.members.remove(&owner);
            }
        }
    }

    /// Move `member` from the detached owners to the attached ones.
    fn relink(&mut self, change: &Relink<K>, member: V) {
        if change.is_noop() {
            return;
        }
        for owner in &change.detach {
            self.unlink(*owner, member);
        }
        for owner in &change.attach {
            self.link(*owner, member);
        }
    }

    fn of(&self, owner: K) -> impl Iterator<Item = V> + '_ {
        self.members.get(&owner).into_iter().flatten().copied()
    }

    fn contains(&self, owner: K, member: V) -> bool {
        self.members
            .get(&owner)
            .is_some_and(|set| set.contains(&member))
    }
}

/// Arena of rental entities plus back indexes for every association.
#[derive(Debug, Clone, Default)]
pub struct RentalLedger {
    addresses: BTreeMap<AddressId, Address>,
    address_keys: HashMap<AddressKey, AddressId>,
    storages: BTreeSet<StorageId>,
    bikes: BTreeMap<BikeId, Bike>,
    clients: BTreeMap<ClientId, Client>,
    client_emails: HashMap<String, ClientId>,
    comments: BTreeMap<CommentId, Comment>,
    orders: BTreeMap<OrderId, Order>,

    storage_bikes: BackIndex<StorageId, BikeId>,
    storage_orders: BackIndex<StorageId, OrderId>,
    client_orders: BackIndex<ClientId, OrderId>,
    client_comments: BackIndex<ClientId, CommentId>,
    bike_orders: BackIndex<BikeId, OrderId>,

    address_seq: Sequence,
    bike_seq: Sequence,
    client_seq: Sequence,
    comment_seq: Sequence,
    order_seq: Sequence,
}

impl RentalLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn require_address(&self, id: AddressId) -> Result<&Address, RentalError> {
        self.addresses
            .get(&id)
            .ok_or_else(|| RentalError::not_found(EntityKind::Address, id))
    }

    fn require_storage(&self, id: StorageId) -> Result<StorageId, RentalError> {
        if self.storages.contains(&id) {
            Ok(id)
        } else {
            Err(RentalError::not_found(EntityKind::Storage, id))
        }
    }

    fn require_bike(&self, id: BikeId) -> Result<&Bike, RentalError> {
        self.bikes
            .get(&id)
            .ok_or_else(|| RentalError::not_found(EntityKind::Bike, id))
    }

    fn require_client(&self, id: ClientId) -> Result<&Client, RentalError> {
        self.clients
            .get(&id)
            .ok_or_else(|| RentalError::not_found(EntityKind::Client, id))
    }

    fn require_order(&self, id: OrderId) -> Result<&Order, RentalError> {
        self.orders
            .get(&id)
            .ok_or_else(|| RentalError::not_found(EntityKind::Order, id))
    }

    fn require_bikes(&self, ids: &BTreeSet<BikeId>) -> Result<(), RentalError> {
        ids.iter().try_for_each(|id| self.require_bike(*id).map(|_| ()))
    }

    fn storage_view(&self, id: StorageId) -> Option<Storage> {
        if !self.storages.contains(&id) {
            return None;
        }
        self.addresses
            .get(&AddressId::from(id))
            .map(|address| Storage {
                id,
                address: address.clone(),
            })
    }

    // ---------------------------------------------------------------------
    // Addresses and storages
    // ---------------------------------------------------------------------

    /// Register an address together with its storage.
    ///
    /// The storage receives the address id as its own.
    ///
    /// # Errors
    /// [`RentalError::NotCreated`] when the (city, street, house) triple is
    /// already registered.
    pub fn create_address(&mut self, draft: AddressDraft) -> Result<Storage, RentalError> {
        let key = draft.key();
        ensure_address_free(self.address_by_key(&key), None)
            .map_err(|violation| RentalError::not_created(EntityKind::Address, violation))?;

        let id = AddressId::new(self.address_seq.next());
        let address = Address {
            id,
            city: draft.city,
            street: draft.street,
            house: draft.house,
        };
        self.address_keys.insert(key, id);
        self.addresses.insert(id, address.clone());
        let storage_id = StorageId::from(id);
        self.storages.insert(storage_id);

        Ok(Storage {
            id: storage_id,
            address,
        })
    }

    /// Change an address's city, street and house.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown id; [`RentalError::NotUpdated`]
    /// when another address already holds the new natural key.
    pub fn update_address(
        &mut self,
        id: AddressId,
        draft: AddressDraft,
    ) -> Result<Address, RentalError> {
        let old_key = self.require_address(id)?.key();
        let new_key = draft.key();
        ensure_address_free(self.address_by_key(&new_key), Some(id))
            .map_err(|violation| RentalError::not_updated(EntityKind::Address, violation))?;

        self.address_keys.remove(&old_key);
        self.address_keys.insert(new_key, id);
        let address = Address {
            id,
            city: draft.city,
            street: draft.street,
            house: draft.house,
        };
        self.addresses.insert(id, address.clone());
        Ok(address)
    }

    /// Create the storage for an existing address.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown address and
    /// [`RentalError::NotCreated`] when the address already has a storage.
    pub fn create_storage(&mut self, address_id: AddressId) -> Result<Storage, RentalError> {
        let address = self.require_address(address_id)?.clone();
        ensure_storage_free(self.storage_by_address(address_id).as_ref())
            .map_err(|violation| RentalError::not_created(EntityKind::Storage, violation))?;

        let id = StorageId::from(address_id);
        self.storages.insert(id);
        Ok(Storage { id, address })
    }

    /// Address by id.
    #[must_use]
    pub fn address(&self, id: AddressId) -> Option<&Address> {
        self.addresses.get(&id)
    }

    /// Address holding the natural key, if any.
    #[must_use]
    pub fn address_by_key(&self, key: &AddressKey) -> Option<&Address> {
        self.address_keys
            .get(key)
            .and_then(|id| self.addresses.get(id))
    }

    /// All addresses ordered by id.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.values()
    }

    /// Storage by id.
    #[must_use]
    pub fn storage(&self, id: StorageId) -> Option<Storage> {
        self.storage_view(id)
    }

    /// Storage located at the given address.
    #[must_use]
    pub fn storage_by_address(&self, address_id: AddressId) -> Option<Storage> {
        self.storage_view(StorageId::from(address_id))
    }

    /// All storages ordered by id.
    #[must_use]
    pub fn storages(&self) -> Vec<Storage> {
        self.storages
            .iter()
            .filter_map(|id| self.storage_view(*id))
            .collect()
    }

    /// Bikes currently held in a storage.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown storage.
    pub fn storage_bikes(&self, id: StorageId) -> Result<Vec<&Bike>, RentalError> {
        self.require_storage(id)?;
        Ok(self
            .storage_bikes
            .of(id)
            .filter_map(|bike| self.bikes.get(&bike))
            .collect())
    }

    /// Orders placed at a storage.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown storage.
    pub fn storage_orders(&self, id: StorageId) -> Result<Vec<&Order>, RentalError> {
        self.require_storage(id)?;
        Ok(self
            .storage_orders
            .of(id)
            .filter_map(|order| self.orders.get(&order))
            .collect())
    }

    // ---------------------------------------------------------------------
    // Bikes
    // ---------------------------------------------------------------------

    /// Register an available bike in a storage.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] when the storage does not exist.
    pub fn create_bike(&mut self, draft: BikeDraft) -> Result<Bike, RentalError> {
        let storage_id = self.require_storage(draft.storage_id)?;

        let id = BikeId::new(self.bike_seq.next());
        let bike = Bike {
            id,
            color: draft.color,
            size: draft.size,
            label: draft.label,
            available: true,
            storage_id,
        };
        self.bikes.insert(id, bike.clone());
        self.storage_bikes.link(storage_id, id);
        Ok(bike)
    }

    /// Move a bike to another storage and replace its attributes.
    ///
    /// Afterwards exactly one storage lists the bike: the new one. Moving a
    /// bike to the storage it is already in only updates its attributes.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown bike or storage.
    pub fn reassign_bike(&mut self, id: BikeId, draft: BikeDraft) -> Result<Bike, RentalError> {
        let old_storage = self.require_bike(id)?.storage_id;
        let new_storage = self.require_storage(draft.storage_id)?;

        self.storage_bikes
            .relink(&Relink::single(old_storage, new_storage), id);

        let bike = self
            .bikes
            .get_mut(&id)
            .ok_or_else(|| RentalError::not_found(EntityKind::Bike, id))?;
        bike.color = draft.color;
        bike.size = draft.size;
        bike.label = draft.label;
        bike.storage_id = new_storage;
        Ok(bike.clone())
    }

    /// Bike by id.
    #[must_use]
    pub fn bike(&self, id: BikeId) -> Option<&Bike> {
        self.bikes.get(&id)
    }

    /// All bikes ordered by id.
    pub fn bikes(&self) -> impl Iterator<Item = &Bike> {
        self.bikes.values()
    }

    /// Orders that include a bike.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown bike.
    pub fn bike_orders(&self, id: BikeId) -> Result<Vec<&Order>, RentalError> {
        self.require_bike(id)?;
        Ok(self
            .bike_orders
            .of(id)
            .filter_map(|order| self.orders.get(&order))
            .collect())
    }

    // ---------------------------------------------------------------------
    // Clients and comments
    // ---------------------------------------------------------------------

    /// Register a client.
    ///
    /// # Errors
    /// [`RentalError::NotCreated`] when the email is taken.
    pub fn create_client(&mut self, draft: ClientDraft) -> Result<Client, RentalError> {
        self.check_email(&draft.email, None, WriteIntent::Create)?;

        let id = ClientId::new(self.client_seq.next());
        let client = Client {
            id,
            email: draft.email,
            name: draft.name,
        };
        self.client_emails.insert(client.email.clone(), id);
        self.clients.insert(id, client.clone());
        Ok(client)
    }

    /// Change a client's email and name.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown client and
    /// [`RentalError::NotUpdated`] when another client owns the email.
    pub fn update_client(
        &mut self,
        id: ClientId,
        draft: ClientDraft,
    ) -> Result<Client, RentalError> {
        let old_email = self.require_client(id)?.email.clone();
        self.check_email(&draft.email, Some(id), WriteIntent::Update)?;

        self.client_emails.remove(&old_email);
        self.client_emails.insert(draft.email.clone(), id);
        let client = Client {
            id,
            email: draft.email,
            name: draft.name,
        };
        self.clients.insert(id, client.clone());
        Ok(client)
    }

    fn check_email(
        &self,
        email: &str,
        updating: Option<ClientId>,
        intent: WriteIntent,
    ) -> Result<(), RentalError> {
        ensure_email_free(self.client_by_email(email), updating)
            .map_err(|violation| intent.reject(EntityKind::Client, violation))
    }

    /// Attach a comment to a client.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown client.
    pub fn create_comment(&mut self, draft: CommentDraft) -> Result<Comment, RentalError> {
        let client_id = self.require_client(draft.client_id)?.id;

        let id = CommentId::new(self.comment_seq.next());
        let comment = Comment {
            id,
            client_id,
            description: draft.description,
        };
        self.comments.insert(id, comment.clone());
        self.client_comments.link(client_id, id);
        Ok(comment)
    }

    /// Client by id.
    #[must_use]
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Client owning an email.
    #[must_use]
    pub fn client_by_email(&self, email: &str) -> Option<&Client> {
        self.client_emails
            .get(email)
            .and_then(|id| self.clients.get(id))
    }

    /// All clients ordered by id.
    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Clients whose name contains `fragment` (case-sensitive).
    pub fn clients_named<'a>(&'a self, fragment: &'a str) -> impl Iterator<Item = &'a Client> + 'a {
        self.clients
            .values()
            .filter(move |client| client.name.contains(fragment))
    }

    /// Comments written about a client.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown client.
    pub fn client_comments(&self, id: ClientId) -> Result<Vec<&Comment>, RentalError> {
        self.require_client(id)?;
        Ok(self
            .client_comments
            .of(id)
            .filter_map(|comment| self.comments.get(&comment))
            .collect())
    }

    /// Orders placed by a client.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown client.
    pub fn client_orders(&self, id: ClientId) -> Result<Vec<&Order>, RentalError> {
        self.require_client(id)?;
        Ok(self
            .client_orders
            .of(id)
            .filter_map(|order| self.orders.get(&order))
            .collect())
    }

    /// Comment by id.
    #[must_use]
    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(&id)
    }

    /// All comments ordered by id.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.values()
    }

    // ---------------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------------

    /// Record a new order.
    ///
    /// Client, storage and every bike are resolved before anything is
    /// written. Each bike then carries the order and becomes unavailable.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] naming the first missing client, storage or
    /// bike.
    pub fn create_order(&mut self, draft: OrderDraft) -> Result<Order, RentalError> {
        let client_id = self.require_client(draft.client_id)?.id;
        let storage_id = self.require_storage(draft.storage_id)?;
        self.require_bikes(&draft.bike_ids)?;

        let id = OrderId::new(self.order_seq.next());
        let order = Order {
            id,
            client_id,
            storage_id,
            bike_ids: draft.bike_ids,
        };
        self.client_orders.link(client_id, id);
        self.storage_orders.link(storage_id, id);
        self.attach_bikes(&order.bike_ids, id);
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    /// Point an order at a new client, storage and bike set.
    ///
    /// All new references are validated first; on any failure the order and
    /// every back-collection keep their previous state. On success the order
    /// is listed by exactly the new client, the new storage and the new bikes.
    /// Newly attached bikes become unavailable.
    ///
    /// # Errors
    /// [`RentalError::NotFound`] for an unknown order, client, storage or bike.
    pub fn reassign_order(&mut self, id: OrderId, draft: OrderDraft) -> Result<Order, RentalError> {
        let current = self.require_order(id)?.clone();
        let client_id = self.require_client(draft.client_id)?.id;
        let storage_id = self.require_storage(draft.storage_id)?;
        self.require_bikes(&draft.bike_ids)?;

        self.client_orders
            .relink(&Relink::single(current.client_id, client_id), id);
        self.storage_orders
            .relink(&Relink::single(current.storage_id, storage_id), id);
        let bikes = Relink::between(&current.bike_ids, &draft.bike_ids);
        for bike in &bikes.detach {
            self.bike_orders.unlink(*bike, id);
        }
        self.attach_bikes(&bikes.attach, id);

        let order = Order {
            id,
            client_id,
            storage_id,
            bike_ids: draft.bike_ids,
        };
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    fn attach_bikes(&mut self, bikes: &BTreeSet<BikeId>, order: OrderId) {
        for bike_id in bikes {
            self.bike_orders.link(*bike_id, order);
            if let Some(bike) = self.bikes.get_mut(bike_id) {
                bike.available = false;
            }
        }
    }

    /// Order by id.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// All orders ordered by id.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Whether a storage's back index lists the bike.
    #[cfg(test)]
    pub(crate) fn storage_holds(&self, storage: StorageId, bike: BikeId) -> bool {
        self.storage_bikes.contains(storage, bike)
    }
}
