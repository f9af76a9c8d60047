//! In-memory store for tests and local development.
//!
//! One mutex guards all state; every trait method takes it once and releases
//! it before returning, so the compare-and-swap in `update` is atomic and no
//! lock is ever held across an `.await`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{
    BaseCategoryStore, BaseDishStore, BaseMemberStore, BasePermissionStore, BaseTokenStore,
    StoreError,
};
use crate::common::auth::{Capability, Permissions};
use crate::common::filters::{Filters, Page, SortDirection};
use crate::common::{CategoryId, DishId, MemberId};
use crate::domains::auth::{TokenRecord, TokenScope};
use crate::domains::category::{Category, NewCategory};
use crate::domains::dish::{Dish, DishFilter, NewDish};
use crate::domains::member::{Member, NewMember};

/// Codes present in the seeded `permissions` table.
const KNOWN_PERMISSIONS: &[&str] = &[
    Capability::DishesRead.code(),
    Capability::DishesWrite.code(),
];

/// Rows the list engine can order: by a safelisted column, ties broken on id.
trait Listed: Clone {
    fn key(&self) -> i64;
    fn compare_column(&self, other: &Self, column: &str) -> CmpOrdering;
}

impl Listed for Category {
    fn key(&self) -> i64 {
        self.id.get()
    }

    fn compare_column(&self, other: &Self, column: &str) -> CmpOrdering {
        match column {
            "name" => self.name.cmp(&other.name),
            _ => self.id.cmp(&other.id),
        }
    }
}

impl Listed for Dish {
    fn key(&self) -> i64 {
        self.id.get()
    }

    fn compare_column(&self, other: &Self, column: &str) -> CmpOrdering {
        match column {
            "name" => self.name.cmp(&other.name),
            "price" => self.price.total_cmp(&other.price),
            _ => self.id.cmp(&other.id),
        }
    }
}

/// Order `rows` as `ORDER BY <column> <dir>, id ASC` would, then window them.
fn paginate<T: Listed>(mut rows: Vec<T>, filters: &Filters) -> Page<T> {
    let sort = filters.sort();
    rows.sort_by(|a, b| {
        let primary = a.compare_column(b, sort.column());
        let primary = match sort.direction() {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then(a.key().cmp(&b.key()))
    });

    let total = rows.len() as i64;
    let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(filters.limit()).unwrap_or(0);
    let records: Vec<T> = rows.into_iter().skip(offset).take(limit).collect();

    if records.is_empty() {
        return Page::empty();
    }
    Page::new(records, total, filters)
}

#[derive(Default)]
struct State {
    members: BTreeMap<MemberId, Member>,
    last_member_id: i64,
    tokens: Vec<TokenRecord>,
    permissions: HashMap<MemberId, BTreeSet<String>>,
    categories: BTreeMap<CategoryId, Category>,
    last_category_id: i64,
    dishes: BTreeMap<DishId, Dish>,
    last_dish_id: i64,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<MemberId>) -> bool {
        self.members
            .values()
            .any(|m| m.email == email && Some(m.id) != except)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, State>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout {
                operation,
                after: Duration::ZERO,
            });
        }
        Ok(self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// While offline every operation fails with `StoreError::Timeout`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Synchronous insert, shared by the trait impl and test setup.
    pub fn insert_member(&self, new: NewMember) -> Result<Member, StoreError> {
        let mut state = self.lock("members.insert")?;
        if state.email_taken(&new.email, None) {
            return Err(StoreError::DuplicateIdentity { field: "email" });
        }

        state.last_member_id += 1;
        let member = Member {
            id: MemberId::new(state.last_member_id),
            created_at: Utc::now(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            activated: new.activated,
            version: 1,
        };
        state.members.insert(member.id, member.clone());
        Ok(member)
    }

    /// Current stored copy of a member.
    pub fn member(&self, id: MemberId) -> Option<Member> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .members
            .get(&id)
            .cloned()
    }

    /// Snapshot of every stored token.
    pub fn token_records(&self) -> Vec<TokenRecord> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .clone()
    }
}

#[async_trait]
impl BaseMemberStore for InMemoryStore {
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError> {
        self.insert_member(member)
    }

    async fn find_by_email(&self, email: &str) -> Result<Member, StoreError> {
        let state = self.lock("members.find_by_email")?;
        state
            .members
            .values()
            .find(|m| m.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_for_token(
        &self,
        scope: TokenScope,
        token_hash: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Member, StoreError> {
        let state = self.lock("members.find_for_token")?;
        let token = state
            .tokens
            .iter()
            .find(|t| t.hash == token_hash && t.scope == scope && t.expiry > now)
            .ok_or(StoreError::NotFound)?;
        state
            .members
            .get(&token.member_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, member: &mut Member) -> Result<(), StoreError> {
        let mut state = self.lock("members.update")?;

        let current_version = state.members.get(&member.id).map(|m| m.version);
        if current_version != Some(member.version) {
            return Err(StoreError::EditConflict);
        }
        if state.email_taken(&member.email, Some(member.id)) {
            return Err(StoreError::DuplicateIdentity { field: "email" });
        }

        let mut stored = member.clone();
        stored.version += 1;
        state.members.insert(stored.id, stored);
        member.version += 1;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock("ping").map(|_| ())
    }
}

#[async_trait]
impl BaseTokenStore for InMemoryStore {
    async fn insert(&self, token: &TokenRecord) -> Result<(), StoreError> {
        let mut state = self.lock("tokens.insert")?;
        state.tokens.retain(|t| t.hash != token.hash);
        state.tokens.push(token.clone());
        Ok(())
    }

    async fn delete_all_for_member(
        &self,
        scope: TokenScope,
        member_id: MemberId,
    ) -> Result<u64, StoreError> {
        let mut state = self.lock("tokens.delete_all_for_member")?;
        let before = state.tokens.len();
        state
            .tokens
            .retain(|t| !(t.scope == scope && t.member_id == member_id));
        Ok((before - state.tokens.len()) as u64)
    }
}

#[async_trait]
impl BasePermissionStore for InMemoryStore {
    async fn all_for_member(&self, member_id: MemberId) -> Result<Permissions, StoreError> {
        let state = self.lock("permissions.all_for_member")?;
        let codes = state
            .permissions
            .get(&member_id)
            .map(|codes| codes.iter().cloned().collect())
            .unwrap_or_default();
        Ok(Permissions::new(codes))
    }

    async fn add_for_member(&self, member_id: MemberId, codes: &[&str]) -> Result<(), StoreError> {
        let mut state = self.lock("permissions.add_for_member")?;
        let granted = state.permissions.entry(member_id).or_default();
        for code in codes.iter().filter(|c| KNOWN_PERMISSIONS.contains(*c)) {
            granted.insert(code.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl BaseCategoryStore for InMemoryStore {
    async fn insert(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut state = self.lock("categories.insert")?;
        state.last_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(state.last_category_id),
            created_at: now,
            updated_at: now,
            name: category.name,
            description: category.description,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find(&self, id: CategoryId) -> Result<Category, StoreError> {
        let state = self.lock("categories.find")?;
        state.categories.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self, name: &str, filters: &Filters) -> Result<Page<Category>, StoreError> {
        let state = self.lock("categories.list")?;
        let needle = name.to_lowercase();
        let matching: Vec<Category> = state
            .categories
            .values()
            .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        drop(state);
        Ok(paginate(matching, filters))
    }

    async fn update(&self, category: &mut Category) -> Result<(), StoreError> {
        let mut state = self.lock("categories.update")?;
        let stored = state
            .categories
            .get_mut(&category.id)
            .ok_or(StoreError::NotFound)?;
        category.updated_at = Utc::now();
        stored.name = category.name.clone();
        stored.description = category.description.clone();
        stored.updated_at = category.updated_at;
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), StoreError> {
        let mut state = self.lock("categories.delete")?;
        state
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl BaseDishStore for InMemoryStore {
    async fn insert(&self, dish: NewDish) -> Result<Dish, StoreError> {
        let mut state = self.lock("dishes.insert")?;
        state.last_dish_id += 1;
        let now = Utc::now();
        let dish = Dish {
            id: DishId::new(state.last_dish_id),
            created_at: now,
            updated_at: now,
            name: dish.name,
            description: dish.description,
            price: dish.price,
        };
        state.dishes.insert(dish.id, dish.clone());
        Ok(dish)
    }

    async fn find(&self, id: DishId) -> Result<Dish, StoreError> {
        let state = self.lock("dishes.find")?;
        state.dishes.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self, filter: &DishFilter, filters: &Filters) -> Result<Page<Dish>, StoreError> {
        let state = self.lock("dishes.list")?;
        let matching: Vec<Dish> = state
            .dishes
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        drop(state);
        Ok(paginate(matching, filters))
    }

    async fn update(&self, dish: &mut Dish) -> Result<(), StoreError> {
        let mut state = self.lock("dishes.update")?;
        let stored = state.dishes.get_mut(&dish.id).ok_or(StoreError::NotFound)?;
        dish.updated_at = Utc::now();
        stored.name = dish.name.clone();
        stored.description = dish.description.clone();
        stored.price = dish.price;
        stored.updated_at = dish.updated_at;
        Ok(())
    }

    async fn delete(&self, id: DishId) -> Result<(), StoreError> {
        let mut state = self.lock("dishes.delete")?;
        state
            .dishes
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::PasswordDigest;
    use std::sync::Arc;

    fn new_member(email: &str) -> NewMember {
        NewMember {
            name: "Store".into(),
            email: email.into(),
            password_hash: PasswordDigest::from_phc("$argon2id$placeholder"),
            activated: false,
        }
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = InMemoryStore::new();
        let mut member = store.insert_member(new_member("a@example.com")).unwrap();
        assert_eq!(member.version, 1);

        member.activated = true;
        BaseMemberStore::update(&store, &mut member).await.unwrap();
        assert_eq!(member.version, 2);
        assert_eq!(store.member(member.id).unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_stale_version_writes_nothing() {
        let store = InMemoryStore::new();
        let original = store.insert_member(new_member("a@example.com")).unwrap();

        let mut first = original.clone();
        first.name = "first".into();
        BaseMemberStore::update(&store, &mut first).await.unwrap();

        let mut second = original;
        second.name = "second".into();
        let err = BaseMemberStore::update(&store, &mut second).await.unwrap_err();
        assert!(matches!(err, StoreError::EditConflict));
        assert_eq!(second.version, 1);
        assert_eq!(store.member(second.id).unwrap().name, "first");
    }

    #[tokio::test]
    async fn test_duplicate_email_distinct_from_conflict() {
        let store = InMemoryStore::new();
        store.insert_member(new_member("a@example.com")).unwrap();
        let mut b = store.insert_member(new_member("b@example.com")).unwrap();

        assert!(matches!(
            store.insert_member(new_member("a@example.com")),
            Err(StoreError::DuplicateIdentity { field: "email" })
        ));

        b.email = "a@example.com".into();
        assert!(matches!(
            BaseMemberStore::update(&store, &mut b).await,
            Err(StoreError::DuplicateIdentity { field: "email" })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_one_winner() {
        let store = Arc::new(InMemoryStore::new());
        let original = store.insert_member(new_member("a@example.com")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let mut copy = original.clone();
                tokio::spawn(async move {
                    copy.name = format!("writer {}", i);
                    BaseMemberStore::update(&*store, &mut copy).await
                })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(StoreError::EditConflict) => conflicts += 1,
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.member(original.id).unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_unknown_permission_codes_ignored() {
        let store = InMemoryStore::new();
        let member = store.insert_member(new_member("a@example.com")).unwrap();
        store
            .add_for_member(member.id, &["dishes:read", "root"])
            .await
            .unwrap();

        let permissions = store.all_for_member(member.id).await.unwrap();
        assert_eq!(permissions.codes(), ["dishes:read".to_string()]);
    }

    #[tokio::test]
    async fn test_offline_store_times_out() {
        let store = InMemoryStore::new();
        store.set_offline(true);
        assert!(matches!(store.ping().await, Err(StoreError::Timeout { .. })));
        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    fn dish(name: &str, price: f64) -> NewDish {
        NewDish {
            name: name.into(),
            description: String::new(),
            price,
        }
    }

    #[tokio::test]
    async fn test_price_sort_breaks_ties_on_id() {
        let store = InMemoryStore::new();
        for (name, price) in [("b", 5.0), ("a", 2.5), ("c", 5.0)] {
            BaseDishStore::insert(&store, dish(name, price)).await.unwrap();
        }

        let filters = Filters::parse(
            &crate::common::filters::ListParams {
                page: None,
                page_size: None,
                sort: Some("-price".into()),
            },
            &crate::domains::dish::DISH_SORT_SAFELIST,
        )
        .unwrap();
        let page = BaseDishStore::list(&store, &DishFilter::default(), &filters)
            .await
            .unwrap();
        let names: Vec<_> = page.records.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert_eq!(page.metadata.total_records, 3);
    }

    #[tokio::test]
    async fn test_dish_update_and_delete_of_missing_row() {
        let store = InMemoryStore::new();
        let mut plov = BaseDishStore::insert(&store, dish("plov", 12.0)).await.unwrap();
        BaseDishStore::delete(&store, plov.id).await.unwrap();

        assert!(matches!(
            BaseDishStore::update(&store, &mut plov).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            BaseDishStore::delete(&store, plov.id).await,
            Err(StoreError::NotFound)
        ));
    }
}
