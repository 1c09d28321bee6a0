use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use bloglist_core::{Blog, BlogId, Entity, User, UserId};

use super::{BlogRepository, StoreError, UserRepository};

/// Insertion-ordered table keyed by entity id.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: HashMap<E::Id, E>,
    order: Vec<E::Id>,
}

impl<E: Entity + Clone> Table<E> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn get(&self, id: E::Id) -> Option<E> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<E> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect()
    }

    fn insert(&mut self, row: E) {
        let id = row.id();
        if self.rows.insert(id, row).is_none() {
            self.order.push(id);
        }
    }

    fn replace(&mut self, row: E) -> bool {
        match self.rows.get_mut(&row.id()) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: E::Id) -> bool {
        if self.rows.remove(&id).is_some() {
            self.order.retain(|existing| *existing != id);
            true
        } else {
            false
        }
    }

    fn find(&self, mut pred: impl FnMut(&E) -> bool) -> Option<E> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id))
            .find(|row| pred(row))
            .cloned()
    }
}

#[derive(Debug)]
struct Tables {
    blogs: Table<Blog>,
    users: Table<User>,
}

/// In-memory backend for tests/dev.
///
/// Not durable; everything lives behind a single `RwLock`.
#[derive(Debug)]
pub struct InMemoryDatabase {
    inner: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Tables {
                blogs: Table::new(),
                users: Table::new(),
            }),
        }
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))
    }
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlogRepository for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<Blog>, StoreError> {
        Ok(self.read("list_blogs")?.blogs.all())
    }

    async fn get(&self, id: BlogId) -> Result<Option<Blog>, StoreError> {
        Ok(self.read("get_blog")?.blogs.get(id))
    }

    async fn insert(&self, blog: &Blog) -> Result<(), StoreError> {
        let mut tables = self.write("insert_blog")?;
        let mut owner = tables.users.get(blog.user).ok_or(StoreError::NotFound("user"))?;
        if !owner.blogs.contains(&blog.id) {
            owner.blogs.push(blog.id);
        }
        tables.blogs.insert(blog.clone());
        tables.users.replace(owner);
        Ok(())
    }

    async fn update(&self, blog: &Blog) -> Result<bool, StoreError> {
        Ok(self.write("update_blog")?.blogs.replace(blog.clone()))
    }

    async fn delete(&self, id: BlogId) -> Result<bool, StoreError> {
        let mut tables = self.write("delete_blog")?;
        let Some(blog) = tables.blogs.get(id) else {
            return Ok(false);
        };
        tables.blogs.remove(id);
        if let Some(mut owner) = tables.users.get(blog.user) {
            owner.blogs.retain(|b| *b != id);
            tables.users.replace(owner);
        }
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read("list_users")?.users.all())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read("get_user")?.users.get(id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read("find_user_by_username")?
            .users
            .find(|u| u.username == username))
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.write("insert_user")?;
        if tables.users.find(|u| u.username == user.username).is_some() {
            return Err(StoreError::Duplicate {
                field: "username",
                value: user.username.clone(),
            });
        }
        tables.users.insert(user.clone());
        Ok(())
    }
}
