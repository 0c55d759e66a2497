//! Own-tag extraction: per-consumer views of the schema
//!
//! Extraction never mutates the source tree. Every extracted node is a fresh
//! clone, so two views taken under different tags share nothing.

use indexmap::IndexMap;
use std::collections::HashSet;
use crate::bean::{Bean, BeanKind};
use crate::db::Db;
use crate::table::Table;

impl Bean {
    /// Extract the part of this bean owned by `tag`
    ///
    /// A polymorphic base is gated on its own tags and keeps every child,
    /// even children left without columns (the child tag alone is data).
    /// Any other bean keeps the columns owned by `tag` and disappears when
    /// none survive, unless it is a polymorphic child.
    pub fn extract(&self, tag: &str) -> Option<Bean> {
        match &self.kind {
            BeanKind::PolymorphicBase { enum_ref, children } => {
                if !self.own.contains(tag) {
                    return None;
                }
                let children = children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.extract_columns(tag)))
                    .collect();
                Some(Bean {
                    kind: BeanKind::PolymorphicBase {
                        enum_ref: enum_ref.clone(),
                        children,
                    },
                    ..self.shell()
                })
            }
            BeanKind::PolymorphicChild => Some(self.extract_columns(tag)),
            BeanKind::Normal | BeanKind::TableRoot => {
                let part = self.extract_columns(tag);
                if part.columns.is_empty() {
                    None
                } else {
                    Some(part)
                }
            }
        }
    }

    /// Copy of the node attributes without any members
    fn shell(&self) -> Bean {
        Bean {
            name: self.name.clone(),
            own: self.own.clone(),
            compress: self.compress,
            columns: IndexMap::new(),
            foreign_keys: IndexMap::new(),
            ranges: IndexMap::new(),
            kind: self.kind.clone(),
        }
    }

    fn extract_columns(&self, tag: &str) -> Bean {
        let mut part = self.shell();
        part.columns = self
            .columns
            .iter()
            .filter(|(_, c)| c.own.contains(tag))
            .map(|(n, c)| (n.clone(), c.clone()))
            .collect();
        part.retain_constraints();
        part
    }

    /// Drop ranges and foreign keys whose columns are gone
    fn retain_constraints(&mut self) {
        let columns = &self.columns;
        self.ranges = std::mem::take(&mut self.ranges)
            .into_iter()
            .filter(|(_, r)| columns.contains_key(&r.key))
            .collect();
        self.foreign_keys = std::mem::take(&mut self.foreign_keys)
            .into_iter()
            .filter(|(_, fk)| fk.keys.iter().all(|k| columns.contains_key(k)))
            .collect();
    }

    /// Drop columns whose type names a bean missing from `beans`
    fn drop_dangling_columns(&mut self, beans: &HashSet<String>) -> bool {
        let before = self.columns.len();
        self.columns.retain(|_, c| match c.type_expr() {
            Some(ty) => ty.bean_refs().iter().all(|b| beans.contains(*b)),
            None => true,
        });
        let changed = self.columns.len() != before;
        if changed {
            self.retain_constraints();
        }

        let mut child_changed = false;
        if let BeanKind::PolymorphicBase { children, .. } = &mut self.kind {
            for child in children.values_mut() {
                child_changed |= child.drop_dangling_columns(beans);
            }
        }
        changed || child_changed
    }

    /// Keep only foreign keys whose target still resolves
    fn drop_invalid_foreign_keys(&mut self, targets: &IndexMap<String, (HashSet<String>, Vec<String>)>) {
        self.foreign_keys.retain(|_, fk| match targets.get(&fk.target) {
            Some((columns, primary_key)) => {
                let wanted = fk.key_ref.as_ref().unwrap_or(primary_key);
                !wanted.is_empty() && wanted.iter().all(|c| columns.contains(c))
            }
            None => false,
        });
        if let BeanKind::PolymorphicBase { children, .. } = &mut self.kind {
            for child in children.values_mut() {
                child.drop_invalid_foreign_keys(targets);
            }
        }
    }
}

impl Table {
    /// Extract the part of this table owned by `tag`
    ///
    /// The table survives only if its root bean does and every primary key
    /// column survives.
    pub fn extract(&self, tag: &str) -> Option<Table> {
        let bean = self.bean.extract(tag)?;
        let primary_key = self.primary_key_columns();
        if !primary_key.iter().all(|k| bean.columns.contains_key(k)) {
            tracing::debug!(table = %self.name, tag, "primary key not owned, table dropped from view");
            return None;
        }
        let unique_keys = self
            .unique_keys
            .iter()
            .filter(|keys| keys.iter().all(|k| bean.columns.contains_key(k)))
            .cloned()
            .collect();

        Some(Table {
            name: self.name.clone(),
            primary_key: self.primary_key.clone(),
            unique_keys,
            bean,
        })
    }
}

impl Db {
    /// Extract the view owned by `tag` and finalize it
    pub fn extract(&self, tag: &str) -> Db {
        let mut view = Db::new();
        for (name, bean) in &self.beans {
            if let Some(part) = bean.extract(tag) {
                view.beans.insert(name.clone(), part);
            }
        }
        for (name, table) in &self.tables {
            if let Some(part) = table.extract(tag) {
                view.tables.insert(name.clone(), part);
            }
        }
        view.resolve_extract();
        view
    }

    /// Finalize an extracted view against itself
    ///
    /// Columns typed by beans that did not make it into the view are
    /// removed (cascading until stable), then foreign keys whose target
    /// table or target key columns are gone are removed. Must run after
    /// every table of the view exists, since keys may point forward.
    pub fn resolve_extract(&mut self) {
        loop {
            let beans: HashSet<String> = self.beans.keys().cloned().collect();
            let mut changed = false;

            for bean in self.beans.values_mut() {
                changed |= bean.drop_dangling_columns(&beans);
            }
            for table in self.tables.values_mut() {
                changed |= table.bean.drop_dangling_columns(&beans);
            }

            let before = (self.beans.len(), self.tables.len());
            self.beans
                .retain(|_, b| b.is_polymorphic_base() || !b.columns.is_empty());
            self.tables.retain(|_, t| {
                !t.bean.columns.is_empty()
                    && t.primary_key_columns()
                        .iter()
                        .all(|k| t.bean.columns.contains_key(k))
            });
            for table in self.tables.values_mut() {
                let columns = &table.bean.columns;
                table
                    .unique_keys
                    .retain(|keys| keys.iter().all(|k| columns.contains_key(k)));
            }
            changed |= before != (self.beans.len(), self.tables.len());

            if !changed {
                break;
            }
        }

        let targets: IndexMap<String, (HashSet<String>, Vec<String>)> = self
            .tables
            .iter()
            .map(|(name, t)| {
                (
                    name.clone(),
                    (t.bean.columns.keys().cloned().collect(), t.primary_key_columns()),
                )
            })
            .collect();

        for bean in self.beans.values_mut() {
            bean.drop_invalid_foreign_keys(&targets);
        }
        for table in self.tables.values_mut() {
            table.bean.drop_invalid_foreign_keys(&targets);
        }
    }
}
