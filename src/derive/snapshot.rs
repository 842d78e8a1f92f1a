//! Read-only lookup over reference data.

use mes_common::{Category, ParamDefinition, Product, ReferenceData};
use std::collections::HashMap;
use std::path::Path;

use super::template::Parent;
use crate::errors::LoadError;

/// Which table a parent reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Category,
    Product,
}

/// Indexed view of [`ReferenceData`], handed to sessions by the caller.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    categories: HashMap<i64, Category>,
    products: HashMap<i64, Product>,
    params: Vec<ParamDefinition>,
}

impl ReferenceSnapshot {
    pub fn new(data: ReferenceData) -> Self {
        Self {
            categories: data.categories.into_iter().map(|c| (c.id, c)).collect(),
            products: data.products.into_iter().map(|p| (p.id, p)).collect(),
            params: data.params,
        }
    }

    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data: ReferenceData = crate::load::read_json(path)?;
        Ok(Self::new(data))
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn product(&self, id: i64) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn parent(&self, kind: ParentKind, id: i64) -> Option<Parent<'_>> {
        match kind {
            ParentKind::Category => self.category(id).map(Parent::Category),
            ParentKind::Product => self.product(id).map(Parent::Product),
        }
    }

    /// Parameters declared on a category, in declaration order.
    pub fn params_for(&self, category_id: i64) -> Vec<&ParamDefinition> {
        self.params
            .iter()
            .filter(|param| param.category == category_id)
            .collect()
    }
}

impl From<ReferenceData> for ReferenceSnapshot {
    fn from(data: ReferenceData) -> Self {
        Self::new(data)
    }
}
