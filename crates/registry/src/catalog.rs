use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::active::ActiveState;
use crate::error::{RegistryError, Result};
use crate::schema::{Dataset, Model, NewDataset, NewModel};

trait Entry {
    fn id(&self) -> Uuid;
    fn set_active(&mut self, on: bool);
}

impl Entry for Dataset {
    fn id(&self) -> Uuid {
        self.id
    }
    fn set_active(&mut self, on: bool) {
        self.is_active = on;
    }
}

impl Entry for Model {
    fn id(&self) -> Uuid {
        self.id
    }
    fn set_active(&mut self, on: bool) {
        self.is_active = on;
    }
}

/// Append-only arena with an id index. Entries are never removed, so
/// positions stay valid for the life of the process.
struct Table<T> {
    items: Vec<T>,
    index: HashMap<Uuid, usize>,
}

impl<T: Entry + Clone> Table<T> {
    fn new() -> Self {
        Self { items: Vec::new(), index: HashMap::new() }
    }

    fn push(&mut self, item: T) {
        self.index.insert(item.id(), self.items.len());
        self.items.push(item);
    }

    fn get(&self, id: Uuid) -> Option<&T> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    fn mark_active(&mut self, id: Option<Uuid>) {
        for item in &mut self.items {
            let on = Some(item.id()) == id;
            item.set_active(on);
        }
    }
}

struct Inner {
    datasets: Table<Dataset>,
    models: Table<Model>,
    active: ActiveState,
}

/// In-memory registry of datasets and models.
///
/// Everything sits behind one lock so that an active-pointer change and the
/// matching flag rewrite are observed together or not at all.
pub struct Catalog {
    inner: RwLock<Inner>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                datasets: Table::new(),
                models: Table::new(),
                active: ActiveState::default(),
            }),
        }
    }

    pub fn list_datasets(&self) -> Vec<Dataset> {
        self.inner.read().datasets.items.clone()
    }

    pub fn list_models(&self) -> Vec<Model> {
        self.inner.read().models.items.clone()
    }

    pub fn add_dataset(&self, meta: NewDataset) -> Dataset {
        let mut g = self.inner.write();
        let d = Dataset {
            id: Uuid::new_v4(),
            name: meta.name,
            rows: meta.rows,
            columns: meta.columns,
            uploaded_at: Utc::now(),
            file_path: meta.file_path,
            is_active: false,
        };
        g.datasets.push(d.clone());
        debug!(id = %d.id, name = %d.name, rows = d.rows, "catalog: dataset added");
        d
    }

    /// Stores a model as given. The dataset reference is not checked: models
    /// may point at datasets this process never saw.
    pub fn add_model(&self, meta: NewModel) -> Model {
        let mut g = self.inner.write();
        let m = Model {
            id: Uuid::new_v4(),
            name: meta.name,
            model_type: meta.model_type,
            dataset_id: meta.dataset_id,
            model_key: meta.model_key,
            mae: meta.mae,
            rmse: meta.rmse,
            mape: meta.mape,
            trained_at: Utc::now(),
            is_active: false,
        };
        g.models.push(m.clone());
        debug!(id = %m.id, kind = %m.model_type, "catalog: model added");
        m
    }

    pub fn get_dataset(&self, id: Uuid) -> Result<Dataset> {
        self.inner.read().datasets.get(id).cloned().ok_or(RegistryError::DatasetNotFound(id))
    }

    pub fn get_model(&self, id: Uuid) -> Result<Model> {
        self.inner.read().models.get(id).cloned().ok_or(RegistryError::ModelNotFound(id))
    }

    /// Resolves a model's dataset. A dangling reference yields `None`.
    pub fn dataset_of(&self, model: &Model) -> Option<Dataset> {
        let id = model.dataset_id.as_deref()?.parse::<Uuid>().ok()?;
        self.get_dataset(id).ok()
    }

    pub fn set_active_dataset(&self, id: Option<Uuid>) -> Result<ActiveState> {
        let mut g = self.inner.write();
        if let Some(id) = id {
            if !g.datasets.contains(id) {
                return Err(RegistryError::DatasetNotFound(id));
            }
        }
        g.datasets.mark_active(id);
        g.active = g.active.with_dataset(id);
        info!(dataset = ?id, version = g.active.version, "catalog: active dataset set");
        Ok(g.active)
    }

    pub fn set_active_model(&self, id: Option<Uuid>) -> Result<ActiveState> {
        let mut g = self.inner.write();
        if let Some(id) = id {
            if !g.models.contains(id) {
                return Err(RegistryError::ModelNotFound(id));
            }
        }
        g.models.mark_active(id);
        g.active = g.active.with_model(id);
        info!(model = ?id, version = g.active.version, "catalog: active model set");
        Ok(g.active)
    }

    pub fn active(&self) -> ActiveState {
        self.inner.read().active
    }

    pub fn active_dataset(&self) -> Option<Uuid> {
        self.active().dataset
    }

    pub fn active_model(&self) -> Option<Uuid> {
        self.active().model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Metrics, ModelType};

    fn dataset(name: &str) -> NewDataset {
        NewDataset {
            name: name.to_string(),
            rows: 3,
            columns: vec!["date".into(), "sales".into()],
            file_path: None,
        }
    }

    fn model(name: &str, t: ModelType) -> NewModel {
        NewModel::new(name, t)
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let c = Catalog::new();
        let a = c.add_dataset(dataset("a.csv"));
        let b = c.add_dataset(dataset("b.csv"));
        let dup = c.add_dataset(dataset("a.csv"));

        let ids: Vec<Uuid> = c.list_datasets().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a.id, b.id, dup.id]);
        assert_ne!(a.id, dup.id);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let c = Catalog::new();
        let id = Uuid::new_v4();
        assert_eq!(c.get_dataset(id).unwrap_err(), RegistryError::DatasetNotFound(id));
        assert_eq!(c.get_model(id).unwrap_err(), RegistryError::ModelNotFound(id));
    }

    #[test]
    fn test_add_model_copies_metrics() {
        let c = Catalog::new();
        let m = c.add_model(
            model("m", ModelType::Xgboost).with_metrics(Metrics { mae: 1.0, rmse: 2.0, mape: 3.0 }),
        );
        assert_eq!((m.mae, m.rmse, m.mape), (Some(1.0), Some(2.0), Some(3.0)));
        assert!(!m.is_active);
    }

    #[test]
    fn test_set_active_model_marks_exactly_one() {
        let c = Catalog::new();
        let a = c.add_model(model("a", ModelType::Lstm));
        let b = c.add_model(model("b", ModelType::Ensemble));
        let _ = c.add_model(model("c", ModelType::Xgboost));

        c.set_active_model(Some(a.id)).unwrap();
        c.set_active_model(Some(b.id)).unwrap();

        let active: Vec<Uuid> = c.list_models().iter().filter(|m| m.is_active).map(|m| m.id).collect();
        assert_eq!(active, vec![b.id]);
        assert_eq!(c.active_model(), Some(b.id));
        assert!(c.get_model(b.id).unwrap().is_active);
        assert!(!c.get_model(a.id).unwrap().is_active);
    }

    #[test]
    fn test_set_active_is_idempotent() {
        let c = Catalog::new();
        let d = c.add_dataset(dataset("d.csv"));
        let _ = c.add_dataset(dataset("e.csv"));

        c.set_active_dataset(Some(d.id)).unwrap();
        let once: Vec<bool> = c.list_datasets().iter().map(|d| d.is_active).collect();
        c.set_active_dataset(Some(d.id)).unwrap();
        let twice: Vec<bool> = c.list_datasets().iter().map(|d| d.is_active).collect();

        assert_eq!(once, twice);
        assert_eq!(c.active_dataset(), Some(d.id));
    }

    #[test]
    fn test_set_active_unknown_leaves_state_alone() {
        let c = Catalog::new();
        let d = c.add_dataset(dataset("d.csv"));
        c.set_active_dataset(Some(d.id)).unwrap();
        let before = c.active();

        let missing = Uuid::new_v4();
        assert_eq!(c.set_active_dataset(Some(missing)), Err(RegistryError::DatasetNotFound(missing)));
        assert_eq!(c.active(), before);
        assert!(c.get_dataset(d.id).unwrap().is_active);
    }

    #[test]
    fn test_clear_active() {
        let c = Catalog::new();
        let m = c.add_model(model("m", ModelType::Lstm));
        c.set_active_model(Some(m.id)).unwrap();
        let s = c.set_active_model(None).unwrap();

        assert_eq!(s.model, None);
        assert!(c.list_models().iter().all(|m| !m.is_active));
    }

    #[test]
    fn test_dataset_of_tolerates_dangling_reference() {
        let c = Catalog::new();
        let d = c.add_dataset(dataset("d.csv"));

        let mut meta = model("linked", ModelType::Lstm);
        meta.dataset_id = Some(d.id.to_string());
        let linked = c.add_model(meta);
        assert_eq!(c.dataset_of(&linked).map(|x| x.id), Some(d.id));

        let mut meta = model("dangling", ModelType::Lstm);
        meta.dataset_id = Some(Uuid::new_v4().to_string());
        let dangling = c.add_model(meta);
        assert!(c.dataset_of(&dangling).is_none());

        let mut meta = model("garbage", ModelType::Lstm);
        meta.dataset_id = Some("not-a-uuid".into());
        let garbage = c.add_model(meta);
        assert!(c.dataset_of(&garbage).is_none());
    }
}
