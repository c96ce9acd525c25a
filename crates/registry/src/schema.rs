use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of model kinds. The lowercase names are part of the wire
/// contract with clients and the ML service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Lstm,
    Xgboost,
    Ensemble,
}

impl ModelType {
    pub const ALL: [ModelType; 3] = [ModelType::Lstm, ModelType::Xgboost, ModelType::Ensemble];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Lstm => "lstm",
            ModelType::Xgboost => "xgboost",
            ModelType::Ensemble => "ensemble",
        }
    }

    pub fn parse(s: &str) -> Option<ModelType> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Kinds that attend over an input sequence and therefore report
    /// per-step attention weights alongside feature importances.
    pub fn is_sequence_aware(&self) -> bool {
        matches!(self, ModelType::Lstm | ModelType::Ensemble)
    }

    /// Fixed metrics assigned to models synthesized without a real trainer.
    pub fn reference_metrics(&self) -> Metrics {
        match self {
            ModelType::Lstm => Metrics { mae: 0.18, rmse: 0.24, mape: 11.2 },
            ModelType::Xgboost => Metrics { mae: 0.15, rmse: 0.21, mape: 9.8 },
            ModelType::Ensemble => Metrics { mae: 0.12, rmse: 0.18, mape: 8.5 },
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub rows: u64,
    pub columns: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub is_active: bool,
}

/// What ingestion hands to the catalog; identity and timestamps are assigned on insert.
#[derive(Clone, Debug)]
pub struct NewDataset {
    pub name: String,
    pub rows: u64,
    pub columns: Vec<String>,
    pub file_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    /// Key the ML service loads the trained artifacts under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mape: Option<f64>,
    pub trained_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Clone, Debug)]
pub struct NewModel {
    pub name: String,
    pub model_type: ModelType,
    pub dataset_id: Option<String>,
    pub model_key: Option<String>,
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    pub mape: Option<f64>,
}

impl NewModel {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
            dataset_id: None,
            model_key: None,
            mae: None,
            rmse: None,
            mape: None,
        }
    }

    pub fn with_metrics(mut self, m: Metrics) -> Self {
        self.mae = Some(m.mae);
        self.rmse = Some(m.rmse);
        self.mape = Some(m.mape);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Done,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub model_id: Option<Uuid>,
}

/// Client-facing job view: the status plus the resolved model, if any.
#[derive(Clone, Debug, Serialize)]
pub struct JobView {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
}

impl JobView {
    pub fn pending() -> Self {
        Self { status: JobStatus::Pending, model: None }
    }
}
