// src/models/records.rs

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    access::filter::parse_visit_date,
    models::access::{OwnerStamp, ResourceKind, Target},
};

// --- TIPOS AUXILIARES ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[schema(example = "12 MG Road")]
    pub address: Option<String>,
    pub area: Option<String>,
    pub town: Option<String>,
    pub district: Option<String>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_type")]
pub enum JobType {
    Installation,
    Service,
}

/// Registro de campo (Lead ou Job). Para o controle de acesso os dois são
/// intercambiáveis: só importam dono, quem criou, zona, filial e visitas.
pub trait FieldRecord: Clone + Send + Sync + 'static {
    type Draft: Send + 'static;
    type Patch: Send + 'static;

    const KIND: ResourceKind;

    fn id(&self) -> Uuid;
    fn owner(&self) -> Uuid;
    fn set_owner_name(&mut self, name: Option<String>);
    fn added_by(&self) -> Uuid;
    fn zone(&self) -> Option<&str>;
    fn branch(&self) -> Option<&str>;
    fn next_visit_date(&self) -> Option<NaiveDateTime>;
    fn visits(&self) -> i32;
    fn created_at(&self) -> DateTime<Utc>;

    fn from_draft(draft: Self::Draft, stamp: OwnerStamp) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);

    fn as_target(&self) -> Target<'_> {
        Target::Record {
            added_by: self.added_by(),
            zone: self.zone(),
            branch: self.branch(),
        }
    }
}

// Datas de visita chegam como só a data, data e hora, ou ISO com fuso
fn deserialize_visit_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_visit_date(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("data inválida: {value}"))),
    }
}

// =============================================================================
//  LEADS (clientes captados por vendedores)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    #[schema(example = "Anita Sharma")]
    pub name: String,
    #[schema(example = "9123456780")]
    pub phone: String,
    #[schema(example = "RO-500X")]
    pub product_model: String,
    #[schema(value_type = Option<Location>)]
    pub location: Option<Json<Location>>,
    pub last_visit_date: Option<NaiveDateTime>,
    pub next_visit_date: Option<NaiveDateTime>,
    pub visits: i32,
    pub salesman_id: Uuid,
    /// Nome do vendedor, preenchido na leitura.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ravi Kumar")]
    pub salesman_name: Option<String>,
    pub added_by: Uuid,
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Anita Sharma")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "9123456780")]
    pub phone: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "RO-500X")]
    pub product_model: String,

    pub location: Option<Location>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub last_visit_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub next_visit_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub visits: i32,
}

// Zona, filial e dono não fazem parte do patch: são âncoras imutáveis
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub product_model: Option<String>,
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub last_visit_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub next_visit_date: Option<NaiveDateTime>,
    pub visits: Option<i32>,
}

impl FieldRecord for Lead {
    type Draft = LeadDraft;
    type Patch = LeadPatch;

    const KIND: ResourceKind = ResourceKind::Lead;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.salesman_id
    }

    fn set_owner_name(&mut self, name: Option<String>) {
        self.salesman_name = name;
    }

    fn added_by(&self) -> Uuid {
        self.added_by
    }

    fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    fn next_visit_date(&self) -> Option<NaiveDateTime> {
        self.next_visit_date
    }

    fn visits(&self) -> i32 {
        self.visits
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(draft: LeadDraft, stamp: OwnerStamp) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            phone: draft.phone,
            product_model: draft.product_model,
            location: draft.location.map(Json),
            last_visit_date: draft.last_visit_date,
            next_visit_date: draft.next_visit_date,
            visits: draft.visits,
            salesman_id: stamp.owner,
            salesman_name: None,
            added_by: stamp.added_by,
            zone: stamp.zone,
            branch: stamp.branch,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: LeadPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(product_model) = patch.product_model {
            self.product_model = product_model;
        }
        if let Some(location) = patch.location {
            self.location = Some(Json(location));
        }
        if patch.last_visit_date.is_some() {
            self.last_visit_date = patch.last_visit_date;
        }
        if patch.next_visit_date.is_some() {
            self.next_visit_date = patch.next_visit_date;
        }
        if let Some(visits) = patch.visits {
            self.visits = visits;
        }
        self.updated_at = Utc::now();
    }
}

// =============================================================================
//  JOBS (instalações e serviços feitos por técnicos)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    #[schema(example = "Anita Sharma")]
    pub customer_name: String,
    pub phone: String,
    #[schema(example = "RO-500X")]
    pub product: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[schema(value_type = Option<Location>)]
    pub location: Option<Json<Location>>,
    pub last_visit_date: Option<NaiveDateTime>,
    pub next_visit_date: Option<NaiveDateTime>,
    pub visits: i32,
    pub technician_id: Uuid,
    /// Nome do técnico, preenchido na leitura.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ravi Kumar")]
    pub technician_name: Option<String>,
    pub added_by: Uuid,
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    #[validate(length(min = 1, message = "required"))]
    pub customer_name: String,

    #[validate(length(min = 1, message = "required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "required"))]
    pub product: String,

    #[serde(rename = "type")]
    pub job_type: JobType,

    pub location: Option<Location>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub last_visit_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub next_visit_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub visits: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[validate(length(min = 1, message = "required"))]
    pub customer_name: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub product: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub last_visit_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_visit_date")]
    pub next_visit_date: Option<NaiveDateTime>,
    pub visits: Option<i32>,
}

impl FieldRecord for Job {
    type Draft = JobDraft;
    type Patch = JobPatch;

    const KIND: ResourceKind = ResourceKind::Job;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.technician_id
    }

    fn set_owner_name(&mut self, name: Option<String>) {
        self.technician_name = name;
    }

    fn added_by(&self) -> Uuid {
        self.added_by
    }

    fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    fn next_visit_date(&self) -> Option<NaiveDateTime> {
        self.next_visit_date
    }

    fn visits(&self) -> i32 {
        self.visits
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(draft: JobDraft, stamp: OwnerStamp) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_name: draft.customer_name,
            phone: draft.phone,
            product: draft.product,
            job_type: draft.job_type,
            location: draft.location.map(Json),
            last_visit_date: draft.last_visit_date,
            next_visit_date: draft.next_visit_date,
            visits: draft.visits,
            technician_id: stamp.owner,
            technician_name: None,
            added_by: stamp.added_by,
            zone: stamp.zone,
            branch: stamp.branch,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: JobPatch) {
        if let Some(customer_name) = patch.customer_name {
            self.customer_name = customer_name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(product) = patch.product {
            self.product = product;
        }
        if let Some(job_type) = patch.job_type {
            self.job_type = job_type;
        }
        if let Some(location) = patch.location {
            self.location = Some(Json(location));
        }
        if patch.last_visit_date.is_some() {
            self.last_visit_date = patch.last_visit_date;
        }
        if patch.next_visit_date.is_some() {
            self.next_visit_date = patch.next_visit_date;
        }
        if let Some(visits) = patch.visits {
            self.visits = visits;
        }
        self.updated_at = Utc::now();
    }
}

// =============================================================================
//  CONSULTA (query string das listagens)
// =============================================================================

// Tudo chega como texto: flags diferentes de "true"/"false" são ignoradas
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListQuery {
    pub zone: Option<String>,
    pub branch: Option<String>,
    #[serde(alias = "salesmanName", alias = "technicianName")]
    pub owner_name: Option<String>,
    pub next_visit: Option<String>,
    pub has_visit: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> OwnerStamp {
        let owner = Uuid::new_v4();
        OwnerStamp {
            owner,
            added_by: owner,
            zone: Some("Zone A".into()),
            branch: Some("Branch 1".into()),
        }
    }

    #[test]
    fn draft_takes_anchors_from_stamp() {
        let draft: LeadDraft = serde_json::from_value(serde_json::json!({
            "name": "Anita",
            "phone": "9123456780",
            "productModel": "RO-500X",
        }))
        .unwrap();
        let stamp = stamp();

        let lead = Lead::from_draft(draft, stamp.clone());

        assert_eq!(lead.salesman_id, stamp.owner);
        assert_eq!(lead.added_by, stamp.added_by);
        assert_eq!(lead.zone.as_deref(), Some("Zone A"));
        assert_eq!(lead.branch.as_deref(), Some("Branch 1"));
        assert_eq!(lead.visits, 0);
    }

    #[test]
    fn patch_cannot_carry_scope_fields() {
        // Campos desconhecidos (zone, addedBy...) são descartados na desserialização
        let patch: JobPatch = serde_json::from_value(serde_json::json!({
            "visits": 3,
            "zone": "Zone B",
            "addedBy": Uuid::new_v4(),
        }))
        .unwrap();
        let draft = JobDraft {
            customer_name: "Anita".into(),
            phone: "9123456780".into(),
            product: "RO-500X".into(),
            job_type: JobType::Installation,
            location: None,
            last_visit_date: None,
            next_visit_date: None,
            visits: 0,
        };
        let stamp = stamp();
        let mut job = Job::from_draft(draft, stamp.clone());

        job.apply_patch(patch);

        assert_eq!(job.visits, 3);
        assert_eq!(job.zone.as_deref(), Some("Zone A"));
        assert_eq!(job.added_by, stamp.added_by);
    }

    #[test]
    fn patch_keeps_existing_visit_date_when_absent() {
        let next = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let draft = LeadDraft {
            name: "Anita".into(),
            phone: "9123456780".into(),
            product_model: "RO-500X".into(),
            location: None,
            last_visit_date: None,
            next_visit_date: Some(next),
            visits: 1,
        };
        let mut lead = Lead::from_draft(draft, stamp());

        lead.apply_patch(LeadPatch { name: Some("Anita S.".into()), ..Default::default() });

        assert_eq!(lead.name, "Anita S.");
        assert_eq!(lead.next_visit_date, Some(next));
    }

    #[test]
    fn visit_dates_accept_plain_dates_and_zoned_timestamps() {
        let draft: LeadDraft = serde_json::from_value(serde_json::json!({
            "name": "Anita",
            "phone": "9123456780",
            "productModel": "RO-500X",
            "nextVisitDate": "2024-03-10",
            "lastVisitDate": "2024-03-01T10:00:00.000Z",
        }))
        .unwrap();

        let march = |d: u32, h: u32| NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(h, 0, 0).unwrap();
        assert_eq!(draft.next_visit_date, Some(march(10, 0)));
        assert_eq!(draft.last_visit_date, Some(march(1, 10)));

        let patch: JobPatch =
            serde_json::from_value(serde_json::json!({ "nextVisitDate": "2024-03-10T15:30:00+05:30" })).unwrap();
        assert_eq!(patch.next_visit_date, Some(march(10, 10)));

        let patch: JobPatch = serde_json::from_value(serde_json::json!({ "nextVisitDate": null })).unwrap();
        assert_eq!(patch.next_visit_date, None);

        let bad = serde_json::from_value::<LeadPatch>(serde_json::json!({ "nextVisitDate": "10/03/2024" }));
        assert!(bad.is_err());
    }

    #[test]
    fn patch_rejects_blank_required_text() {
        let patch = LeadPatch { name: Some(String::new()), ..Default::default() };
        assert!(patch.validate().is_err());

        let patch = JobPatch { customer_name: Some("Meera".into()), ..Default::default() };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn list_query_accepts_role_specific_name_aliases() {
        let query: RecordListQuery =
            serde_json::from_value(serde_json::json!({ "technicianName": "ravi" })).unwrap();
        assert_eq!(query.owner_name.as_deref(), Some("ravi"));
    }
}
